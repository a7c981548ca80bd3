use uuid::Uuid;

use sqlx::PgPool;

use crate::domain::EmailAddress;
use crate::error::{Error, Result};
use crate::model::{ListQuery, NewWaitlistEntry, Sort, SortOrder, WaitlistEntry};

use super::WaitlistRepo;

const ENTRY_COLUMNS: &str = "id, email, created_at, source, ip_address, user_agent";

/// Postgres waitlist repository.
/// Duplicate prevention relies on the unique index over `waitlist.email`.
#[derive(Debug, Clone)]
pub struct PgWaitlistRepo {
    pool: PgPool,
}

impl PgWaitlistRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection, waiting for checked-out ones to be returned
    pub async fn close(&self) {
        self.pool.close().await
    }
}

/// `order by` clause for a listing. Sort keys come from a closed set, so nothing
/// user supplied is ever spliced into the query. Ties fall back to the ID to keep
/// pages stable.
fn order_by(sort: &Sort) -> String {
    let direction = match sort.order {
        SortOrder::Asc => "asc nulls first",
        SortOrder::Desc => "desc nulls last",
    };
    format!("{} {}, id {}", sort.field.column(), direction, direction)
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait::async_trait]
impl WaitlistRepo for PgWaitlistRepo {
    #[tracing::instrument(name = "Insert waitlist entry", skip(self, new_entry), fields(email = %new_entry.email))]
    async fn insert(&self, new_entry: &NewWaitlistEntry) -> Result<WaitlistEntry> {
        let sql = format!(
            "insert into waitlist({ENTRY_COLUMNS}) values ($1, $2, $3, $4, $5, $6) returning {ENTRY_COLUMNS}"
        );

        sqlx::query_as::<_, WaitlistEntry>(&sql)
            .bind(new_entry.id)
            .bind(new_entry.email.as_ref())
            .bind(new_entry.created_at)
            .bind(new_entry.source.as_str())
            .bind(new_entry.ip_address.as_deref())
            .bind(new_entry.user_agent.as_deref())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| match error {
                sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                    Error::DuplicateEmail
                }
                other => Error::Storage(other),
            })
    }

    #[tracing::instrument(name = "Check for waitlist entry", skip(self))]
    async fn exists(&self, email: &EmailAddress) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "select exists(select 1 from waitlist where email = $1)",
        )
        .bind(email.as_ref())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[tracing::instrument(name = "Count waitlist entries", skip(self))]
    async fn count(&self) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>("select count(*) from waitlist")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    #[tracing::instrument(name = "Fetch page of waitlist entries", skip(self))]
    async fn fetch_page(&self, query: &ListQuery) -> Result<Vec<WaitlistEntry>> {
        let sql = format!(
            "select {ENTRY_COLUMNS} from waitlist order by {} offset $1 limit $2",
            order_by(&query.sort)
        );

        let entries = sqlx::query_as::<_, WaitlistEntry>(&sql)
            .bind(to_i64(query.skip()))
            .bind(to_i64(query.limit()))
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    #[tracing::instrument(name = "Fetch all waitlist entries", skip(self))]
    async fn fetch_all(&self) -> Result<Vec<WaitlistEntry>> {
        let sql = format!(
            "select {ENTRY_COLUMNS} from waitlist order by {}",
            order_by(&Sort::default())
        );

        let entries = sqlx::query_as::<_, WaitlistEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(entries)
    }

    #[tracing::instrument(name = "Delete waitlist entry by id", skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("delete from waitlist where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        sqlx::query("select 1").execute(&self.pool).await.is_ok()
    }
}
