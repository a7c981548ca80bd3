use std::sync::Arc;

use chrono::{NaiveDate, SecondsFormat};

use uuid::Uuid;

use crate::error::Result;
use crate::model::{EntriesPage, ListQuery, Pagination, WaitlistEntry};
use crate::repo::WaitlistRepo;

const CSV_HEADER: &str = "Email,Created At,Source,IP Address,User Agent";

/// Read and delete access to the waitlist for administrators
#[derive(Clone)]
pub struct WaitlistAdmin {
    repo: Arc<dyn WaitlistRepo>,
}

impl WaitlistAdmin {
    pub fn new(repo: Arc<dyn WaitlistRepo>) -> Self {
        Self { repo }
    }

    /// One sorted page of entries, with the pagination summary.
    /// Pages past the end come back empty.
    #[tracing::instrument(name = "List waitlist entries", skip(self))]
    pub async fn list(&self, query: ListQuery) -> Result<EntriesPage> {
        let total_count = self.repo.count().await?;
        let entries = self.repo.fetch_page(&query).await?;
        let pagination = Pagination::new(&query, total_count);

        tracing::info!(
            "Retrieved {} waitlist entries (page {}/{})",
            entries.len(),
            pagination.current_page,
            pagination.total_pages
        );

        Ok(EntriesPage {
            entries,
            pagination,
        })
    }

    #[tracing::instrument(name = "Count waitlist entries", skip(self))]
    pub async fn count(&self) -> Result<u64> {
        self.repo.count().await
    }

    /// Every entry as CSV, newest first
    #[tracing::instrument(name = "Export waitlist", skip(self))]
    pub async fn export_csv(&self) -> Result<String> {
        let entries = self.repo.fetch_all().await?;
        tracing::info!("Exported {} waitlist entries as CSV", entries.len());
        Ok(to_csv(&entries))
    }

    #[tracing::instrument(name = "Delete waitlist entry", skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.repo.delete_by_id(id).await?;
        tracing::info!(%id, "Deleted waitlist entry");
        Ok(())
    }
}

/// Serialize entries one per line, every field quoted.
/// Embedded quotes are doubled and commas in the user agent become semicolons.
pub fn to_csv(entries: &[WaitlistEntry]) -> String {
    let mut csv = String::with_capacity((entries.len() + 1) * 128);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for entry in entries {
        let created_at = entry
            .created_at
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let user_agent = entry.user_agent.as_deref().unwrap_or("").replace(',', ";");

        let fields = [
            entry.email.as_str(),
            created_at.as_str(),
            entry.source.as_str(),
            entry.ip_address.as_deref().unwrap_or(""),
            user_agent.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|field| quote(field)).collect();

        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Download name for an export taken on `date`
pub fn export_filename(date: NaiveDate) -> String {
    format!("waitlist-export-{}.csv", date.format("%Y-%m-%d"))
}
