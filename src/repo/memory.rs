use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::error::{Error, Result};
use crate::model::{ListQuery, NewWaitlistEntry, Sort, SortField, SortOrder, WaitlistEntry};

use super::WaitlistRepo;

/// In-process waitlist repository, for local runs without Postgres and for tests.
/// The duplicate check and the insert happen under one lock, so concurrent
/// registrations behave the same way they do against the unique index.
#[derive(Debug, Default)]
pub struct InMemoryWaitlistRepo {
    entries: Mutex<Vec<WaitlistEntry>>,
}

impl InMemoryWaitlistRepo {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<WaitlistEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn compare(field: SortField, a: &WaitlistEntry, b: &WaitlistEntry) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Email => a.email.cmp(&b.email),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Source => a.source.cmp(&b.source),
        SortField::IpAddress => a.ip_address.cmp(&b.ip_address),
        SortField::UserAgent => a.user_agent.cmp(&b.user_agent),
    }
}

/// Sorted copy of `entries`, ties broken by ID in the same direction
fn sorted(entries: &[WaitlistEntry], sort: &Sort) -> Vec<WaitlistEntry> {
    let mut entries = entries.to_vec();
    entries.sort_by(|a, b| {
        let ordering = compare(sort.field, a, b).then_with(|| a.id.cmp(&b.id));
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    entries
}

#[async_trait::async_trait]
impl WaitlistRepo for InMemoryWaitlistRepo {
    #[tracing::instrument(name = "Insert waitlist entry", skip(self, new_entry), fields(email = %new_entry.email))]
    async fn insert(&self, new_entry: &NewWaitlistEntry) -> Result<WaitlistEntry> {
        let mut entries = self.entries();
        if entries
            .iter()
            .any(|entry| entry.email == new_entry.email.as_ref())
        {
            return Err(Error::DuplicateEmail);
        }

        let entry = WaitlistEntry::from(new_entry.clone());
        entries.push(entry.clone());
        Ok(entry)
    }

    #[tracing::instrument(name = "Check for waitlist entry", skip(self))]
    async fn exists(&self, email: &EmailAddress) -> Result<bool> {
        Ok(self
            .entries()
            .iter()
            .any(|entry| entry.email == email.as_ref()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries().len() as u64)
    }

    #[tracing::instrument(name = "Fetch page of waitlist entries", skip(self))]
    async fn fetch_page(&self, query: &ListQuery) -> Result<Vec<WaitlistEntry>> {
        let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);

        Ok(sorted(&self.entries(), &query.sort)
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    async fn fetch_all(&self) -> Result<Vec<WaitlistEntry>> {
        Ok(sorted(&self.entries(), &Sort::default()))
    }

    #[tracing::instrument(name = "Delete waitlist entry by id", skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);

        if entries.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
