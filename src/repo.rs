mod memory;
mod postgres;

pub use memory::InMemoryWaitlistRepo;
pub use postgres::PgWaitlistRepo;

use uuid::Uuid;

use crate::domain::EmailAddress;
use crate::error::Result;
use crate::model::{ListQuery, NewWaitlistEntry, WaitlistEntry};

/// Waitlist storage, shared by every in-flight request.
///
/// Implementations own the uniqueness of `email`: two inserts of the same
/// normalized address must never both succeed, no matter how they interleave.
/// The losing insert reports `Error::DuplicateEmail`.
#[async_trait::async_trait]
pub trait WaitlistRepo: Send + Sync {
    /// Insert a new entry, failing with `DuplicateEmail` if the address is taken
    async fn insert(&self, new_entry: &NewWaitlistEntry) -> Result<WaitlistEntry>;

    /// Whether an entry with this address exists
    async fn exists(&self, email: &EmailAddress) -> Result<bool>;

    /// Total number of entries
    async fn count(&self) -> Result<u64>;

    /// Entries in the query's sort order, windowed by its skip/limit
    async fn fetch_page(&self, query: &ListQuery) -> Result<Vec<WaitlistEntry>>;

    /// Every entry, newest first
    async fn fetch_all(&self) -> Result<Vec<WaitlistEntry>>;

    /// Delete an entry by ID, failing with `NotFound` if nothing matched
    async fn delete_by_id(&self, id: Uuid) -> Result<()>;

    /// Whether the store is currently reachable
    async fn is_connected(&self) -> bool;
}
