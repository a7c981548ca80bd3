use std::sync::Arc;

use crate::domain::EmailAddress;
use crate::error::{Error, Result};
use crate::model::{NewWaitlistEntry, Registration, RequestMetadata};
use crate::repo::WaitlistRepo;

/// Signs emails up for the waitlist
#[derive(Clone)]
pub struct RegistrationService {
    repo: Arc<dyn WaitlistRepo>,
}

impl RegistrationService {
    pub fn new(repo: Arc<dyn WaitlistRepo>) -> Self {
        Self { repo }
    }

    /// Validate, normalize and store a new email.
    ///
    /// No lookup precedes the insert. The store's uniqueness constraint alone
    /// decides duplicates, and of two racing requests for one address only one succeeds.
    #[tracing::instrument(name = "Register waitlist email", skip(self, metadata))]
    pub async fn register(&self, raw_email: &str, metadata: RequestMetadata) -> Result<Registration> {
        let email: EmailAddress = raw_email.parse()?;
        let new_entry = NewWaitlistEntry::new(email, metadata);

        match self.repo.insert(&new_entry).await {
            Ok(entry) => {
                tracing::info!(id = %entry.id, email = %entry.email, "New waitlist entry");
                Ok(entry.into())
            }
            Err(Error::DuplicateEmail) => {
                tracing::info!(email = %new_entry.email, "Email already on the waitlist");
                Err(Error::DuplicateEmail)
            }
            Err(error) => Err(error),
        }
    }

    /// Whether an email is already registered.
    /// Advisory only, the answer may be stale by the time a registration arrives.
    #[tracing::instrument(name = "Check waitlist email", skip(self))]
    pub async fn exists(&self, raw_email: &str) -> Result<bool> {
        let email: EmailAddress = raw_email.parse()?;
        self.repo.exists(&email).await
    }
}
