//! Known email addresses
//!
//! Account storage is an external collaborator; the server only needs to
//! know whether a secondary address is registered and to record addresses
//! that signed in through a primary.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::error::ServerError;

pub type DirectoryResult<T> = Result<T, ServerError>;

pub trait EmailDirectory: Send + Sync {
    /// Whether `email` belongs to an account
    fn is_known(&self, email: &str) -> DirectoryResult<bool>;

    /// Record `email`; recording a known address is a no-op
    fn add_email(&self, email: &str) -> DirectoryResult<()>;
}

/// In-memory directory keyed by lowercased address
#[derive(Default)]
pub struct InMemoryEmailDirectory {
    emails: RwLock<HashSet<String>>,
}

impl InMemoryEmailDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: RwLock::new(emails.into_iter().map(|e| e.as_ref().to_lowercase()).collect()),
        }
    }
}

fn poisoned<T>(_: T) -> ServerError {
    ServerError::Internal("email directory lock poisoned".to_string())
}

impl EmailDirectory for InMemoryEmailDirectory {
    fn is_known(&self, email: &str) -> DirectoryResult<bool> {
        let emails = self.emails.read().map_err(poisoned)?;
        Ok(emails.contains(&email.to_lowercase()))
    }

    fn add_email(&self, email: &str) -> DirectoryResult<()> {
        let mut emails = self.emails.write().map_err(poisoned)?;
        emails.insert(email.to_lowercase());
        Ok(())
    }
}
