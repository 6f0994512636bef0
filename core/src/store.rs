//! Record store trait and its failure taxonomy.
//!
//! The `PersonStore` trait is the only way the service touches persisted
//! persons. Implementations validate every write against
//! [`RuleSet::person`](crate::validation::RuleSet::person) and enforce
//! uniqueness themselves, so a draft that reaches storage is either accepted
//! in full or rejected with a [`StoreError::Validation`].
//!
//! # Implementations
//!
//! - `PostgresPersonStore` (in `phonebook-postgres`): production
//! - `InMemoryPersonStore` (in `phonebook-testing`): fast, deterministic tests
//!
//! # Dyn Compatibility
//!
//! Methods return [`StoreFuture`] instead of using `async fn` so the store can
//! be shared as `Arc<dyn PersonStore>` between handlers.

use crate::person::{Person, PersonDraft, PersonId};
use crate::validation::ValidationError;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`PersonStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur during record store operations.
///
/// The set is closed: the HTTP layer matches on it exhaustively.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The identifier is not in the store's id format.
    #[error("Malformed id: {0}")]
    MalformedReference(String),

    /// A write violated one or more declared rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No person has this id.
    #[error("Person not found: {0}")]
    NotFound(PersonId),

    /// Anything else: connectivity, driver or internal faults.
    #[error("Store error: {0}")]
    Unclassified(String),
}

impl StoreError {
    /// Returns `true` if retrying with the same input cannot succeed.
    ///
    /// Only [`StoreError::Unclassified`] may be transient.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Unclassified(_))
    }
}

/// Persistent collection of person records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one handle is shared by every
/// in-flight request for the life of the process.
pub trait PersonStore: Send + Sync {
    /// Validate `draft` and persist it under a fresh id.
    ///
    /// # Errors
    ///
    /// - `Validation`: a declared rule failed, including uniqueness
    /// - `Unclassified`: the store could not be reached or failed internally
    fn create(&self, draft: PersonDraft) -> StoreFuture<'_, Person>;

    /// All persons, oldest first.
    ///
    /// # Errors
    ///
    /// - `Unclassified`: the store could not be reached or failed internally
    fn find_all(&self) -> StoreFuture<'_, Vec<Person>>;

    /// The person with `id`, if any.
    ///
    /// # Errors
    ///
    /// - `Unclassified`: the store could not be reached or failed internally
    fn find_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>>;

    /// Replace name and number of the person with `id`.
    ///
    /// Rules are re-run on the replacement values. Uniqueness ignores the
    /// record being updated. Returns `None` if no person has `id`.
    ///
    /// # Errors
    ///
    /// - `Validation`: a declared rule failed, including uniqueness
    /// - `Unclassified`: the store could not be reached or failed internally
    fn update_by_id(&self, id: PersonId, draft: PersonDraft) -> StoreFuture<'_, Option<Person>>;

    /// Remove the person with `id`, returning it if it existed.
    ///
    /// # Errors
    ///
    /// - `Unclassified`: the store could not be reached or failed internally
    fn delete_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>>;

    /// Number of persons.
    ///
    /// # Errors
    ///
    /// - `Unclassified`: the store could not be reached or failed internally
    fn count(&self) -> StoreFuture<'_, usize>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn validation_error_message_is_transparent() {
        let err: StoreError = ValidationError::unique(Field::Number, "040-1234567").into();
        assert_eq!(
            err.to_string(),
            "Person validation failed: number: `040-1234567` is already taken, expected `number` to be unique"
        );
    }

    #[test]
    fn only_unclassified_is_not_a_client_error() {
        assert!(StoreError::MalformedReference("123".to_string()).is_client_error());
        assert!(StoreError::NotFound(PersonId::new()).is_client_error());
        assert!(!StoreError::Unclassified("connection refused".to_string()).is_client_error());
    }

    #[test]
    fn store_is_dyn_compatible() {
        fn assert_dyn(_: Option<&dyn PersonStore>) {}
        assert_dyn(None);
    }
}
