//! # Phonebook Testing
//!
//! Testing utilities for the phonebook service.
//!
//! This crate provides:
//! - [`InMemoryPersonStore`]: a `PersonStore` with the same rules as the
//!   Postgres store, for handler tests and local development
//! - [`FailingPersonStore`]: a store whose every call fails, for error paths
//! - [`FixedClock`]: deterministic time
//! - [`fixtures`]: sample drafts
//!
//! ## Example
//!
//! ```
//! use phonebook_core::{PersonDraft, PersonStore};
//! use phonebook_testing::InMemoryPersonStore;
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryPersonStore::new();
//! let person = store.create(PersonDraft::new("Ada Lovelace", "12-34-56789")).await.unwrap();
//! assert_eq!(store.count().await.unwrap(), 1);
//! assert_eq!(store.find_by_id(person.id).await.unwrap(), Some(person));
//! # });
//! ```

pub mod memory;

use chrono::{DateTime, Utc};
use phonebook_core::environment::Clock;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use phonebook_core::{
        Person, PersonDraft, PersonId, PersonStore, StoreError, StoreFuture,
    };

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use phonebook_testing::mocks::FixedClock;
    /// use phonebook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// A store that is never reachable.
    ///
    /// Every call fails with [`StoreError::Unclassified`] carrying `message`.
    #[derive(Debug, Clone)]
    pub struct FailingPersonStore {
        message: String,
    }

    impl FailingPersonStore {
        /// Create a store that fails with `message`.
        #[must_use]
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }

        fn fail<T: Send + 'static>(&self) -> StoreFuture<'_, T> {
            let message = self.message.clone();
            Box::pin(async move { Err(StoreError::Unclassified(message)) })
        }
    }

    impl PersonStore for FailingPersonStore {
        fn create(&self, _draft: PersonDraft) -> StoreFuture<'_, Person> {
            self.fail()
        }

        fn find_all(&self) -> StoreFuture<'_, Vec<Person>> {
            self.fail()
        }

        fn find_by_id(&self, _id: PersonId) -> StoreFuture<'_, Option<Person>> {
            self.fail()
        }

        fn update_by_id(
            &self,
            _id: PersonId,
            _draft: PersonDraft,
        ) -> StoreFuture<'_, Option<Person>> {
            self.fail()
        }

        fn delete_by_id(&self, _id: PersonId) -> StoreFuture<'_, Option<Person>> {
            self.fail()
        }

        fn count(&self) -> StoreFuture<'_, usize> {
            self.fail()
        }
    }
}

/// Sample data for tests.
pub mod fixtures {
    use phonebook_core::PersonDraft;

    /// The classic sample phonebook.
    #[must_use]
    pub fn sample_drafts() -> Vec<PersonDraft> {
        vec![
            PersonDraft::new("Arto Hellas", "040-1234567"),
            PersonDraft::new("Ada Lovelace", "39-44-5323523"),
            PersonDraft::new("Dan Abramov", "12-43-234345"),
            PersonDraft::new("Mary Poppendieck", "39-23-6423122"),
        ]
    }
}

// Re-export commonly used items
pub use memory::InMemoryPersonStore;
pub use mocks::{FailingPersonStore, FixedClock, test_clock};
