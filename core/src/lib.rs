//! # Phonebook Core
//!
//! Domain types and traits for the phonebook service.
//!
//! This crate has no I/O of its own. It defines:
//!
//! - [`person`]: the `Person` record, its identifier and the draft submitted by clients
//! - [`validation`]: the rule set every persisted person must satisfy
//! - [`store`]: the `PersonStore` abstraction and its closed failure taxonomy
//! - [`environment`]: injectable dependencies such as the clock
//!
//! Storage backends live in `phonebook-postgres` (production) and
//! `phonebook-testing` (in-memory).
//!
//! # Example
//!
//! ```
//! use phonebook_core::person::PersonDraft;
//! use phonebook_core::validation::RuleSet;
//!
//! let draft = PersonDraft::new("Ada Lovelace", "12-34-56789");
//! assert!(RuleSet::person().check(&draft).is_ok());
//!
//! let draft = PersonDraft::new("Al", "123");
//! let err = RuleSet::person().check(&draft).unwrap_err();
//! assert_eq!(err.violations().len(), 2);
//! ```

pub mod person;
pub mod store;
pub mod validation;

pub use person::{Person, PersonDraft, PersonId};
pub use store::{PersonStore, StoreError, StoreFuture};
pub use validation::{Field, Rule, RuleSet, ValidationError, Violation};

/// Environment module - Dependency injection traits
///
/// External dependencies that handlers need but should not reach for
/// directly are abstracted here so tests can swap them out.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use phonebook_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
