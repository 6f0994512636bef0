//! In-memory `PersonStore`.
//!
//! Keeps persons in insertion order behind a single mutex. Validation and the
//! uniqueness check run under that lock together with the write, which gives
//! the same write-time guarantee the Postgres `UNIQUE` constraints give.

use phonebook_core::validation::{Field, RuleSet, ValidationError};
use phonebook_core::{Person, PersonDraft, PersonId, PersonStore, StoreError, StoreFuture};
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory record store.
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPersonStore {
    persons: Arc<Mutex<Vec<Person>>>,
}

impl InMemoryPersonStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Person>>, StoreError> {
        self.persons
            .lock()
            .map_err(|_| StoreError::Unclassified("in-memory store lock poisoned".to_string()))
    }
}

/// Rejects `draft` if another person (other than `except`) holds a unique value.
fn check_unique(
    persons: &[Person],
    draft: &PersonDraft,
    except: Option<PersonId>,
) -> Result<(), ValidationError> {
    for field in RuleSet::person().unique_fields() {
        let value = field.value(draft);
        let taken = persons.iter().any(|p| {
            Some(p.id) != except
                && match field {
                    Field::Name => p.name == value,
                    Field::Number => p.number == value,
                }
        });
        if taken {
            return Err(ValidationError::unique(field, value));
        }
    }
    Ok(())
}

impl PersonStore for InMemoryPersonStore {
    fn create(&self, draft: PersonDraft) -> StoreFuture<'_, Person> {
        Box::pin(async move {
            RuleSet::person().check(&draft)?;

            let mut persons = self.lock()?;
            check_unique(&persons, &draft, None)?;

            let person = Person::from_draft(PersonId::new(), draft);
            persons.push(person.clone());
            tracing::debug!(id = %person.id, "Person created");
            Ok(person)
        })
    }

    fn find_all(&self) -> StoreFuture<'_, Vec<Person>> {
        Box::pin(async move { Ok(self.lock()?.clone()) })
    }

    fn find_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move { Ok(self.lock()?.iter().find(|p| p.id == id).cloned()) })
    }

    fn update_by_id(&self, id: PersonId, draft: PersonDraft) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move {
            RuleSet::person().check(&draft)?;

            let mut persons = self.lock()?;
            if !persons.iter().any(|p| p.id == id) {
                return Ok(None);
            }
            check_unique(&persons, &draft, Some(id))?;

            let updated = Person::from_draft(id, draft);
            if let Some(slot) = persons.iter_mut().find(|p| p.id == id) {
                *slot = updated.clone();
            }
            Ok(Some(updated))
        })
    }

    fn delete_by_id(&self, id: PersonId) -> StoreFuture<'_, Option<Person>> {
        Box::pin(async move {
            let mut persons = self.lock()?;
            let removed = persons
                .iter()
                .position(|p| p.id == id)
                .map(|index| persons.remove(index));
            Ok(removed)
        })
    }

    fn count(&self) -> StoreFuture<'_, usize> {
        Box::pin(async move { Ok(self.lock()?.len()) })
    }
}
