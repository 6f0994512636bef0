//! The `Person` record and its identifier.
//!
//! A person is created from a [`PersonDraft`] (client-supplied name and number).
//! The store assigns the [`PersonId`], which never changes afterwards.
//!
//! The wire form of a person is exactly `{ "id", "name", "number" }`. Storage
//! bookkeeping never leaks into it.

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a person.
///
/// Serialized as the canonical hyphenated UUID string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(Uuid);

impl PersonId {
    /// Creates a new random `PersonId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `PersonId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse a client-supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedReference`] if `raw` is not in the
    /// store's identifier format.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| StoreError::MalformedReference(raw.to_string()))
    }
}

impl Default for PersonId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A persisted phonebook entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identifier
    pub id: PersonId,
    /// Display name, unique across the phonebook
    pub name: String,
    /// Phone number, unique across the phonebook
    pub number: String,
}

impl Person {
    /// Builds a person from an id and an accepted draft.
    #[must_use]
    pub fn from_draft(id: PersonId, draft: PersonDraft) -> Self {
        Self {
            id,
            name: draft.name,
            number: draft.number,
        }
    }
}

/// Candidate values for a create or a wholesale update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonDraft {
    /// Requested name
    pub name: String,
    /// Requested number
    pub number: String,
}

impl PersonDraft {
    /// Creates a draft from a name and a number.
    #[must_use]
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_display() {
        let id = PersonId::new();
        assert_eq!(PersonId::parse(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn parse_rejects_short_ids() {
        let err = PersonId::parse("123").unwrap_err();
        assert!(matches!(err, StoreError::MalformedReference(raw) if raw == "123"));
    }

    #[test]
    fn parse_rejects_object_id_shaped_strings() {
        assert!(PersonId::parse("5c41c90e84d891c15dfa3431").is_err());
    }

    #[test]
    fn person_serializes_with_plain_string_id() {
        let id = PersonId::new();
        let person = Person::from_draft(id, PersonDraft::new("Arto Hellas", "040-123456"));
        let json = serde_json::to_value(&person).unwrap();

        assert_eq!(json["id"], serde_json::Value::String(id.to_string()));
        assert_eq!(json["name"], "Arto Hellas");
        assert_eq!(json["number"], "040-123456");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
