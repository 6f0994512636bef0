//! Person resource handlers under `/api/persons`.
//!
//! Every store failure is forwarded to [`AppError`] with `?`; the only
//! failure produced here is the missing-field check on create, which rejects
//! before the store is touched.

use crate::error::AppError;
use crate::extractors::JsonBody;
use crate::{AppState, WebResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use phonebook_core::{Person, PersonDraft, PersonId, StoreError};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body of create and update requests.
///
/// Both fields are optional at this layer so that a missing field is reported
/// as such instead of as a deserialization failure. Numbers and booleans are
/// accepted and stored as their text, so `"number": 12345678` is a valid entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonPayload {
    /// Display name.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: Option<String>,
    /// Phone number.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub number: Option<String>,
}

/// Accept any JSON scalar as text; `null` counts as absent.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

impl PersonPayload {
    /// Whether both fields are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.name) && present(&self.number)
    }

    /// Absent fields become empty strings, which the `Required` rule rejects.
    #[must_use]
    pub fn into_draft(self) -> PersonDraft {
        PersonDraft::new(
            self.name.unwrap_or_default(),
            self.number.unwrap_or_default(),
        )
    }
}

/// `GET /api/persons`
///
/// # Errors
///
/// Store failures.
pub async fn list_persons(State(state): State<AppState>) -> WebResult<Json<Vec<Person>>> {
    let persons = state.store.find_all().await?;
    Ok(Json(persons))
}

/// `GET /api/persons/:id`
///
/// # Errors
///
/// 400 for a malformed id, 404 for an unknown one.
pub async fn get_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<Person>> {
    let id = PersonId::parse(&id)?;
    let person = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(StoreError::NotFound(id))?;
    Ok(Json(person))
}

/// `POST /api/persons`
///
/// # Errors
///
/// 400 `name or number missing` before any store call, then rule violations.
pub async fn create_person(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<PersonPayload>,
) -> WebResult<(StatusCode, Json<Person>)> {
    if !payload.is_complete() {
        return Err(AppError::missing_fields());
    }

    let person = state.store.create(payload.into_draft()).await?;
    tracing::info!(id = %person.id, name = %person.name, "Person created");
    Ok((StatusCode::CREATED, Json(person)))
}

/// `PUT /api/persons/:id`
///
/// Replaces name and number wholesale; the rules run against the new values.
///
/// # Errors
///
/// 400 for a malformed id or a rule violation, 404 for an unknown id.
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<PersonPayload>,
) -> WebResult<Json<Person>> {
    let id = PersonId::parse(&id)?;
    let person = state
        .store
        .update_by_id(id, payload.into_draft())
        .await?
        .ok_or(StoreError::NotFound(id))?;
    tracing::info!(id = %person.id, "Person updated");
    Ok(Json(person))
}

/// `DELETE /api/persons/:id`
///
/// 204 whether or not the person existed.
///
/// # Errors
///
/// 400 for a malformed id.
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<StatusCode> {
    let id = PersonId::parse(&id)?;
    match state.store.delete_by_id(id).await? {
        Some(removed) => tracing::debug!(?removed, "Person deleted"),
        None => tracing::debug!(%id, "Delete of unknown person"),
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(name: Option<&str>, number: Option<&str>) -> PersonPayload {
        PersonPayload {
            name: name.map(str::to_string),
            number: number.map(str::to_string),
        }
    }

    #[test]
    fn test_payload_completeness() {
        assert!(payload(Some("Ada"), Some("12-34-56789")).is_complete());
        assert!(!payload(None, Some("12-34-56789")).is_complete());
        assert!(!payload(Some("Ada"), None).is_complete());
        assert!(!payload(Some(""), Some("12-34-56789")).is_complete());
    }

    #[test]
    fn test_numeric_number_is_read_as_text() {
        let payload: PersonPayload =
            serde_json::from_value(json!({ "name": "Ada Lovelace", "number": 12_345_678 })).unwrap();
        assert_eq!(payload.number.as_deref(), Some("12345678"));
        assert!(payload.is_complete());
    }

    #[test]
    fn test_null_counts_as_missing_and_objects_are_rejected() {
        let payload: PersonPayload =
            serde_json::from_value(json!({ "name": null, "number": "12-34-56789" })).unwrap();
        assert_eq!(payload.name, None);

        let result = serde_json::from_value::<PersonPayload>(json!({ "name": { "first": "Ada" } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_fields_become_empty_draft_values() {
        let draft = payload(Some("Ada Lovelace"), None).into_draft();
        assert_eq!(draft.name, "Ada Lovelace");
        assert_eq!(draft.number, "");
    }
}
