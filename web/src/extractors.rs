//! Custom Axum extractors.
//!
//! - [`ParsedBody`]: the JSON value stored by the body-parsing stage
//! - [`JsonBody`]: the same value deserialized into a typed payload
//!
//! Both read from request extensions, so they do not consume the body and
//! may appear alongside other extractors in any position.
//!
//! # Examples
//!
//! ```ignore
//! use phonebook_web::extractors::JsonBody;
//!
//! async fn handler(JsonBody(payload): JsonBody<PersonPayload>) -> WebResult<Json<Person>> {
//!     tracing::debug!(name = ?payload.name, "Creating person");
//!     ...
//! }
//! ```

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Request body as parsed by [`parse_json_body`](crate::middleware::parse_json_body).
///
/// `{}` when the request did not carry JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

#[async_trait]
impl<S> FromRequestParts<S> for ParsedBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::internal("Body parsing middleware not installed"))
    }
}

/// Parsed body deserialized into `T`.
///
/// A body that parsed as JSON but does not fit `T` (for example a number
/// where a string is expected) is a 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ParsedBody(value) = ParsedBody::from_request_parts(parts, state).await?;
        serde_json::from_value(value)
            .map(Self)
            .map_err(|e| AppError::bad_request(format!("invalid request body: {e}")))
    }
}
