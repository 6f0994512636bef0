//! Error mapping for the request pipeline.
//!
//! [`AppError`] is the terminal stage of the pipeline: handlers and
//! middleware return it instead of building failure responses themselves, and
//! its `IntoResponse` implementation logs the failure and classifies it into a
//! status code and body.
//!
//! Store failures arrive as the closed [`StoreError`] enum and are matched
//! exhaustively in [`From<StoreError>`](AppError#impl-From<StoreError>-for-AppError).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phonebook_core::{StoreError, ValidationError};
use serde::Serialize;
use std::fmt;

/// Body of [`AppError::missing_fields`].
pub const MISSING_FIELDS: &str = "name or number missing";

/// Body of [`AppError::malformed_id`].
pub const MALFORMED_ID: &str = "malformatted id";

/// Body of [`AppError::malformed_body`].
pub const MALFORMED_BODY: &str = "malformatted json";

/// Body of the unmatched-route fallback.
pub const UNKNOWN_ENDPOINT: &str = "unknown endpoint";

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>, Path(id): Path<String>) -> WebResult<Json<Person>> {
///     let id = PersonId::parse(&id)?;
///     let person = state.store.find_by_id(id).await?.ok_or(StoreError::NotFound(id))?;
///     Ok(Json(person))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Client-facing message; `None` sends an empty body
    message: Option<String>,
    /// Diagnostic message for the server log
    detail: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: Option<String>, detail: String) -> Self {
        Self {
            status,
            message,
            detail,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// A 400 Bad Request with `message` as the `error` body.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(StatusCode::BAD_REQUEST, Some(message.clone()), message)
    }

    /// POST without a name or a number.
    #[must_use]
    pub fn missing_fields() -> Self {
        Self::bad_request(MISSING_FIELDS)
    }

    /// An identifier the store cannot parse.
    #[must_use]
    pub fn malformed_id(raw: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            Some(MALFORMED_ID.to_string()),
            format!("Malformed id: {raw}"),
        )
    }

    /// A request body that is not valid JSON.
    #[must_use]
    pub fn malformed_body(detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            Some(MALFORMED_BODY.to_string()),
            detail.to_string(),
        )
    }

    /// A request body that broke off or failed while being read.
    #[must_use]
    pub fn unreadable_body(detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            Some("request body could not be read".to_string()),
            detail.to_string(),
        )
    }

    /// A request body over the size limit.
    #[must_use]
    pub fn payload_too_large(detail: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            Some("request entity too large".to_string()),
            detail.to_string(),
        )
    }

    /// A rule violation; the body names every failed rule.
    #[must_use]
    pub fn validation(err: &ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }

    /// A 404 with an empty body.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            None,
            format!("{resource} with id {id} not found"),
        )
    }

    /// A 500 with an empty body. `detail` is only logged.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, None, detail.into())
    }

    /// Response status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Client-facing message, if the response has a body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.detail)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Human-readable error message.
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    message = %self.detail,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(status = %self.status, message = %self.detail, "Internal server error");
            }
        } else {
            tracing::warn!(status = %self.status, message = %self.detail, "Request failed");
        }

        match self.message {
            Some(error) => (self.status, Json(ErrorResponse { error })).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Classify a store failure.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedReference(raw) => Self::malformed_id(&raw),
            StoreError::Validation(e) => Self::validation(&e),
            StoreError::NotFound(id) => Self::not_found("Person", id),
            StoreError::Unclassified(detail) => Self::internal(detail),
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}
