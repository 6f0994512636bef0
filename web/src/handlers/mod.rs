//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by resource.

pub mod health;
pub mod info;
pub mod persons;

use crate::error::{AppError, UNKNOWN_ENDPOINT};

// Re-export common handler utilities
pub use health::health_check;
pub use info::info;

/// Fallback for unmatched paths and for unsupported methods on known paths.
#[allow(clippy::unused_async)]
pub async fn unknown_endpoint() -> AppError {
    AppError::new(
        axum::http::StatusCode::NOT_FOUND,
        Some(UNKNOWN_ENDPOINT.to_string()),
        UNKNOWN_ENDPOINT.to_string(),
    )
}
