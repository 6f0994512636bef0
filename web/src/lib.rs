//! HTTP surface of the phonebook service.
//!
//! This crate turns HTTP requests into `PersonStore` calls and store results
//! into HTTP responses. It owns the ordered request pipeline (static assets,
//! body parsing, CORS, access log, routing, fallback) and the error mapper.
//!
//! # Request Flow
//!
//! 1. **Static assets** answer matching `GET`/`HEAD` requests directly
//! 2. **Body parsing** stores the JSON body in request extensions
//! 3. **CORS** annotates the response
//! 4. **Access log** records the request once it completes
//! 5. **Handler** calls the store and maps the result
//! 6. **Fallback** answers anything no route matched
//! 7. **Error mapper** turns any failure into a status code and body
//!
//! # Example
//!
//! ```ignore
//! use phonebook_web::{build_router, AppState, StaticAssets};
//! use std::sync::Arc;
//!
//! let state = AppState::new(Arc::new(store));
//! let app = build_router(state, StaticAssets::new("build"));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{JsonBody, ParsedBody};
pub use middleware::{access_log_layer, cors_layer, StaticAssets};
pub use router::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
