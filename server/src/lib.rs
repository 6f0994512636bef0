//! Process-level wiring for the phonebook service.
//!
//! - [`config`]: environment-driven configuration
//! - [`telemetry`]: tracing subscriber setup
//! - [`app`]: store, router and listener bootstrap for the `phonebook` binary
//! - [`admin`]: the `phonebook-admin` command line

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]

pub mod admin;
pub mod app;
pub mod config;
pub mod telemetry;

pub use app::PhonebookApp;
pub use config::{Config, ConfigError};
