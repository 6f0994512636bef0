//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used by the server when `RUST_LOG` is unset.
pub const DEFAULT_SERVER_FILTER: &str = "info,phonebook=debug,sqlx=warn";

/// Filter used by the admin utility when `RUST_LOG` is unset.
pub const DEFAULT_ADMIN_FILTER: &str = "warn";

/// Install the global subscriber: `RUST_LOG` (or `default_filter`) plus a fmt layer.
///
/// Does nothing if a subscriber is already installed.
pub fn init(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
