//! Phonebook Server
//!
//! Serves the person REST API, the `/info` page and the static frontend build.
//!
//! # Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/phonebook cargo run --bin phonebook
//! ```

use phonebook_server::{telemetry, Config, PhonebookApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    telemetry::init(telemetry::DEFAULT_SERVER_FILTER);

    tracing::info!("📒 Starting Phonebook Server...");

    let config = Config::from_env()?;
    tracing::info!(
        database = %config.database.redacted_url(),
        address = %config.bind_address(),
        assets = %config.server.asset_dir.display(),
        "Configuration loaded"
    );

    let app = PhonebookApp::new(config)?;
    app.prepare_database();
    app.serve().await
}
