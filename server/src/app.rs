//! Process bootstrap: store, router, listener.

use crate::config::Config;
use anyhow::Context;
use phonebook_core::PersonStore;
use phonebook_postgres::PostgresPersonStore;
use phonebook_web::{build_router, AppState, StaticAssets};
use std::sync::Arc;
use tokio::net::TcpListener;

/// The assembled service, ready to serve.
pub struct PhonebookApp {
    config: Config,
    store: PostgresPersonStore,
}

impl PhonebookApp {
    /// Create the connection pool.
    ///
    /// The pool connects lazily, so an unreachable database does not stop the
    /// service from starting.
    ///
    /// # Errors
    ///
    /// Fails if the database URL cannot be parsed.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = PostgresPersonStore::connect_lazy(
            &config.database.url,
            config.database.max_connections,
        )
        .context("Invalid DATABASE_URL")?;

        Ok(Self { config, store })
    }

    /// Apply migrations in the background.
    ///
    /// Failure is logged; requests that need the database fail with 500 until
    /// it becomes reachable.
    pub fn prepare_database(&self) {
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.migrate().await {
                Ok(()) => tracing::info!("✓ Connected to database, migrations applied"),
                Err(e) => tracing::error!(error = %e, "Error connecting to database"),
            }
        });
    }

    /// Bind the listener and serve until Ctrl+C.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the server stops with an I/O error.
    pub async fn serve(self) -> anyhow::Result<()> {
        let store: Arc<dyn PersonStore> = Arc::new(self.store);
        let app = build_router(
            AppState::new(store),
            StaticAssets::new(&self.config.server.asset_dir),
        );

        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        tracing::info!(address = %listener.local_addr()?, "📒 Phonebook server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Shutting down gracefully...");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
}
