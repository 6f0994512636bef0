//! `phonebook-admin`: list the phonebook or add one entry.

use anyhow::Context;
use clap::Parser;
use phonebook_postgres::PostgresPersonStore;
use phonebook_server::admin::{execute, AdminCli};
use phonebook_server::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init(telemetry::DEFAULT_ADMIN_FILTER);

    let cli = AdminCli::parse();
    let store = PostgresPersonStore::new(&cli.database_url())
        .await
        .context("Failed to connect to database")?;
    store.migrate().await?;

    let output = execute(cli.command(), &store).await?;
    print!("{output}");
    Ok(())
}
