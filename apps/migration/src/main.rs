//! Schema migration CLI for the Yatube database.
//!
//! Reads `DATABASE_URL` (from the environment or `.env`) and accepts the
//! usual `up`, `down`, `status`, `fresh` and `refresh` subcommands.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();
    tracing::info!(
        migrations = migration::Migrator::migrations().len(),
        "Yatube migrator"
    );

    cli::run_cli(migration::Migrator).await;
}
