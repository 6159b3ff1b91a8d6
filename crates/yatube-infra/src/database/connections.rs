use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbConn, DbErr};

/// Configuration for the application database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
        }
    }

    fn is_sqlite_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}

/// Connection pool to the relational store.
///
/// An in-memory SQLite database lives as long as its connection, so such
/// URLs are pinned to a single pooled connection.
#[derive(Clone)]
pub struct DatabaseConnections {
    pub main: DbConn,
}

impl DatabaseConnections {
    /// Open the pool described by `config`.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection...");

        let (max, min) = if config.is_sqlite_memory() {
            (1, 1)
        } else {
            (config.max_connections, config.min_connections)
        };

        let opts = ConnectOptions::new(&config.url)
            .max_connections(max)
            .min_connections(min)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false)
            .to_owned();

        let main = Database::connect(opts).await?;
        tracing::info!(
            backend = ?main.get_database_backend(),
            pool = max,
            "Database connected"
        );

        Ok(Self { main })
    }
}
