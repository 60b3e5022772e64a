//! Storage layer for event records.
//!
//! This module provides:
//! - The [`EventStore`] contract the service is written against
//! - [`PgEventStore`], backed by Postgres through SQLx
//! - [`InMemoryEventStore`], for development and tests
//! - Connection pool management and migrations

mod error;
mod event_store;
mod memory;

pub use error::DbError;
pub use event_store::{EventStore, PgEventStore};
pub use memory::InMemoryEventStore;

use std::path::{Path, PathBuf};

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

/// Relative locations searched for migrations, so the binary runs from the
/// repo root or from the service directory.
const MIGRATION_DIRS: [&str; 2] = ["migrations", "services/event-api/migrations"];

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/evreg".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

impl DbConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `DATABASE_URL` is unset, in which case the service
    /// falls back to the in-memory store.
    pub fn from_env() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;
        let defaults = Self::default();

        Some(Self {
            database_url,
            max_connections: env_u32("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            min_connections: env_u32("DB_MIN_CONNECTIONS").unwrap_or(defaults.min_connections),
        })
    }
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

/// First existing migrations directory, falling back to the one shipped
/// next to this crate's manifest.
fn migrations_dir() -> Option<PathBuf> {
    MIGRATION_DIRS
        .iter()
        .map(PathBuf::from)
        .chain(std::iter::once(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
        ))
        .find(|dir| dir.is_dir())
}

/// Postgres connection pool for the event store.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.database_url)
            .await
            .map_err(DbError::Connect)?;

        Ok(Self { pool })
    }

    /// Apply pending migrations, loaded at runtime from [`migrations_dir`].
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        let dir = migrations_dir().ok_or(DbError::MigrationDirNotFound)?;
        info!(migrations_dir = %dir.display(), "Running database migrations");

        let migrator = Migrator::new(dir).await.map_err(DbError::Migration)?;
        migrator.run(&self.pool).await.map_err(DbError::Migration)?;

        info!("Database migrations complete");
        Ok(())
    }

    /// Get an event store backed by this pool.
    pub fn event_store(&self) -> PgEventStore {
        PgEventStore::new(self.pool.clone())
    }
}
