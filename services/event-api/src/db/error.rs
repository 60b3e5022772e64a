//! Database error types.

use thiserror::Error;

/// Event store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Failed to connect to the database.
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    /// Failed to execute a query.
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// Failed to run migrations.
    #[error("migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// No migrations directory next to the working directory or the crate.
    #[error("migrations directory not found; run from the repo root or services/event-api")]
    MigrationDirNotFound,

    /// A stored row does not map back to an event.
    #[error("corrupt event row {id}: {message}")]
    CorruptRow { id: i64, message: String },
}
