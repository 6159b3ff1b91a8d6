use sea_orm::{DbErr, SqlErr};

use yatube_core::error::RepoError;

/// Classify a driver error. Unique and foreign-key violations become
/// [`RepoError::Constraint`].
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            tracing::debug!(error = %msg, "Unique constraint violated");
            RepoError::Constraint(msg)
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            tracing::debug!(error = %msg, "Foreign key constraint violated");
            RepoError::Constraint(msg)
        }
        _ => match err {
            DbErr::Conn(e) => RepoError::Connection(e.to_string()),
            DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
            other => RepoError::Query(other.to_string()),
        },
    }
}
