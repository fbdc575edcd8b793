//! Database layer for chainvote.

pub mod entities;
pub mod migrations;
pub mod repositories;

use chainvote_common::{AppError, Config};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::log::LevelFilter;

/// Initialize database connection.
pub async fn init(config: &Config) -> Result<DatabaseConnection, AppError> {
    let mut opt = ConnectOptions::new(&config.database.url);

    opt.max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    Database::connect(opt)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Run pending migrations.
pub async fn migrate(db: &DatabaseConnection) -> Result<(), AppError> {
    use sea_orm_migration::MigratorTrait;
    migrations::Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Translate low-level database errors into the application taxonomy:
/// unique-key violations become `Conflict`, foreign-key violations become
/// `Validation`, everything else stays `Database`.
///
/// The constraint arms depend on `sql_err()`, which classifies only real
/// driver errors carrying a backend error code; mock connections cannot
/// produce those, so those arms are exercised against a live `PostgreSQL`
/// rather than in unit tests.
pub(crate) fn map_db_err(err: sea_orm::DbErr) -> AppError {
    use sea_orm::error::SqlErr;

    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => {
            AppError::Conflict(format!("duplicate entry: {msg}"))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
            AppError::Validation(format!("invalid reference: {msg}"))
        }
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use sea_orm::{DbErr, RuntimeErr};

    #[test]
    fn test_map_db_err_unclassified_stays_database() {
        let err = DbErr::Query(RuntimeErr::Internal("connection reset".to_string()));
        assert!(matches!(map_db_err(err), AppError::Database(_)));

        let err = DbErr::Custom("oops".to_string());
        assert!(matches!(map_db_err(err), AppError::Database(_)));
    }

    #[test]
    fn test_map_db_err_preserves_message() {
        let err = DbErr::Custom("tablespace full".to_string());
        let AppError::Database(msg) = map_db_err(err) else {
            panic!("expected Database error");
        };
        assert!(msg.contains("tablespace full"));
    }
}
