//! Student Service Library
//!
//! Student records, course membership and login credentials over
//! PostgreSQL (SeaORM) or in-memory stores.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use tracing::info;

use crate::config::StudentServiceConfig;
use crate::infra::Database;
use crate::service::Services;

/// Connect to the configured database, apply pending migrations and wire
/// the services.
pub async fn connect_services(
    config: &StudentServiceConfig,
) -> Result<Services, Box<dyn std::error::Error>> {
    let db = Database::connect(&config.database).await?;
    Ok(Services::from_connection(db.get_connection()))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = StudentServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Check that the configured database answers.
pub async fn ping() -> Result<(), Box<dyn std::error::Error>> {
    let config = StudentServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    db.ping().await?;
    info!("Database reachable");
    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
