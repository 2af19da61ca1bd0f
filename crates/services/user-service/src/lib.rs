//! User Service Library
//!
//! CRUD access to the `app_user` table: a repository over the store, a
//! Unit of Work for transactions and a thin service on top.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use sea_orm::DbErr;
use tracing::info;

use domain::User;

use crate::config::UserServiceConfig;
use crate::infra::{Database, Persistence};
use crate::service::{UserManager, UserService};

/// Connect to the configured database, apply migrations and build the service.
pub async fn connect_service(config: &UserServiceConfig) -> Result<UserManager<Persistence>, DbErr> {
    let db = Database::connect(&config.database).await?;
    let uow = Arc::new(Persistence::new(db.get_connection()));

    Ok(UserManager::new(uow))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
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

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run a single user operation against the configured database (for CLI commands).
///
/// Read results and saved records are printed to stdout as JSON.
pub async fn run_user_action(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let service = connect_service(&config).await?;

    match action {
        UserAction::Get { id } => {
            let user = service.get_user_by_id(id).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::List => {
            let users = service.get_all_users().await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
        }
        UserAction::Create { username, email } => {
            let saved = service.save_user(User::new(username, email)).await?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
        UserAction::Update { id, username, email } => {
            service.update_user(id, User::new(username, email)).await?;
        }
        UserAction::Delete { id } => {
            service.delete_user(id).await?;
        }
    }

    Ok(())
}

/// User action type.
#[derive(Debug, Clone)]
pub enum UserAction {
    Get { id: i64 },
    List,
    Create { username: String, email: String },
    Update { id: i64, username: String, email: String },
    Delete { id: i64 },
}
