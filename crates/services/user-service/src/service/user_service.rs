//! User service - pass-through facade over the user repository.
//!
//! Reads go straight to the repository; every write runs in its own
//! transaction through the Unit of Work.

use async_trait::async_trait;
use std::sync::Arc;

use common::AppResult;
use domain::User;

use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
///
/// Unknown ids are not errors: lookups return `None`, updates and deletes
/// succeed without touching anything.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// List all users
    async fn get_all_users(&self) -> AppResult<Vec<User>>;

    /// Persist a user and return the stored record with its assigned id
    async fn save_user(&self, user: User) -> AppResult<User>;

    /// Replace username and email of the user with `id`
    async fn update_user(&self, id: i64, updated: User) -> AppResult<()>;

    /// Delete user by ID
    async fn delete_user(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user_by_id(&self, id: i64) -> AppResult<Option<User>> {
        self.uow.users().get_by_id(id).await
    }

    async fn get_all_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().find_all().await
    }

    async fn save_user(&self, user: User) -> AppResult<User> {
        let saved = crate::with_transaction!(self.uow, |ctx| ctx.users().save(user).await)?;

        tracing::info!(user_id = ?saved.id, "User saved");
        Ok(saved)
    }

    async fn update_user(&self, id: i64, updated: User) -> AppResult<()> {
        let User { username, email, .. } = updated;
        let rows_affected = crate::with_transaction!(self.uow, |ctx| {
            ctx.users().update_by_id(id, username, email).await
        })?;

        tracing::info!(user_id = id, rows_affected, "User updated");
        Ok(())
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        crate::with_transaction!(self.uow, |ctx| ctx.users().delete_by_id(id).await)?;

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
