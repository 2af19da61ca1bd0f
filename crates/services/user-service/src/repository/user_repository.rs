//! User repository implementation backed by the `app_user` table.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use common::AppResult;
use domain::User;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Missing rows are never errors: lookups return `None`, writes report
/// zero affected rows, deletes are no-ops. Errors mean the store failed.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Load every user (order is store-dependent)
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Overwrite username and email of the row with `id`.
    ///
    /// Returns the number of rows affected, `0` when no row matched.
    async fn update_by_id(&self, id: i64, username: String, email: String) -> AppResult<u64>;

    /// Delete user by ID if present
    async fn delete_by_id(&self, id: i64) -> AppResult<()>;

    /// Insert a transient user or update a persisted one.
    ///
    /// Returns the stored record, including the id assigned on insert.
    async fn save(&self, user: User) -> AppResult<User>;
}

/// Concrete implementation of UserRepository over a connection pool
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        queries::find_by_id(&self.db, id).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        queries::find_all(&self.db).await
    }

    async fn update_by_id(&self, id: i64, username: String, email: String) -> AppResult<u64> {
        queries::update_by_id(&self.db, id, username, email).await
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        queries::delete_by_id(&self.db, id).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        queries::save(&self.db, user).await
    }
}

/// Statements shared by the pooled and the transaction-bound repositories.
pub(crate) mod queries {
    use sea_orm::sea_query::Expr;
    use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
    use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};

    use common::AppResult;
    use domain::User;

    use crate::repository::entities::user::{self, ActiveModel, Entity as UserEntity};

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(db).await?;

        tracing::debug!(user_id = id, found = result.is_some(), "Looked up user");
        Ok(result.map(User::from))
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> AppResult<Vec<User>> {
        let models = UserEntity::find().all(db).await?;

        tracing::debug!(count = models.len(), "Listed users");
        Ok(models.into_iter().map(User::from).collect())
    }

    pub async fn update_by_id<C: ConnectionTrait>(
        db: &C,
        id: i64,
        username: String,
        email: String,
    ) -> AppResult<u64> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Username, Expr::value(username))
            .col_expr(user::Column::Email, Expr::value(email))
            .filter(user::Column::Id.eq(id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: i64) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(db).await?;

        tracing::debug!(user_id = id, rows_affected = result.rows_affected, "Deleted user");
        Ok(())
    }

    pub async fn save<C: ConnectionTrait>(db: &C, user: User) -> AppResult<User> {
        let User { id, username, email } = user;

        if let Some(id) = id {
            let active_model = ActiveModel {
                id: Unchanged(id),
                username: Set(username.clone()),
                email: Set(email.clone()),
            };

            match active_model.update(db).await {
                Ok(model) => return Ok(User::from(model)),
                // Unknown id: fall through and insert with a fresh id
                Err(DbErr::RecordNotUpdated) => {
                    tracing::debug!(user_id = id, "No row to update, inserting instead");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let active_model = ActiveModel {
            id: NotSet,
            username: Set(username),
            email: Set(email),
        };

        let model = active_model.insert(db).await?;
        Ok(User::from(model))
    }
}
