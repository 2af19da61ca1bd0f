//! Unit of Work pattern implementation.
//!
//! The Unit of Work:
//! - Centralizes access to the user repository
//! - Runs a closure inside one transaction (commit on `Ok`, rollback on `Err`)
//! - Hands the closure a repository bound to that transaction

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, IsolationLevel,
    TransactionTrait,
};

use common::AppResult;
use domain::User;

use crate::repository::{queries, InMemoryUserStore, UserRepository, UserStore};

/// Unit of Work trait for dependency injection.
///
/// Not object safe because of the generic `transaction` method; services are
/// generic over it instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository (outside any transaction)
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Execute a closure within a transaction.
    ///
    /// The transaction is committed when the closure returns `Ok` and rolled
    /// back when it returns `Err`. Nothing written inside is visible to other
    /// callers before the commit.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send;
}

/// Transaction context providing repository access within a transaction.
///
/// All repository operations performed through this context are part
/// of the same transaction.
pub struct TransactionContext<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> TransactionContext<'a> {
    /// Create a context over a transaction-bound repository
    pub fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Get user repository for this transaction
    pub fn users(&self) -> &'a dyn UserRepository {
        self.users
    }
}

/// Concrete implementation of UnitOfWork over SeaORM
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    isolation: Option<IsolationLevel>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        // SQLite has no per-transaction isolation setting
        let isolation = match db.get_database_backend() {
            DbBackend::Sqlite => None,
            _ => Some(IsolationLevel::ReadCommitted),
        };
        let user_repo = Arc::new(UserStore::new(db.clone()));

        Self {
            db,
            user_repo,
            isolation,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        let txn = self.db.begin_with_config(self.isolation, None).await?;

        let outcome = {
            let repo = TxUserRepository::new(&txn);
            f(TransactionContext::new(&repo)).await
        };

        match outcome {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user repository.
///
/// Executes all operations within the borrowed transaction.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    /// Create new transaction-aware repository
    pub fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl<'a> UserRepository for TxUserRepository<'a> {
    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        queries::find_by_id(self.txn, id).await
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        queries::find_all(self.txn).await
    }

    async fn update_by_id(&self, id: i64, username: String, email: String) -> AppResult<u64> {
        queries::update_by_id(self.txn, id, username, email).await
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        queries::delete_by_id(self.txn, id).await
    }

    async fn save(&self, user: User) -> AppResult<User> {
        queries::save(self.txn, user).await
    }
}

/// UnitOfWork over an [`InMemoryUserStore`].
///
/// Transactions run one at a time against a staged copy of the store; the
/// copy replaces the live state on success and is dropped on failure.
/// The store's write lock is held throughout, so writes through `users()`,
/// `store()` or any other handle to the same store wait for the commit.
/// Such a write issued from inside the closure never completes.
#[derive(Default)]
pub struct InMemoryPersistence {
    store: Arc<InMemoryUserStore>,
}

impl InMemoryPersistence {
    /// Create a unit of work over an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a unit of work over an existing store
    pub fn with_store(store: Arc<InMemoryUserStore>) -> Self {
        Self { store }
    }

    /// Get the live store
    pub fn store(&self) -> Arc<InMemoryUserStore> {
        self.store.clone()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryPersistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.store.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> BoxFuture<'a, AppResult<T>> + Send,
        T: Send,
    {
        let _writes = self.store.lock_writes().await;
        let staging = InMemoryUserStore::from_state(self.store.snapshot().await);

        let outcome = f(TransactionContext::new(&staging)).await;

        match outcome {
            Ok(result) => {
                self.store.replace(staging.into_state()).await;
                Ok(result)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Discarded in-memory transaction");
                Err(e)
            }
        }
    }
}

/// Simpler API for executing transactional operations.
///
/// This helper macro reduces boilerplate when using transactions.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(|$ctx| Box::pin(async move { $body })).await
    };
}
