//! In-memory user repository.
//!
//! Same contract as the SeaORM store, with ids handed out from a counter
//! that never reuses a value.
//!
//! Writes are serialised by a per-store lock. An in-memory transaction holds
//! that lock until it commits or rolls back, so a direct write issued while
//! one is open waits for it instead of being overwritten by the commit.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use common::AppResult;
use domain::User;

use super::UserRepository;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

/// UserRepository kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    state: RwLock<MemoryState>,
    writer: Mutex<()>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    /// Whether the store holds no users
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub(crate) fn from_state(state: MemoryState) -> Self {
        Self {
            state: RwLock::new(state),
            writer: Mutex::new(()),
        }
    }

    /// Block every other writer until the guard is dropped
    pub(crate) async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    pub(crate) fn into_state(self) -> MemoryState {
        self.state.into_inner()
    }

    pub(crate) async fn snapshot(&self) -> MemoryState {
        self.state.read().await.clone()
    }

    pub(crate) async fn replace(&self, state: MemoryState) {
        *self.state.write().await = state;
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn get_by_id(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.state.read().await.rows.values().cloned().collect())
    }

    async fn update_by_id(&self, id: i64, username: String, email: String) -> AppResult<u64> {
        let _writer = self.lock_writes().await;
        let mut state = self.state.write().await;

        match state.rows.get_mut(&id) {
            Some(row) => {
                row.username = username;
                row.email = email;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let _writer = self.lock_writes().await;
        self.state.write().await.rows.remove(&id);
        Ok(())
    }

    async fn save(&self, mut user: User) -> AppResult<User> {
        let _writer = self.lock_writes().await;
        let mut state = self.state.write().await;

        let id = match user.id {
            Some(id) if state.rows.contains_key(&id) => id,
            _ => {
                state.last_id += 1;
                state.last_id
            }
        };

        user.id = Some(id);
        state.rows.insert(id, user.clone());
        Ok(user)
    }
}
