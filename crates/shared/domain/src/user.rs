//! User domain entity.

use serde::{Deserialize, Serialize};

/// User domain entity.
///
/// Mirrors one row of the `app_user` table. `id` is `None` until the store
/// assigns one on first save and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub username: String,
    pub email: String,
}

impl User {
    /// Create a transient (not yet persisted) user
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Check if the store has assigned an id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
