//! Read-side view of the user registry
//!
//! Registration and profile editing live outside this crate; the
//! pipeline only ever looks users up to learn their name, phone and
//! emergency contacts.

use crate::error::CoreResult;
use crate::model::User;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` for an unknown id; `Err(Unavailable)` when the
    /// backing registry cannot be reached.
    async fn find_user(&self, user_id: &str) -> CoreResult<Option<User>>;
}

/// In-memory directory used by the binary and tests
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_user(&self, user_id: &str) -> CoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}
