use super::model::User;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// 記憶體內的使用者儲存
#[derive(Debug)]
pub struct UserStore {
    users: RwLock<HashMap<u64, User>>,
    next_id: AtomicU64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, name: &str, email: &str, age: i32) -> User {
        let user = User {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            email: email.to_string(),
            age,
        };
        self.users.write().await.insert(user.id, user.clone());
        user
    }

    pub async fn get(&self, id: u64) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    /// email 比對不分大小寫
    pub async fn email_taken(&self, email: &str) -> bool {
        self.users
            .read()
            .await
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
