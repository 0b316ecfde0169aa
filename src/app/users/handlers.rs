use super::model::{CreateUser, GetUser, User, UserCreated};
use super::store::UserStore;
use crate::domain::ports::{NotificationHandler, RequestHandler};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 通知處理器寫入的紀錄，依寫入順序
pub type Journal = Arc<Mutex<Vec<String>>>;

pub struct CreateUserHandler {
    store: Arc<UserStore>,
}

impl CreateUserHandler {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for CreateUserHandler {
    type Request = CreateUser;

    async fn handle(&self, request: &CreateUser) -> Result<User> {
        let user = self
            .store
            .insert(&request.name, &request.email, request.age)
            .await;
        tracing::debug!("Stored user #{} <{}>", user.id, user.email);
        Ok(user)
    }
}

pub struct GetUserHandler {
    store: Arc<UserStore>,
}

impl GetUserHandler {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler for GetUserHandler {
    type Request = GetUser;

    async fn handle(&self, request: &GetUser) -> Result<Option<User>> {
        Ok(self.store.get(request.id).await)
    }
}

pub struct WelcomeEmailHandler {
    outbox: Journal,
}

impl WelcomeEmailHandler {
    pub fn new(outbox: Journal) -> Self {
        Self { outbox }
    }
}

#[async_trait]
impl NotificationHandler for WelcomeEmailHandler {
    type Notification = UserCreated;

    async fn handle(&self, notification: &UserCreated) -> Result<()> {
        let user = &notification.user;
        tracing::info!("📧 Queued welcome email for {} <{}>", user.name, user.email);
        self.outbox
            .lock()
            .await
            .push(format!("welcome:{}", user.email));
        Ok(())
    }

    fn name(&self) -> &str {
        "WelcomeEmail"
    }
}

pub struct AuditLogHandler {
    journal: Journal,
}

impl AuditLogHandler {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

#[async_trait]
impl NotificationHandler for AuditLogHandler {
    type Notification = UserCreated;

    async fn handle(&self, notification: &UserCreated) -> Result<()> {
        let entry = serde_json::to_string(&notification.user).map_err(anyhow::Error::from)?;
        self.journal.lock().await.push(format!("audit:{}", entry));
        Ok(())
    }

    fn name(&self) -> &str {
        "AuditLog"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = Arc::new(UserStore::new());
        let created = CreateUserHandler::new(store.clone())
            .handle(&CreateUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                age: 36,
            })
            .await
            .unwrap();

        let found = GetUserHandler::new(store)
            .handle(&GetUser { id: created.id })
            .await
            .unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_notification_handlers_write_journal() {
        let journal: Journal = Arc::default();
        let event = UserCreated {
            user: User {
                id: 7,
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                age: 45,
            },
        };

        WelcomeEmailHandler::new(journal.clone()).handle(&event).await.unwrap();
        AuditLogHandler::new(journal.clone()).handle(&event).await.unwrap();

        let entries = journal.lock().await;
        assert_eq!(entries[0], "welcome:grace@example.com");
        assert!(entries[1].starts_with("audit:{\"id\":7"));
    }
}
