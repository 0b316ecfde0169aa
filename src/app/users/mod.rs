//! 記憶體內的使用者功能：建立、查詢與 `UserCreated` 通知

pub mod handlers;
pub mod model;
pub mod store;
pub mod validators;

pub use handlers::{AuditLogHandler, CreateUserHandler, GetUserHandler, Journal, WelcomeEmailHandler};
pub use model::{CreateUser, GetUser, User, UserCreated};
pub use store::UserStore;
pub use validators::{create_user_validator, get_user_validator};

use crate::core::registry::{HandlerModule, RegistryBuilder};
use crate::utils::error::Result;
use std::sync::Arc;

/// 一次註冊使用者功能的全部處理器與驗證器
#[derive(Default)]
pub struct UsersModule {
    store: Arc<UserStore>,
    journal: Journal,
}

impl UsersModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Arc<UserStore> {
        self.store.clone()
    }

    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl HandlerModule for UsersModule {
    fn name(&self) -> &str {
        "users"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> Result<()> {
        registry
            .register_handler(CreateUserHandler::new(self.store.clone()))?
            .register_handler(GetUserHandler::new(self.store.clone()))?
            .register_validator::<CreateUser, _>(create_user_validator(self.store.clone()))?
            .register_validator::<GetUser, _>(get_user_validator())?
            .register_notification_handler(WelcomeEmailHandler::new(self.journal.clone()))?
            .register_notification_handler(AuditLogHandler::new(self.journal.clone()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::HandlerRegistry;

    #[test]
    fn test_module_registers_everything() {
        let module = UsersModule::new();
        let mut builder = HandlerRegistry::builder();
        builder.install(&module).unwrap();
        let registry = builder.build();

        assert_eq!(registry.request_names(), vec!["CreateUser", "GetUser"]);
        assert_eq!(registry.notification_names(), vec!["UserCreated"]);
        assert_eq!(registry.notification_handler_count(), 2);
        assert!(registry.resolve_validator::<CreateUser>().is_some());
    }

    #[test]
    fn test_installing_twice_is_a_configuration_error() {
        let module = UsersModule::new();
        let mut builder = HandlerRegistry::builder();
        builder.install(&module).unwrap();
        assert!(builder.install(&module).is_err());
    }
}
