use crate::domain::model::{TypeIdentity, ValidationResult};
use crate::domain::ports::{Notification, NotificationHandler, Request, RequestHandler, Validator};
use crate::utils::error::{MediatorError, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type SharedRequestHandler<R> = Arc<dyn RequestHandler<Request = R>>;
type SharedNotificationHandler<N> = Arc<dyn NotificationHandler<Notification = N>>;

/// 一組在啟動時一併註冊的處理器
pub trait HandlerModule: Send + Sync {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut RegistryBuilder) -> Result<()>;
}

/// 抹除請求型別的驗證器，供驗證行為以類型識別查找
pub(crate) trait ErasedValidator: Send + Sync {
    fn validate<'a>(
        &'a self,
        request: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<ValidationResult>>;
}

struct ValidatorAdapter<R: Request> {
    inner: Arc<dyn Validator<R>>,
}

impl<R: Request> ErasedValidator for ValidatorAdapter<R> {
    fn validate<'a>(
        &'a self,
        request: &'a (dyn Any + Send + Sync),
    ) -> BoxFuture<'a, Result<ValidationResult>> {
        match request.downcast_ref::<R>() {
            Some(typed) => self.inner.validate(typed).map(Ok).boxed(),
            None => futures::future::ready(Err(MediatorError::TypeMismatch { request: R::NAME }))
                .boxed(),
        }
    }
}

struct RequestEntry {
    identity: TypeIdentity,
    // Arc<dyn RequestHandler<Request = R>>
    handler: Box<dyn Any + Send + Sync>,
}

struct NotificationEntry {
    identity: TypeIdentity,
    // Vec<Arc<dyn NotificationHandler<Notification = N>>>，依註冊順序
    handlers: Box<dyn Any + Send + Sync>,
    count: usize,
}

struct ValidatorEntry {
    // Arc<dyn Validator<R>>
    typed: Box<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedValidator>,
}

/// 註冊階段：接受處理器與驗證器，`build` 後封存為唯讀的 `HandlerRegistry`
#[derive(Default)]
pub struct RegistryBuilder {
    requests: HashMap<TypeId, RequestEntry>,
    notifications: HashMap<TypeId, NotificationEntry>,
    validators: HashMap<TypeId, ValidatorEntry>,
    names: HashMap<&'static str, TypeIdentity>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一名稱只能對應一個型別
    fn claim_name(&mut self, identity: TypeIdentity) -> Result<()> {
        match self.names.get(identity.name) {
            Some(existing) if existing.id != identity.id => Err(MediatorError::TypeNameConflict {
                name: identity.name,
            }),
            Some(_) => Ok(()),
            None => {
                self.names.insert(identity.name, identity);
                Ok(())
            }
        }
    }

    pub fn register_handler<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: RequestHandler + 'static,
    {
        let shared: SharedRequestHandler<H::Request> = Arc::new(handler);
        self.register_shared_handler(shared)
    }

    /// 每種請求最多一個處理器，重複註冊屬於設定錯誤
    pub fn register_shared_handler<R: Request>(
        &mut self,
        handler: SharedRequestHandler<R>,
    ) -> Result<&mut Self> {
        let identity = R::identity();
        if self.requests.contains_key(&identity.id) {
            return Err(MediatorError::DuplicateHandler { request: R::NAME });
        }
        self.claim_name(identity)?;

        self.requests.insert(
            identity.id,
            RequestEntry {
                identity,
                handler: Box::new(handler),
            },
        );
        tracing::debug!("Registered request handler for {}", identity);
        Ok(self)
    }

    pub fn register_notification_handler<H>(&mut self, handler: H) -> Result<&mut Self>
    where
        H: NotificationHandler + 'static,
    {
        let shared: SharedNotificationHandler<H::Notification> = Arc::new(handler);
        self.register_shared_notification_handler(shared)
    }

    /// 通知處理器依註冊順序附加，此順序即發布時的呼叫順序
    pub fn register_shared_notification_handler<N: Notification>(
        &mut self,
        handler: SharedNotificationHandler<N>,
    ) -> Result<&mut Self> {
        let identity = N::identity();
        self.claim_name(identity)?;

        let entry = self
            .notifications
            .entry(identity.id)
            .or_insert_with(|| NotificationEntry {
                identity,
                handlers: Box::new(Vec::<SharedNotificationHandler<N>>::new()),
                count: 0,
            });

        let handlers = entry
            .handlers
            .downcast_mut::<Vec<SharedNotificationHandler<N>>>()
            .ok_or(MediatorError::TypeMismatch { request: N::NAME })?;
        tracing::debug!(
            "Registered notification handler #{} ({}) for {}",
            handlers.len(),
            handler.name(),
            identity
        );
        handlers.push(handler);
        entry.count = handlers.len();
        Ok(self)
    }

    pub fn register_validator<R, V>(&mut self, validator: V) -> Result<&mut Self>
    where
        R: Request,
        V: Validator<R> + 'static,
    {
        let shared: Arc<dyn Validator<R>> = Arc::new(validator);
        self.register_shared_validator(shared)
    }

    pub fn register_shared_validator<R: Request>(
        &mut self,
        validator: Arc<dyn Validator<R>>,
    ) -> Result<&mut Self> {
        let identity = R::identity();
        if self.validators.contains_key(&identity.id) {
            return Err(MediatorError::DuplicateValidator { request: R::NAME });
        }
        self.claim_name(identity)?;

        let erased: Arc<dyn ErasedValidator> = Arc::new(ValidatorAdapter::<R> {
            inner: validator.clone(),
        });
        self.validators.insert(
            identity.id,
            ValidatorEntry {
                typed: Box::new(validator),
                erased,
            },
        );
        tracing::debug!("Registered validator for {}", identity);
        Ok(self)
    }

    pub fn install(&mut self, module: &dyn HandlerModule) -> Result<&mut Self> {
        tracing::debug!("Installing handler module: {}", module.name());
        module.register(self)?;
        Ok(self)
    }

    /// 封存註冊表，之後不再接受任何註冊
    pub fn build(self) -> HandlerRegistry {
        tracing::info!(
            "📚 Handler registry sealed: {} request handler(s), {} notification type(s), {} validator(s)",
            self.requests.len(),
            self.notifications.len(),
            self.validators.len()
        );
        HandlerRegistry {
            requests: self.requests,
            notifications: self.notifications,
            validators: self.validators,
            names: self.names,
        }
    }
}

/// 封存後的唯讀註冊表，可安全地被多個派發同時讀取
pub struct HandlerRegistry {
    requests: HashMap<TypeId, RequestEntry>,
    notifications: HashMap<TypeId, NotificationEntry>,
    validators: HashMap<TypeId, ValidatorEntry>,
    names: HashMap<&'static str, TypeIdentity>,
}

impl HandlerRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn resolve<R: Request>(&self) -> Option<SharedRequestHandler<R>> {
        self.requests
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.handler.downcast_ref::<SharedRequestHandler<R>>())
            .cloned()
    }

    /// 取得通知的全部處理器（可能為空），依註冊順序
    pub fn resolve_all<N: Notification>(&self) -> Vec<SharedNotificationHandler<N>> {
        self.notifications
            .get(&TypeId::of::<N>())
            .and_then(|entry| entry.handlers.downcast_ref::<Vec<SharedNotificationHandler<N>>>())
            .cloned()
            .unwrap_or_default()
    }

    pub fn resolve_validator<R: Request>(&self) -> Option<Arc<dyn Validator<R>>> {
        self.validators
            .get(&TypeId::of::<R>())
            .and_then(|entry| entry.typed.downcast_ref::<Arc<dyn Validator<R>>>())
            .cloned()
    }

    pub(crate) fn validator_for(&self, identity: &TypeIdentity) -> Option<Arc<dyn ErasedValidator>> {
        self.validators
            .get(&identity.id)
            .map(|entry| entry.erased.clone())
    }

    pub fn contains<R: Request>(&self) -> bool {
        self.requests.contains_key(&TypeId::of::<R>())
    }

    pub fn identity_by_name(&self, name: &str) -> Option<TypeIdentity> {
        self.names.get(name).copied()
    }

    pub fn request_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.requests.values().map(|e| e.identity.name).collect();
        names.sort_unstable();
        names
    }

    pub fn notification_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .notifications
            .values()
            .map(|e| e.identity.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// 通知處理器數量（所有通知合計）
    pub fn notification_handler_count(&self) -> usize {
        self.notifications.values().map(|e| e.count).sum()
    }

    pub fn handler_count(&self) -> usize {
        self.requests.len() + self.notification_handler_count()
    }
}
