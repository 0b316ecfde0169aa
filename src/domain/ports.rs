use crate::domain::model::{TypeIdentity, ValidationResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt::Debug;

/// 派發給唯一處理器的命令或查詢
pub trait Request: Send + Sync + 'static {
    type Response: Send + Debug + 'static;

    /// 類型識別名稱，作為註冊表與日誌的鍵
    const NAME: &'static str;

    fn identity() -> TypeIdentity
    where
        Self: Sized,
    {
        TypeIdentity::of::<Self>(Self::NAME)
    }
}

/// 已發生的事實（領域事件），可有零到多個處理器
pub trait Notification: Send + Sync + Debug + 'static {
    const NAME: &'static str;

    fn identity() -> TypeIdentity
    where
        Self: Sized,
    {
        TypeIdentity::of::<Self>(Self::NAME)
    }
}

/// 請求處理器，透過關聯型別標記其目標請求
#[async_trait]
pub trait RequestHandler: Send + Sync {
    type Request: Request;

    async fn handle(
        &self,
        request: &Self::Request,
    ) -> Result<<Self::Request as Request>::Response>;
}

#[async_trait]
pub trait NotificationHandler: Send + Sync {
    type Notification: Notification;

    async fn handle(&self, notification: &Self::Notification) -> Result<()>;

    /// 用於在發布失敗時標識處理器
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
pub trait Validator<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn validate(&self, instance: &T) -> ValidationResult;
}
