use crate::domain::model::TypeIdentity;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::any::Any;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 型別抹除後的回應值，保留 `Debug` 以便記錄結果
pub trait ErasedResponse: Any + Send + Debug {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<T: Any + Send + Debug> ErasedResponse for T {
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

pub type BoxResponse = Box<dyn ErasedResponse>;

/// 管線中的下一步；行為可以不呼叫它以中止管線
pub type Next<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<BoxResponse>> + Send + 'a>;

/// 單次派發的上下文，每次 `send` 各自建立
pub struct DispatchContext<'a> {
    pub dispatch_id: u64,
    pub identity: TypeIdentity,
    pub started_at: DateTime<Utc>,
    request: &'a (dyn Any + Send + Sync),
    deadline: Option<Instant>,
}

impl<'a> DispatchContext<'a> {
    pub fn new(
        dispatch_id: u64,
        identity: TypeIdentity,
        request: &'a (dyn Any + Send + Sync),
    ) -> Self {
        Self {
            dispatch_id,
            identity,
            started_at: Utc::now(),
            request,
            deadline: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.deadline = timeout.map(|t| Instant::now() + t);
        self
    }

    pub fn request_name(&self) -> &'static str {
        self.identity.name
    }

    /// 以唯讀方式取得請求
    pub fn request(&self) -> &'a (dyn Any + Send + Sync) {
        self.request
    }

    pub fn request_as<R: Any>(&self) -> Option<&'a R> {
        self.request.downcast_ref::<R>()
    }

    /// 派發期限；未設定逾時則為 `None`
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

/// 包裹處理器呼叫的中介層
///
/// 行為可以在 `next()` 之前、之後或前後執行工作，也可以不呼叫 `next()`。
/// 行為不得假設自己在鏈中的位置，且必須傳遞 `next()` 的錯誤。
#[async_trait]
pub trait PipelineBehavior: Send + Sync {
    fn name(&self) -> &'static str;

    async fn handle<'a>(&self, ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse>;
}

/// 固定順序的行為清單，由外而內包裹處理器
#[derive(Clone, Default)]
pub struct Pipeline {
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// 只有處理器本身的空管線
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn behavior_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// 由右至左折疊行為，最內層為處理器，然後呼叫最外層一次
    pub async fn execute<'a>(&'a self, ctx: &'a DispatchContext<'a>, handler: Next<'a>) -> Result<BoxResponse> {
        let chain = self
            .behaviors
            .iter()
            .rev()
            .fold(handler, |next, behavior| wrap(behavior.as_ref(), ctx, next));
        chain().await
    }
}

fn wrap<'a>(behavior: &'a dyn PipelineBehavior, ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Next<'a> {
    Box::new(move || behavior.handle(ctx, next))
}

#[derive(Default)]
pub struct PipelineBuilder {
    behaviors: Vec<Arc<dyn PipelineBehavior>>,
}

impl PipelineBuilder {
    /// 加入下一層（越早加入越外層）
    pub fn then(mut self, behavior: Arc<dyn PipelineBehavior>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            behaviors: self.behaviors,
        }
    }
}
