use crate::config::MediatorConfig;
use crate::core::behaviors::{standard_pipeline, TelemetryStats};
use crate::core::pipeline::{BoxResponse, DispatchContext, Next, Pipeline};
use crate::core::registry::HandlerRegistry;
use crate::core::validation::panic_message;
use crate::domain::ports::{Notification, Request};
use crate::utils::error::{MediatorError, Result};
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 單一通知處理器的失敗紀錄
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishFailure {
    pub index: usize,
    pub handler: String,
    pub message: String,
}

/// `publish` 的結果：嘗試了幾個處理器、哪些失敗
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishReport {
    pub notification: &'static str,
    pub handlers: usize,
    pub failures: Vec<PublishFailure>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.handlers - self.failures.len()
    }
}

/// 派發引擎：`send` 走行為管線到唯一處理器，`publish` 逐一通知所有處理器
///
/// 註冊表在建立後只讀，多個派發可以同時進行而不需要額外的鎖。
pub struct Mediator {
    registry: Arc<HandlerRegistry>,
    pipeline: Pipeline,
    telemetry: TelemetryStats,
    timeout: Option<Duration>,
    next_id: AtomicU64,
}

impl Mediator {
    /// 依配置建立標準管線 (Validation → Logging → Telemetry)
    pub fn new(registry: Arc<HandlerRegistry>, config: &MediatorConfig) -> Self {
        let telemetry = TelemetryStats::new();
        let pipeline = standard_pipeline(registry.clone(), config, telemetry.clone());

        tracing::info!(
            "🚀 Mediator '{}' ready: pipeline [{}], {} handler(s)",
            config.mediator.name,
            pipeline.behavior_names().join(" → "),
            registry.handler_count()
        );

        Self {
            registry,
            pipeline,
            telemetry,
            timeout: config.dispatch_timeout(),
            next_id: AtomicU64::new(1),
        }
    }

    /// 使用自訂管線，不設逾時
    pub fn with_pipeline(registry: Arc<HandlerRegistry>, pipeline: Pipeline) -> Self {
        Self {
            registry,
            pipeline,
            telemetry: TelemetryStats::new(),
            timeout: None,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn telemetry(&self) -> &TelemetryStats {
        &self.telemetry
    }

    fn next_dispatch_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// 派發請求給唯一的處理器
    ///
    /// 找不到處理器時直接回傳 `HandlerNotFound`，不會執行任何行為。
    /// 處理器或驗證的錯誤原樣回傳給呼叫者。
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response> {
        let Some(handler) = self.registry.resolve::<R>() else {
            tracing::warn!("🔍 No handler registered for {}", R::NAME);
            return Err(MediatorError::HandlerNotFound {
                request: R::NAME.to_string(),
            });
        };

        let ctx = DispatchContext::new(self.next_dispatch_id(), R::identity(), &request)
            .with_timeout(self.timeout);
        let typed = &request;
        let invoke: Next<'_> = Box::new(move || {
            async move {
                let response = handler.handle(typed).await?;
                Ok::<BoxResponse, MediatorError>(Box::new(response))
            }
            .boxed()
        });

        let dispatch = self.pipeline.execute(&ctx, invoke);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, dispatch).await.map_err(|_| {
                tracing::warn!(
                    "⏱️ {} (dispatch #{}) timed out after {:?}",
                    R::NAME,
                    ctx.dispatch_id,
                    limit
                );
                MediatorError::Timeout {
                    request: R::NAME,
                    timeout: limit,
                }
            })??,
            None => dispatch.await?,
        };

        response
            .into_any()
            .downcast::<R::Response>()
            .map(|boxed| *boxed)
            .map_err(|_| MediatorError::TypeMismatch { request: R::NAME })
    }

    /// 依註冊順序逐一通知所有處理器
    ///
    /// 每個處理器的錯誤或 panic 都會被記錄並收進報告，不會阻止其餘處理器執行。
    pub async fn publish<N: Notification>(&self, notification: N) -> PublishReport {
        let handlers = self.registry.resolve_all::<N>();
        if handlers.is_empty() {
            tracing::debug!("No handlers for notification {}", N::NAME);
        }

        let mut failures = Vec::new();
        for (index, handler) in handlers.iter().enumerate() {
            let message = match AssertUnwindSafe(handler.handle(&notification))
                .catch_unwind()
                .await
            {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            tracing::error!(
                "❌ Notification handler #{} ({}) failed for {}: {}",
                index,
                handler.name(),
                N::NAME,
                message
            );
            failures.push(PublishFailure {
                index,
                handler: handler.name().to_string(),
                message,
            });
        }

        let report = PublishReport {
            notification: N::NAME,
            handlers: handlers.len(),
            failures,
        };
        tracing::info!(
            "📣 Published {}: {}/{} handler(s) succeeded",
            N::NAME,
            report.succeeded(),
            report.handlers
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::{ErasedResponse, PipelineBehavior};
    use crate::domain::ports::{NotificationHandler, RequestHandler};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;

    #[derive(Debug)]
    struct Double(u32);

    impl Request for Double {
        type Response = u32;
        const NAME: &'static str = "Double";
    }

    struct DoubleHandler;

    #[async_trait]
    impl RequestHandler for DoubleHandler {
        type Request = Double;

        async fn handle(&self, request: &Double) -> Result<u32> {
            Ok(request.0 * 2)
        }
    }

    #[derive(Debug)]
    struct Sleep(u64);

    impl Request for Sleep {
        type Response = ();
        const NAME: &'static str = "Sleep";
    }

    struct SleepHandler;

    #[async_trait]
    impl RequestHandler for SleepHandler {
        type Request = Sleep;

        async fn handle(&self, request: &Sleep) -> Result<()> {
            tokio::time::sleep(Duration::from_millis(request.0)).await;
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Unregistered;

    impl Request for Unregistered {
        type Response = ();
        const NAME: &'static str = "Unregistered";
    }

    #[derive(Debug)]
    struct Tick;

    impl Notification for Tick {
        const NAME: &'static str = "Tick";
    }

    struct Panicky;

    #[async_trait]
    impl NotificationHandler for Panicky {
        type Notification = Tick;

        async fn handle(&self, _notification: &Tick) -> Result<()> {
            panic!("subscriber exploded");
        }

        fn name(&self) -> &str {
            "Panicky"
        }
    }

    struct Flag(Arc<AtomicBool>);

    #[async_trait]
    impl NotificationHandler for Flag {
        type Notification = Tick;

        async fn handle(&self, _notification: &Tick) -> Result<()> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    /// 把回應換成錯誤型別的行為
    struct Swap;

    #[async_trait]
    impl PipelineBehavior for Swap {
        fn name(&self) -> &'static str {
            "Swap"
        }

        async fn handle<'a>(&self, _ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse> {
            next().await?;
            Ok(Box::new("not a number") as Box<dyn ErasedResponse>)
        }
    }

    fn registry(flag: Arc<AtomicBool>) -> Arc<HandlerRegistry> {
        let mut builder = HandlerRegistry::builder();
        builder
            .register_handler(DoubleHandler)
            .unwrap()
            .register_handler(SleepHandler)
            .unwrap()
            .register_notification_handler(Panicky)
            .unwrap()
            .register_notification_handler(Flag(flag))
            .unwrap();
        Arc::new(builder.build())
    }

    #[tokio::test]
    async fn test_send_returns_handler_response() {
        let mediator = Mediator::new(registry(Arc::default()), &MediatorConfig::default());
        assert_eq!(mediator.send(Double(21)).await.unwrap(), 42);

        let stats = mediator.telemetry().for_request("Double").unwrap();
        assert_eq!(stats.succeeded, 1);
    }

    #[tokio::test]
    async fn test_send_without_handler_is_not_found() {
        let mediator = Mediator::new(registry(Arc::default()), &MediatorConfig::default());
        let err = mediator.send(Unregistered).await.unwrap_err();

        assert!(matches!(err, MediatorError::HandlerNotFound { ref request } if request == "Unregistered"));
        assert_eq!(err.status_hint(), 404);
        // 沒有任何行為被執行
        assert!(mediator.telemetry().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_send_times_out() {
        let mediator = Mediator::with_pipeline(registry(Arc::default()), Pipeline::empty())
            .with_timeout(Some(Duration::from_millis(20)));

        assert!(mediator.send(Sleep(1)).await.is_ok());
        let err = mediator.send(Sleep(500)).await.unwrap_err();
        assert!(matches!(err, MediatorError::Timeout { request: "Sleep", .. }));
    }

    #[tokio::test]
    async fn test_replaced_response_is_type_mismatch() {
        let pipeline = Pipeline::builder().then(Arc::new(Swap)).build();
        let mediator = Mediator::with_pipeline(registry(Arc::default()), pipeline);

        let err = mediator.send(Double(1)).await.unwrap_err();
        assert!(matches!(err, MediatorError::TypeMismatch { request: "Double" }));
    }

    #[tokio::test]
    async fn test_publish_isolates_panicking_handler() {
        let flag = Arc::new(AtomicBool::new(false));
        let mediator = Mediator::with_pipeline(registry(flag.clone()), Pipeline::empty());

        let report = mediator.publish(Tick).await;

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(report.handlers, 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failures[0].index, 0);
        assert_eq!(report.failures[0].handler, "Panicky");
        assert!(report.failures[0].message.contains("subscriber exploded"));
    }

    #[tokio::test]
    async fn test_publish_without_handlers_is_noop() {
        let mediator =
            Mediator::with_pipeline(Arc::new(HandlerRegistry::builder().build()), Pipeline::empty());
        let report = mediator.publish(Tick).await;
        assert_eq!(report.handlers, 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_dispatch_ids_increase() {
        let mediator =
            Mediator::with_pipeline(Arc::new(HandlerRegistry::builder().build()), Pipeline::empty());
        let first = mediator.next_dispatch_id();
        assert!(mediator.next_dispatch_id() > first);
    }
}
