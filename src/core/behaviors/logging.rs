use crate::config::LoggingConfig;
use crate::core::pipeline::{BoxResponse, DispatchContext, Next, PipelineBehavior};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// 記錄每次派發的開始、耗時與結果
pub struct LoggingBehavior {
    slow_threshold: Duration,
    log_responses: bool,
}

impl LoggingBehavior {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            slow_threshold: config.slow_request_threshold(),
            log_responses: config.log_responses,
        }
    }
}

impl Default for LoggingBehavior {
    fn default() -> Self {
        Self::new(&LoggingConfig::default())
    }
}

/// 離開作用域時一定會留下結束紀錄，包括 panic 或被取消的情況
struct DispatchLog {
    request: &'static str,
    dispatch_id: u64,
    start: Instant,
    slow_threshold: Duration,
    finished: bool,
}

impl DispatchLog {
    fn start(ctx: &DispatchContext<'_>, slow_threshold: Duration) -> Self {
        tracing::info!(
            "▶️ Handling {} (dispatch #{}, started {})",
            ctx.request_name(),
            ctx.dispatch_id,
            ctx.started_at.to_rfc3339()
        );
        Self {
            request: ctx.request_name(),
            dispatch_id: ctx.dispatch_id,
            start: Instant::now(),
            slow_threshold,
            finished: false,
        }
    }

    fn finish(&mut self, result: &Result<BoxResponse>, log_responses: bool) -> Duration {
        self.finished = true;
        let elapsed = self.start.elapsed();

        match result {
            Ok(response) => {
                tracing::info!(
                    "✅ Handled {} (dispatch #{}) in {:?}",
                    self.request,
                    self.dispatch_id,
                    elapsed
                );
                if log_responses {
                    tracing::debug!("📦 {} response: {:?}", self.request, response);
                }
            }
            Err(e) => {
                tracing::error!(
                    "❌ {} failed (dispatch #{}) after {:?}: {} (Category: {:?})",
                    self.request,
                    self.dispatch_id,
                    elapsed,
                    e,
                    e.category()
                );
            }
        }

        if elapsed > self.slow_threshold {
            tracing::warn!(
                "🐢 Slow request {} took {:?} (threshold {:?})",
                self.request,
                elapsed,
                self.slow_threshold
            );
        }
        elapsed
    }
}

impl Drop for DispatchLog {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(
                "⚠️ {} (dispatch #{}) abandoned after {:?}",
                self.request,
                self.dispatch_id,
                self.start.elapsed()
            );
        }
    }
}

#[async_trait]
impl PipelineBehavior for LoggingBehavior {
    fn name(&self) -> &'static str {
        "Logging"
    }

    async fn handle<'a>(&self, ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse> {
        let mut log = DispatchLog::start(ctx, self.slow_threshold);
        let result = next().await;
        log.finish(&result, self.log_responses);
        result
    }
}
