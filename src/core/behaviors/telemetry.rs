use crate::config::TelemetryConfig;
use crate::core::pipeline::{BoxResponse, DispatchContext, Next, PipelineBehavior};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Cancelled,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Cancelled => "cancelled",
        }
    }
}

/// 單一請求類型的累計統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub total_duration: Duration,
}

impl RequestStats {
    pub fn average_duration(&self) -> Option<Duration> {
        if self.total == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            self.total_duration.as_secs_f64() / self.total as f64,
        ))
    }

    fn record(&mut self, outcome: Outcome, elapsed: Duration) {
        self.total += 1;
        self.total_duration += elapsed;
        match outcome {
            Outcome::Success => self.succeeded += 1,
            Outcome::Failure => self.failed += 1,
            Outcome::Cancelled => self.cancelled += 1,
        }
    }
}

/// 程序內的統計快照，可與 `Mediator` 共用
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    inner: Arc<Mutex<HashMap<&'static str, RequestStats>>>,
}

impl TelemetryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HashMap<&'static str, RequestStats> {
        match self.inner.lock() {
            Ok(map) => map.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn for_request(&self, request: &str) -> Option<RequestStats> {
        self.snapshot().get(request).cloned()
    }

    fn record(&self, request: &'static str, outcome: Outcome, elapsed: Duration) {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(request).or_default().record(outcome, elapsed);
    }
}

/// 為每次派發建立 span，並透過 `metrics` 輸出計數與耗時
pub struct TelemetryBehavior {
    requests_total: String,
    request_duration: String,
    stats: TelemetryStats,
}

impl TelemetryBehavior {
    pub fn new(config: &TelemetryConfig, stats: TelemetryStats) -> Self {
        Self {
            requests_total: format!("{}_requests_total", config.metrics_prefix),
            request_duration: format!("{}_request_duration_seconds", config.metrics_prefix),
            stats,
        }
    }

    pub fn snapshot(&self) -> HashMap<&'static str, RequestStats> {
        self.stats.snapshot()
    }

    pub fn metric_names(&self) -> (&str, &str) {
        (&self.requests_total, &self.request_duration)
    }
}

/// 無論成功、失敗或被取消，離開時都會記錄一次
struct DispatchMeter<'b> {
    behavior: &'b TelemetryBehavior,
    request: &'static str,
    span: tracing::Span,
    start: Instant,
    outcome: Option<Outcome>,
}

impl Drop for DispatchMeter<'_> {
    fn drop(&mut self) {
        let outcome = self.outcome.unwrap_or(Outcome::Cancelled);
        let elapsed = self.start.elapsed();

        self.span.record("outcome", outcome.as_str());
        self.span.record("elapsed_ms", elapsed.as_millis() as u64);

        metrics::counter!(
            self.behavior.requests_total.clone(),
            "request" => self.request,
            "outcome" => outcome.as_str()
        )
        .increment(1);
        metrics::histogram!(self.behavior.request_duration.clone(), "request" => self.request)
            .record(elapsed.as_secs_f64());

        self.behavior.stats.record(self.request, outcome, elapsed);
    }
}

#[async_trait]
impl PipelineBehavior for TelemetryBehavior {
    fn name(&self) -> &'static str {
        "Telemetry"
    }

    async fn handle<'a>(&self, ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse> {
        let span = tracing::info_span!(
            "mediator.dispatch",
            request = ctx.request_name(),
            dispatch_id = ctx.dispatch_id,
            outcome = tracing::field::Empty,
            elapsed_ms = tracing::field::Empty,
        );
        let mut meter = DispatchMeter {
            behavior: self,
            request: ctx.request_name(),
            span: span.clone(),
            start: Instant::now(),
            outcome: None,
        };

        let result = next().instrument(span).await;
        meter.outcome = Some(if result.is_ok() {
            Outcome::Success
        } else {
            Outcome::Failure
        });
        result
    }
}
