use crate::core::pipeline::{BoxResponse, DispatchContext, Next, PipelineBehavior};
use crate::core::registry::HandlerRegistry;
use crate::utils::error::{MediatorError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// 依請求類型查找驗證器；驗證失敗時不呼叫 `next()`
pub struct ValidationBehavior {
    registry: Arc<HandlerRegistry>,
}

impl ValidationBehavior {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl PipelineBehavior for ValidationBehavior {
    fn name(&self) -> &'static str {
        "Validation"
    }

    async fn handle<'a>(&self, ctx: &'a DispatchContext<'a>, next: Next<'a>) -> Result<BoxResponse> {
        let Some(validator) = self.registry.validator_for(&ctx.identity) else {
            tracing::trace!("No validator registered for {}", ctx.request_name());
            return next().await;
        };

        let result = validator.validate(ctx.request()).await?;
        if !result.is_valid() {
            tracing::warn!(
                "🚫 {} rejected by validation (dispatch #{}, {} failure(s))",
                ctx.request_name(),
                ctx.dispatch_id,
                result.errors.len()
            );
            return Err(MediatorError::Validation {
                request: ctx.request_name(),
                failures: result.errors,
            });
        }

        next().await
    }
}
