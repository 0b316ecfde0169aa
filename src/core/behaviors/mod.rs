pub mod logging;
pub mod telemetry;
pub mod validation;

pub use logging::LoggingBehavior;
pub use telemetry::{Outcome, RequestStats, TelemetryBehavior, TelemetryStats};
pub use validation::ValidationBehavior;

use crate::config::MediatorConfig;
use crate::core::pipeline::Pipeline;
use crate::core::registry::HandlerRegistry;
use std::sync::Arc;

/// 標準管線：Validation → Logging → Telemetry → 處理器
///
/// 驗證永遠在最外層，被拒絕的請求不會進入後續的行為。
/// 停用的行為直接略過，其餘行為的相對順序不變。
pub fn standard_pipeline(
    registry: Arc<HandlerRegistry>,
    config: &MediatorConfig,
    stats: TelemetryStats,
) -> Pipeline {
    let mut builder = Pipeline::builder().then(Arc::new(ValidationBehavior::new(registry)));

    if config.logging.enabled {
        builder = builder.then(Arc::new(LoggingBehavior::new(&config.logging)));
    }
    if config.telemetry.enabled {
        builder = builder.then(Arc::new(TelemetryBehavior::new(&config.telemetry, stats)));
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_order() {
        let registry = Arc::new(HandlerRegistry::builder().build());
        let pipeline = standard_pipeline(registry, &MediatorConfig::default(), TelemetryStats::new());
        assert_eq!(pipeline.behavior_names(), vec!["Validation", "Logging", "Telemetry"]);
    }

    #[test]
    fn test_disabled_behaviors_are_skipped() {
        let mut config = MediatorConfig::default();
        config.logging.enabled = false;

        let registry = Arc::new(HandlerRegistry::builder().build());
        let pipeline = standard_pipeline(registry, &config, TelemetryStats::new());
        assert_eq!(pipeline.behavior_names(), vec!["Validation", "Telemetry"]);
    }
}
