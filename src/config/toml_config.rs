use crate::utils::error::{MediatorError, Result};
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorConfig {
    pub mediator: MediatorSection,
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediatorSection {
    pub name: String,
    /// 單次 `send` 的逾時（毫秒）；未設定則不限制
    pub dispatch_timeout_ms: Option<u64>,
}

impl Default for MediatorSection {
    fn default() -> Self {
        Self {
            name: "small-mediator".to_string(),
            dispatch_timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub slow_request_threshold_ms: u64,
    pub log_responses: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slow_request_threshold_ms: 500,
            log_responses: false,
        }
    }
}

impl LoggingConfig {
    pub fn slow_request_threshold(&self) -> Duration {
        Duration::from_millis(self.slow_request_threshold_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub metrics_prefix: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            metrics_prefix: "mediator".to_string(),
        }
    }
}

impl MediatorConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MediatorError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MediatorError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SLOW_MS})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MediatorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn dispatch_timeout(&self) -> Option<Duration> {
        self.mediator.dispatch_timeout_ms.map(Duration::from_millis)
    }

}

impl Validate for MediatorConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("mediator.name", &self.mediator.name)?;

        if let Some(timeout) = self.mediator.dispatch_timeout_ms {
            validate_positive_number("mediator.dispatch_timeout_ms", timeout, 1)?;
        }

        if self.telemetry.enabled {
            validate_identifier("telemetry.metrics_prefix", &self.telemetry.metrics_prefix)?;
        }

        Ok(())
    }
}
