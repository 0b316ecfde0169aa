use crate::domain::model::ValidationFailure;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediatorError {
    #[error("Handler already registered for request: {request}")]
    DuplicateHandler { request: &'static str },

    #[error("Validator already registered for request: {request}")]
    DuplicateValidator { request: &'static str },

    #[error("Type name '{name}' is declared by more than one type")]
    TypeNameConflict { name: &'static str },

    #[error("No handler found for request: {request}")]
    HandlerNotFound { request: String },

    #[error("Validation failed for {request}: {} error(s)", .failures.len())]
    Validation {
        request: &'static str,
        failures: Vec<ValidationFailure>,
    },

    #[error(transparent)]
    Handler(#[from] anyhow::Error),

    #[error("Dispatch of {request} timed out after {timeout:?}")]
    Timeout {
        request: &'static str,
        timeout: Duration,
    },

    #[error("Value dispatched as {request} does not match its registered type")]
    TypeMismatch { request: &'static str },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 錯誤分類，對應派發流程中的不同階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Resolution,
    Validation,
    Handler,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MediatorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DuplicateHandler { .. }
            | Self::DuplicateValidator { .. }
            | Self::TypeNameConflict { .. }
            | Self::ConfigError { .. }
            | Self::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            Self::HandlerNotFound { .. } => ErrorCategory::Resolution,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Handler(_) | Self::Timeout { .. } => ErrorCategory::Handler,
            Self::TypeMismatch { .. } | Self::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Resolution => ErrorSeverity::Medium,
            ErrorCategory::Handler => match self {
                Self::Timeout { .. } => ErrorSeverity::Medium,
                _ => ErrorSeverity::High,
            },
            ErrorCategory::Configuration | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// 派發失敗時的程序退出碼；任何失敗都不會回傳 0
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    /// HTTP 層可用的狀態碼提示 (404 / 400 / 500 類)
    pub fn status_hint(&self) -> u16 {
        match self.category() {
            ErrorCategory::Resolution => 404,
            ErrorCategory::Validation => 400,
            ErrorCategory::Handler => match self {
                Self::Timeout { .. } => 504,
                _ => 500,
            },
            ErrorCategory::Configuration | ErrorCategory::Internal => 500,
        }
    }

    /// 取得驗證失敗清單（僅驗證錯誤）
    pub fn failures(&self) -> Option<&[ValidationFailure]> {
        match self {
            Self::Validation { failures, .. } => Some(failures),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::DuplicateHandler { request } => format!(
                "Register exactly one handler for '{}' during start-up",
                request
            ),
            Self::DuplicateValidator { request } => format!(
                "Combine the rules for '{}' into a single validator",
                request
            ),
            Self::TypeNameConflict { name } => format!(
                "Give each request and notification type a unique NAME (conflict on '{}')",
                name
            ),
            Self::HandlerNotFound { request } => format!(
                "Register a handler for '{}' before building the registry",
                request
            ),
            Self::Validation { .. } => "Correct the listed fields and resend the request".to_string(),
            Self::Handler(_) => "Inspect the handler logs for the underlying failure".to_string(),
            Self::Timeout { .. } => {
                "Increase mediator.dispatch_timeout_ms or investigate the slow handler".to_string()
            }
            Self::TypeMismatch { .. } => {
                "This indicates a bug in the dispatch pipeline; please report it".to_string()
            }
            Self::ConfigError { .. } | Self::InvalidConfigValue { .. } => {
                "Check the configuration file against the documented options".to_string()
            }
            Self::Io(_) => "Verify the file exists and is readable".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HandlerNotFound { request } => {
                format!("Nothing is able to process '{}'", request)
            }
            Self::Validation { failures, .. } => {
                let details: Vec<String> = failures
                    .iter()
                    .map(|f| format!("{}: {}", f.property_name, f.message))
                    .collect();
                format!("The request is invalid: {}", details.join("; "))
            }
            Self::Timeout { .. } => "The operation took too long to complete".to_string(),
            Self::Handler(e) => format!("The operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MediatorError>;
