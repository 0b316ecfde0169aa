use crate::utils::error::{MediatorError, Result};
use regex::Regex;

/// 配置值的自我檢查
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MediatorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(MediatorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 指標名稱前綴只能包含英數字與底線，且不可以數字開頭
pub fn validate_identifier(field_name: &str, value: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| MediatorError::ConfigError {
        message: format!("Invalid identifier pattern: {}", e),
    })?;

    if !re.is_match(value) {
        return Err(MediatorError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Only letters, digits and underscores are allowed".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("mediator.name", "users").is_ok());
        assert!(validate_non_empty_string("mediator.name", "   ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("mediator.dispatch_timeout_ms", 5, 1).is_ok());
        assert!(validate_positive_number("mediator.dispatch_timeout_ms", 0, 1).is_err());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("telemetry.metrics_prefix", "mediator").is_ok());
        assert!(validate_identifier("telemetry.metrics_prefix", "app_v2").is_ok());
        assert!(validate_identifier("telemetry.metrics_prefix", "2fast").is_err());
        assert!(validate_identifier("telemetry.metrics_prefix", "has-dash").is_err());
    }
}
