use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "mediator-demo")]
#[command(about = "Dispatch a sample user request through the mediator pipeline")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, default_value = "Ada Lovelace")]
    pub name: String,

    #[arg(long, default_value = "ada@example.com")]
    pub email: String,

    #[arg(long, default_value = "36", allow_hyphen_values = true)]
    pub age: i32,

    /// Look up a user id that was never created to exercise the not-found path
    #[arg(long)]
    pub lookup_missing: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["mediator-demo"]);
        assert_eq!(config.email, "ada@example.com");
        assert_eq!(config.age, 36);
        assert!(config.config.is_none());
    }

    #[test]
    fn test_cli_accepts_negative_age() {
        let config = CliConfig::parse_from(["mediator-demo", "--age", "-5", "--name", ""]);
        assert_eq!(config.age, -5);
        assert_eq!(config.name, "");
    }
}
