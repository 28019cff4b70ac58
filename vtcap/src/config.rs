//! Configuration for vtcap
//!
//! Precedence: CLI args > environment variables > defaults.

use std::env;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable that delays startup so a debugger can attach
pub const DRIVER_WAIT_VAR: &str = "DRIVER_WAIT";

/// Startup delay applied when [`DRIVER_WAIT_VAR`] is set
pub const DRIVER_WAIT_DELAY: Duration = Duration::from_secs(10);

/// Command-line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "vtcap")]
#[command(version)]
#[command(
    about = "Run a command in an 80x24 pseudo-terminal and serve screen snapshots",
    long_about = None
)]
pub struct CliArgs {
    /// Control communication is via fd 0
    #[arg(long = "control-via-fd0")]
    pub control_via_fd0: bool,

    /// Command to execute and connect to the terminal
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Program followed by its arguments
    #[serde(default)]
    pub command: Vec<String>,

    /// Terminal dimensions (columns, rows)
    #[serde(default = "default_dimensions")]
    pub dimensions: (u16, u16),

    /// Bytes read per readiness event on either source
    #[serde(default = "default_read_buffer")]
    pub read_buffer: usize,

    /// How often the child is checked for exit while both sources are idle
    #[serde(default = "default_exit_check_ms")]
    pub exit_check_ms: u16,

    /// Sleep [`DRIVER_WAIT_DELAY`] before starting
    #[serde(default)]
    pub driver_wait: bool,
}

fn default_dimensions() -> (u16, u16) {
    (80, 24)
}
fn default_read_buffer() -> usize {
    1000
}
fn default_exit_check_ms() -> u16 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            dimensions: default_dimensions(),
            read_buffer: default_read_buffer(),
            exit_check_ms: default_exit_check_ms(),
            driver_wait: false,
        }
    }
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Config error in '{field}': {message}")]
pub struct ConfigError {
    pub message: String,
    pub field: String,
}

impl ConfigError {
    fn new(field: &str, message: &str) -> Self {
        Self {
            message: message.to_string(),
            field: field.to_string(),
        }
    }
}

impl Config {
    /// Build the configuration: defaults, then environment, then CLI
    pub fn load_with_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_vars();
        config.apply_cli_args(args);
        config.validate()?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if env::var_os(DRIVER_WAIT_VAR).is_some() {
            self.driver_wait = true;
        }
    }

    fn apply_cli_args(&mut self, args: &CliArgs) {
        if !args.command.is_empty() {
            self.command = args.command.clone();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.command.first() {
            None => return Err(ConfigError::new("command", "No command given")),
            Some(program) if program.is_empty() => {
                return Err(ConfigError::new("command", "Program name is empty"))
            }
            Some(_) => {}
        }
        if self.dimensions.0 == 0 || self.dimensions.1 == 0 {
            return Err(ConfigError::new(
                "dimensions",
                "Columns and rows must be non-zero",
            ));
        }
        if self.read_buffer == 0 {
            return Err(ConfigError::new("read_buffer", "Must be at least 1 byte"));
        }
        if self.exit_check_ms == 0 {
            return Err(ConfigError::new("exit_check_ms", "Must be at least 1 ms"));
        }
        Ok(())
    }

    pub fn program(&self) -> &str {
        self.command.first().map_or("", String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or_default()
    }

    pub fn cols(&self) -> u16 {
        self.dimensions.0
    }

    pub fn rows(&self) -> u16 {
        self.dimensions.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dimensions, (80, 24));
        assert_eq!(config.read_buffer, 1000);
        assert_eq!(config.exit_check_ms, 20);
        assert!(!config.driver_wait);
    }

    #[test]
    fn test_cli_command_and_flag() {
        let args = parse(&["vtcap", "--control-via-fd0", "bash", "-c", "echo hi"]);
        assert!(args.control_via_fd0);
        assert_eq!(args.command, ["bash", "-c", "echo hi"]);
    }

    #[test]
    fn test_options_after_command_belong_to_command() {
        let args = parse(&["vtcap", "--control-via-fd0", "ls", "--control-via-fd0", "-l"]);
        assert_eq!(args.command, ["ls", "--control-via-fd0", "-l"]);
    }

    #[test]
    fn test_flag_is_optional_for_parsing() {
        let args = parse(&["vtcap", "cat"]);
        assert!(!args.control_via_fd0);
    }

    #[test]
    fn test_program_and_args() {
        let config = Config {
            command: vec!["sh".into(), "-c".into(), "true".into()],
            ..Config::default()
        };
        assert_eq!(config.program(), "sh");
        assert_eq!(config.args(), ["-c", "true"]);
        assert_eq!((config.cols(), config.rows()), (80, 24));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config {
            command: vec!["cat".into()],
            ..Config::default()
        };
        assert!(config.validate().is_ok());

        config.read_buffer = 0;
        assert_eq!(config.validate().unwrap_err().field, "read_buffer");
        config.read_buffer = 1000;

        config.dimensions = (0, 24);
        assert_eq!(config.validate().unwrap_err().field, "dimensions");
        config.dimensions = (80, 24);

        config.command.clear();
        assert_eq!(config.validate().unwrap_err().field, "command");

        config.command.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: Config = serde_json::from_str(r#"{"command": ["top"]}"#).unwrap();
        assert_eq!(config.command, ["top"]);
        assert_eq!(config.dimensions, (80, 24));
        assert_eq!(config.read_buffer, 1000);

        let text = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&text).unwrap(), config);
    }
}
