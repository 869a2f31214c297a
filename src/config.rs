use serde::Deserialize;
use std::path::Path;

use crate::app::MAX_WORKERS;
use crate::error::{ConfigError, Result};

/// Application configuration loaded from a TOML file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub compute: ComputeConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json".
    pub format: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Upper bound on concurrent solver tasks; the effective pool size
    /// is `min(available parallelism, max_workers)`.
    pub max_workers: usize,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.bind.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "server.bind",
                reason: "cannot be empty".into(),
            }
            .into());
        }
        if self.compute.max_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "compute.max_workers",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.logging.format != "pretty" && self.logging.format != "json" {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("unknown format '{}'", self.logging.format),
            }
            .into());
        }
        Ok(())
    }

    /// Install the global tracing subscriber. Safe to call more than
    /// once; later calls are ignored.
    pub fn init_logging(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.logging.level));

        if self.logging.format == "json" {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .try_init();
        } else {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            compute: ComputeConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".into(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.compute.max_workers, MAX_WORKERS);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn rejects_zero_workers() {
        let config: Config = toml::from_str(
            r#"
            [compute]
            max_workers = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_log_format() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            format = "xml"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
