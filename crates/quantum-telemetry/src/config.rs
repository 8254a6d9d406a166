//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::TelemetryError;

/// Output format of the fmt layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, coloured. For development.
    #[default]
    Pretty,
    /// One JSON object per line. For log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(TelemetryError::Config(format!(
                "unknown log format '{other}' (expected pretty or json)"
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Logging and metrics settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// `EnvFilter` directive, e.g. `info` or `qe_06_consensus=debug,info`
    pub log_level: String,

    pub log_format: LogFormat,

    /// Include file and line in log output
    pub with_source_location: bool,

    /// Register the engine metrics with the Prometheus registry
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "qe-engine".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            with_source_location: false,
            metrics_enabled: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QE_SERVICE_NAME`: Service name (default: qe-engine)
    /// - `QE_LOG_LEVEL` or `RUST_LOG`: Filter directive (default: info)
    /// - `QE_LOG_FORMAT`: `pretty` or `json` (default: json inside containers)
    /// - `QE_LOG_SOURCE`: Include file/line (default: false)
    /// - `QE_METRICS`: Register engine metrics (default: true)
    pub fn from_env() -> Result<Self, TelemetryError> {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let mut config = Self::from_lookup(|key| env::var(key).ok())?;
        if is_container && env::var("QE_LOG_FORMAT").is_err() {
            config.log_format = LogFormat::Json;
        }
        Ok(config)
    }

    /// Build from an arbitrary key lookup. `from_env` uses the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TelemetryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let log_format = match lookup("QE_LOG_FORMAT") {
            Some(raw) => raw.parse()?,
            None => defaults.log_format,
        };

        Ok(Self {
            service_name: lookup("QE_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("QE_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            log_format,
            with_source_location: lookup("QE_LOG_SOURCE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.with_source_location),
            metrics_enabled: lookup("QE_METRICS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.metrics_enabled),
        })
    }

    /// Reject settings the subscriber would refuse at init time.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::Config("service_name is empty".into()));
        }
        if self.log_level.trim().is_empty() {
            return Err(TelemetryError::Config("log_level is empty".into()));
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "qe-engine");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_qe_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("QE_LOG_LEVEL", "debug"),
            ("RUST_LOG", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "debug");

        let config = TelemetryConfig::from_lookup(lookup(&[("RUST_LOG", "warn")])).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_format_and_flags() {
        let config = TelemetryConfig::from_lookup(lookup(&[
            ("QE_LOG_FORMAT", "JSON"),
            ("QE_LOG_SOURCE", "1"),
            ("QE_METRICS", "off"),
            ("QE_SERVICE_NAME", "validator-3"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.with_source_location);
        assert!(!config.metrics_enabled);
        assert_eq!(config.service_name, "validator-3");
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        let err = TelemetryConfig::from_lookup(lookup(&[("QE_LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, TelemetryError::Config(_)));
    }

    #[test]
    fn test_json_file_fragment_uses_defaults() {
        let config: TelemetryConfig =
            serde_json::from_str(r#"{ "log_format": "json" }"#).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }
}
