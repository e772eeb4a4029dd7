//! Tracing subscriber setup for hosts embedding conceptdag.

use crate::{Error, LoggingSettings, Result};
use serde::{Deserialize, Serialize};
use std::io;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Tracing output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Pretty-printed human-readable format
    Pretty,
    /// Compact single-line format
    Compact,
    /// Structured JSON format
    Json,
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show all logs (trace level)
    Trace,
    /// Show debug and above
    Debug,
    /// Show info and above
    Info,
    /// Show warnings and above (default)
    Warn,
    /// Show errors only
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown tracing format: {s}")),
        }
    }
}

/// Build the filter for `settings`.
///
/// An explicit `filter` wins, then `RUST_LOG`, then `level` applied to the
/// conceptdag crates.
fn env_filter(settings: &LoggingSettings) -> Result<EnvFilter> {
    if let Some(filter) = &settings.filter {
        return EnvFilter::try_new(filter)
            .map_err(|e| Error::configuration(format!("Failed to create tracing filter: {e}")));
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| {
            let level = settings.level.as_str();
            EnvFilter::try_new(format!(
                "conceptdag={level},conceptdag_graph={level},conceptdag_persist={level}"
            ))
        })
        .map_err(|e| Error::configuration(format!("Failed to create tracing filter: {e}")))
}

/// Install a global tracing subscriber writing to stderr.
///
/// # Errors
///
/// Returns a configuration error if the filter is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings)?);

    let installed = match settings.format {
        TracingFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(true),
            )
            .try_init(),
        TracingFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
        TracingFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
    };
    installed.map_err(|e| Error::configuration(format!("Failed to install tracing: {e}")))?;

    ::tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        format = ?settings.format,
        "Tracing initialized for conceptdag"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert!("xml".parse::<TracingFormat>().is_err());
    }

    #[test]
    fn test_explicit_filter_is_validated() {
        let settings = LoggingSettings {
            filter: Some("conceptdag_graph=notalevel".to_string()),
            ..LoggingSettings::default()
        };
        assert!(env_filter(&settings).is_err());

        let settings = LoggingSettings {
            filter: Some("conceptdag_graph=debug".to_string()),
            ..LoggingSettings::default()
        };
        assert!(env_filter(&settings).is_ok());
    }
}
