//! Subscriber setup for the engine's `tracing` events.
//!
//! The engine emits `debug!` per applied filter and sort, `trace!` per
//! predicate and `warn!` on page override fallbacks. Nothing is printed until
//! a subscriber is installed, either by the application or by [`init`] when
//! the `tracing-subscriber` feature is on.
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `SIEVE_DEBUG` | `true`, `1`, `yes` | off |
//! | `SIEVE_LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error` | `debug` with `SIEVE_DEBUG`, else `warn` |
//! | `SIEVE_LOG_FORMAT` | `json`, `pretty`, `compact` | `json` |
//!
//! ```rust
//! use sieve_query::config::MapEnvSource;
//! use sieve_query::logging::{LogFormat, LogLevel, LogSettings};
//!
//! let env = MapEnvSource::new()
//!     .set("SIEVE_DEBUG", "1")
//!     .set("SIEVE_LOG_FORMAT", "compact");
//!
//! let settings = LogSettings::from_source(&env).unwrap();
//! assert_eq!(settings.level, LogLevel::Debug);
//! assert_eq!(settings.format, LogFormat::Compact);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::{EnvSource, StdEnvSource};

/// Crates whose events the installed filter lets through.
const TARGETS: [&str; 4] = ["sieve", "sieve_query", "sieve_sql", "sieve_mongodb"];

/// Verbosity of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    /// Every emitted predicate.
    Trace,
    /// Applied filters, sorts and the chosen input source.
    Debug,
    /// Informational events.
    Info,
    /// Silent fallbacks.
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Directive name understood by `EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Level and format for [`init_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSettings {
    /// Verbosity.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings for `level` in the default format.
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            format: LogFormat::default(),
        }
    }

    /// Set the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_source(&StdEnvSource)
    }

    /// Read settings from `env`.
    ///
    /// Returns `None` when neither `SIEVE_DEBUG` nor `SIEVE_LOG_LEVEL` asks
    /// for output. Unknown level or format values fall back to the defaults.
    pub fn from_source(env: &dyn EnvSource) -> Option<Self> {
        let debug = env
            .get("SIEVE_DEBUG")
            .is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"));
        let level = env.get("SIEVE_LOG_LEVEL");
        if !debug && level.is_none() {
            return None;
        }

        let fallback = if debug { LogLevel::Debug } else { LogLevel::Warn };
        let level = level
            .and_then(|v| v.parse().ok())
            .unwrap_or(fallback);
        let format = env
            .get("SIEVE_LOG_FORMAT")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Some(Self { level, format })
    }

    /// `EnvFilter` directives covering every workspace crate.
    pub fn directives(&self) -> String {
        TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install a subscriber configured from the environment.
///
/// Does nothing unless `SIEVE_DEBUG` or `SIEVE_LOG_LEVEL` is set. Returns
/// whether a subscriber was installed.
pub fn init() -> bool {
    LogSettings::from_env().is_some_and(init_with)
}

/// Install a subscriber at `level` in the default format.
pub fn init_with_level(level: LogLevel) -> bool {
    init_with(LogSettings::new(level))
}

/// Install a subscriber with explicit settings.
///
/// Returns `false` when another global subscriber is already set, or when
/// the `tracing-subscriber` feature is off.
pub fn init_with(settings: LogSettings) -> bool {
    #[cfg(feature = "tracing-subscriber")]
    {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_new(settings.directives())
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        let registry = tracing_subscriber::registry().with(filter);
        let installed = match settings.format {
            LogFormat::Json => registry.with(fmt::layer().json()).try_init().is_ok(),
            LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init().is_ok(),
            LogFormat::Compact => registry.with(fmt::layer().compact()).try_init().is_ok(),
        };
        if installed {
            tracing::info!(level = %settings.level, format = ?settings.format, "Sieve logging initialized");
        }
        installed
    }

    #[cfg(not(feature = "tracing-subscriber"))]
    {
        let _ = settings;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapEnvSource;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_silent_without_variables() {
        assert_eq!(LogSettings::from_source(&MapEnvSource::new()), None);
        assert_eq!(
            LogSettings::from_source(&MapEnvSource::new().set("SIEVE_DEBUG", "no")),
            None
        );
    }

    #[test]
    fn test_debug_flag_defaults() {
        let env = MapEnvSource::new().set("SIEVE_DEBUG", "TRUE");
        assert_eq!(
            LogSettings::from_source(&env),
            Some(LogSettings::new(LogLevel::Debug))
        );
    }

    #[test]
    fn test_level_overrides_debug_flag() {
        let env = MapEnvSource::new()
            .set("SIEVE_DEBUG", "1")
            .set("SIEVE_LOG_LEVEL", "Trace")
            .set("SIEVE_LOG_FORMAT", "pretty");
        let settings = LogSettings::from_source(&env).unwrap();
        assert_eq!(settings.level, LogLevel::Trace);
        assert_eq!(settings.format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_values_fall_back() {
        let env = MapEnvSource::new()
            .set("SIEVE_LOG_LEVEL", "loud")
            .set("SIEVE_LOG_FORMAT", "xml");
        assert_eq!(LogSettings::from_source(&env), Some(LogSettings::default()));
    }

    #[test]
    fn test_directives_cover_workspace() {
        assert_eq!(
            LogSettings::new(LogLevel::Info).directives(),
            "sieve=info,sieve_query=info,sieve_sql=info,sieve_mongodb=info"
        );
    }
}
