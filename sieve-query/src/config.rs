//! Engine configuration.
//!
//! [`SieveConfig`] names the reserved request parameters and decides whether
//! a request body may carry filters. It can be built in code, deserialized,
//! or read from the environment:
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `SIEVE_SORT_PARAM` | `sort_param` | `sort` |
//! | `SIEVE_LIMIT_PARAM` | `limit_param` | `limit` |
//! | `SIEVE_OFFSET_PARAM` | `offset_param` | `offset` |
//! | `SIEVE_BODY_MODE` | `body_mode` | `disabled` |
//! | `SIEVE_BODY_METHOD` | `body_method` | `POST` |
//!
//! ```rust
//! use sieve_query::config::{BodyMode, MapEnvSource, SieveConfig};
//!
//! let env = MapEnvSource::new()
//!     .set("SIEVE_SORT_PARAM", "order")
//!     .set("SIEVE_BODY_MODE", "only");
//!
//! let config = SieveConfig::from_source(&env).unwrap();
//! assert_eq!(config.sort_param, "order");
//! assert_eq!(config.body_mode, BodyMode::Only);
//! assert_eq!(config.limit_param, "limit");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};
use crate::request::DEFAULT_BODY_METHOD;

/// Source for environment variables.
pub trait EnvSource: Send + Sync {
    /// Get an environment variable value.
    fn get(&self, name: &str) -> Option<String>;

    /// Check if a variable exists.
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Default environment source using std::env.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdEnvSource;

impl EnvSource for StdEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Environment source backed by a HashMap.
#[derive(Debug, Clone, Default)]
pub struct MapEnvSource {
    vars: HashMap<String, String>,
}

impl MapEnvSource {
    /// Create a new map-based environment source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Add multiple variables.
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars.extend(vars);
        self
    }
}

impl EnvSource for MapEnvSource {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Whether filters may come from a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyMode {
    /// Query parameters only.
    #[default]
    Disabled,
    /// Body on body-bearing requests, query parameters otherwise.
    Enabled,
    /// Body only; any other request is rejected.
    Only,
}

impl fmt::Display for BodyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Only => "only",
        })
    }
}

impl FromStr for BodyMode {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "disabled" | "off" | "false" => Ok(Self::Disabled),
            "enabled" | "on" | "true" => Ok(Self::Enabled),
            "only" => Ok(Self::Only),
            other => Err(QueryError::invalid_configuration(format!(
                "Unknown body mode '{}', expected disabled, enabled or only",
                other
            ))),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    /// Parameter holding the compact sort string.
    pub sort_param: String,
    /// Parameter overriding the page size.
    pub limit_param: String,
    /// Parameter overriding the page offset.
    pub offset_param: String,
    /// Body handling.
    pub body_mode: BodyMode,
    /// Method whose requests carry a body.
    pub body_method: String,
}

impl Default for SieveConfig {
    fn default() -> Self {
        Self {
            sort_param: "sort".to_string(),
            limit_param: "limit".to_string(),
            offset_param: "offset".to_string(),
            body_mode: BodyMode::Disabled,
            body_method: DEFAULT_BODY_METHOD.to_string(),
        }
    }
}

impl SieveConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> QueryResult<Self> {
        Self::from_source(&StdEnvSource)
    }

    /// Read the configuration from `env`, defaulting unset variables.
    pub fn from_source(env: &dyn EnvSource) -> QueryResult<Self> {
        let mut config = Self::default();
        if let Some(v) = env.get("SIEVE_SORT_PARAM") {
            config.sort_param = param_name("SIEVE_SORT_PARAM", v)?;
        }
        if let Some(v) = env.get("SIEVE_LIMIT_PARAM") {
            config.limit_param = param_name("SIEVE_LIMIT_PARAM", v)?;
        }
        if let Some(v) = env.get("SIEVE_OFFSET_PARAM") {
            config.offset_param = param_name("SIEVE_OFFSET_PARAM", v)?;
        }
        if let Some(v) = env.get("SIEVE_BODY_MODE") {
            config.body_mode = v.parse()?;
        }
        if let Some(v) = env.get("SIEVE_BODY_METHOD") {
            config.body_method = param_name("SIEVE_BODY_METHOD", v)?.to_uppercase();
        }
        Ok(config)
    }

    /// Set the sort parameter name.
    pub fn sort_param(mut self, name: impl Into<String>) -> Self {
        self.sort_param = name.into();
        self
    }

    /// Set the limit parameter name.
    pub fn limit_param(mut self, name: impl Into<String>) -> Self {
        self.limit_param = name.into();
        self
    }

    /// Set the offset parameter name.
    pub fn offset_param(mut self, name: impl Into<String>) -> Self {
        self.offset_param = name.into();
        self
    }

    /// Set the body mode.
    pub fn body_mode(mut self, mode: BodyMode) -> Self {
        self.body_mode = mode;
        self
    }

    /// Set the body-bearing method.
    pub fn body_method(mut self, method: impl Into<String>) -> Self {
        self.body_method = method.into().to_uppercase();
        self
    }

    /// Whether `method` carries a body.
    pub fn is_body_method(&self, method: &str) -> bool {
        method.eq_ignore_ascii_case(&self.body_method)
    }
}

fn param_name(var: &str, value: String) -> QueryResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QueryError::invalid_configuration(format!("{} cannot be empty", var)));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SieveConfig::default();
        assert_eq!(config.sort_param, "sort");
        assert_eq!(config.offset_param, "offset");
        assert_eq!(config.body_mode, BodyMode::Disabled);
        assert!(config.is_body_method("post"));
        assert!(!config.is_body_method("GET"));
    }

    #[test]
    fn test_from_empty_source_is_default() {
        let config = SieveConfig::from_source(&MapEnvSource::new()).unwrap();
        assert_eq!(config, SieveConfig::default());
    }

    #[test]
    fn test_from_source_overrides() {
        let env = MapEnvSource::new()
            .set("SIEVE_LIMIT_PARAM", " size ")
            .set("SIEVE_OFFSET_PARAM", "skip")
            .set("SIEVE_BODY_MODE", "Enabled")
            .set("SIEVE_BODY_METHOD", "put");
        let config = SieveConfig::from_source(&env).unwrap();
        assert_eq!(config.limit_param, "size");
        assert_eq!(config.offset_param, "skip");
        assert_eq!(config.body_mode, BodyMode::Enabled);
        assert!(config.is_body_method("PUT"));
    }

    #[test]
    fn test_invalid_env_values() {
        let env = MapEnvSource::new().set("SIEVE_BODY_MODE", "sometimes");
        assert!(SieveConfig::from_source(&env).unwrap_err().is_configuration());

        let env = MapEnvSource::new().set("SIEVE_SORT_PARAM", "  ");
        assert!(SieveConfig::from_source(&env).unwrap_err().is_configuration());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: SieveConfig =
            serde_json::from_str(r#"{"sort_param":"order","body_mode":"only"}"#).unwrap();
        assert_eq!(config.sort_param, "order");
        assert_eq!(config.body_mode, BodyMode::Only);
        assert_eq!(config.limit_param, "limit");
    }

    #[test]
    fn test_builder_methods() {
        let config = SieveConfig::new()
            .sort_param("s")
            .limit_param("l")
            .offset_param("o")
            .body_mode(BodyMode::Only)
            .body_method("patch");
        assert_eq!(config.body_method, "PATCH");
        assert_eq!(config.sort_param, "s");
    }
}
