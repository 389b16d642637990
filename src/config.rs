//! # Configuration Module
//!
//! [`DispatchConfig`] collects the settings a [`Dispatcher`](crate::dispatcher::Dispatcher)
//! is built from. It can be read from YAML and overridden from the
//! environment:
//!
//! ```yaml
//! base_path: /api/v1
//! extra_verbs: [PATCH, OPTIONS]
//! log:
//!   level: debug
//!   format: pretty
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Field |
//! |---|---|
//! | `APIDISPATCH_BASE_PATH` | `base_path` |
//! | `APIDISPATCH_EXTRA_VERBS` | `extra_verbs` (comma-separated) |
//! | `APIDISPATCH_LOG_LEVEL` | `log.level` |
//! | `APIDISPATCH_LOG_FORMAT` | `log.format` (`json` or `pretty`) |

use anyhow::{Context, Result};
use http::Method;
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::dispatcher::DEFAULT_VERBS;
use crate::logging::LogConfig;

/// Dispatcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Prefix prepended to every route pattern (default: none)
    pub base_path: String,
    /// Verbs routed in addition to `GET`, `POST`, `PUT` and `DELETE`
    pub extra_verbs: Vec<String>,
    /// Logging setup
    pub log: LogConfig,
}

impl DispatchConfig {
    /// Parse YAML text.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML or unknown value types.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse dispatch config")
    }

    /// Read a YAML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Defaults overridden from `APIDISPATCH_*` variables.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `APIDISPATCH_*` variables that are set.
    pub fn apply_env(&mut self) {
        if let Ok(base_path) = env::var("APIDISPATCH_BASE_PATH") {
            self.base_path = base_path;
        }
        if let Ok(verbs) = env::var("APIDISPATCH_EXTRA_VERBS") {
            self.extra_verbs = split_verbs(&verbs);
        }
        self.log.apply_env();
    }

    /// Extra verbs as methods, upper-cased, without defaults or duplicates.
    ///
    /// # Errors
    ///
    /// Fails when a name is not a valid HTTP method token.
    pub fn extra_methods(&self) -> Result<Vec<Method>> {
        let mut methods: Vec<Method> = Vec::with_capacity(self.extra_verbs.len());
        for name in &self.extra_verbs {
            let upper = name.trim().to_ascii_uppercase();
            let method = Method::from_bytes(upper.as_bytes())
                .with_context(|| format!("Invalid extra verb '{name}'"))?;
            if !DEFAULT_VERBS.contains(&method) && !methods.contains(&method) {
                methods.push(method);
            }
        }
        Ok(methods)
    }
}

fn split_verbs(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.base_path, "");
        assert!(config.extra_verbs.is_empty());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn test_from_yaml() {
        let config = DispatchConfig::from_yaml_str(
            "base_path: /api\nextra_verbs: [patch, OPTIONS]\nlog:\n  format: pretty\n",
        )
        .unwrap();
        assert_eq!(config.base_path, "/api");
        assert_eq!(config.log.format, LogFormat::Pretty);
        assert_eq!(config.log.level, "info");
        assert_eq!(
            config.extra_methods().unwrap(),
            vec![Method::PATCH, Method::OPTIONS]
        );
    }

    #[test]
    fn test_extra_methods_skip_defaults_and_duplicates() {
        let config = DispatchConfig {
            extra_verbs: vec!["get".into(), "PATCH".into(), "patch".into()],
            ..DispatchConfig::default()
        };
        assert_eq!(config.extra_methods().unwrap(), vec![Method::PATCH]);
    }

    #[test]
    fn test_invalid_verb_rejected() {
        let config = DispatchConfig {
            extra_verbs: vec!["NOT A VERB".into()],
            ..DispatchConfig::default()
        };
        assert!(config.extra_methods().is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(DispatchConfig::from_yaml_str("base_path: [unclosed").is_err());
        assert!(DispatchConfig::from_yaml_str("extra_verbs: 5").is_err());
    }

    #[test]
    fn test_split_verbs() {
        assert_eq!(split_verbs(" PATCH, ,options "), vec!["PATCH", "options"]);
        assert!(split_verbs("").is_empty());
    }
}
