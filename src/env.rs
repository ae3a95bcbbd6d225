//! Environment abstraction for testability.
//!
//! Production code uses [`Env::real()`] which delegates to [`std::env::var`]
//! and [`dirs::home_dir`]. Tests use [`Env::mock()`] backed by a `HashMap`,
//! so the config-path override can be exercised without mutating the
//! process environment.

use std::collections::HashMap;
use std::path::PathBuf;

/// Key under which [`Env::mock`] looks up the home directory.
const MOCK_HOME: &str = "HOME";

/// Environment reader.
///
/// Wraps lookups so that production code hits `std::env` while tests
/// can supply a controlled set of values.
#[derive(Clone, Debug)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Create an `Env` that reads from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Create an `Env` backed by explicit key-value pairs.
    ///
    /// A `HOME` entry, if present, answers [`Env::home_dir`]. Public so that
    /// integration tests and embedders can drive a
    /// [`ConfigStore`](crate::config::ConfigStore) without touching the
    /// process environment; production code uses [`Env::real`].
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up an environment variable by name.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.overrides {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Look up a variable, treating an empty value as unset.
    pub fn non_empty_var(&self, name: &str) -> Option<String> {
        self.var(name).ok().filter(|v| !v.is_empty())
    }

    /// The current user's home directory.
    pub fn home_dir(&self) -> Option<PathBuf> {
        match &self.overrides {
            Some(map) => map.get(MOCK_HOME).map(PathBuf::from),
            None => dirs::home_dir(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        let env = Env::real();
        assert!(env.var("CARGO_MANIFEST_DIR").is_ok());
    }

    #[test]
    fn mock_env_returns_set_values() {
        let env = Env::mock([("AWS_CONFIG_FILE", "/etc/aws.conf"), ("BAZ", "qux")]);
        assert_eq!(env.var("AWS_CONFIG_FILE").unwrap(), "/etc/aws.conf");
        assert_eq!(env.var("BAZ").unwrap(), "qux");
    }

    #[test]
    fn mock_env_returns_not_present_for_missing() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        assert!(env.var("NONEXISTENT").is_err());
    }

    #[test]
    fn non_empty_var_skips_blank_values() {
        let env = Env::mock([("EMPTY", ""), ("SET", "value")]);
        assert_eq!(env.non_empty_var("EMPTY"), None);
        assert_eq!(env.non_empty_var("SET"), Some("value".to_string()));
        assert_eq!(env.non_empty_var("ABSENT"), None);
    }

    #[test]
    fn mock_home_dir_comes_from_home_entry() {
        let env = Env::mock([("HOME", "/home/ops")]);
        assert_eq!(env.home_dir(), Some(PathBuf::from("/home/ops")));

        let bare = Env::mock(Vec::<(&str, &str)>::new());
        assert_eq!(bare.home_dir(), None);
    }
}
