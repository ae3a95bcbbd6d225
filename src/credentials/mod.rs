//! Credential resolution.
//!
//! Merges explicitly supplied values with config file values, field by
//! field. An explicit non-empty value always wins; the config file is only
//! consulted for fields left empty, and not at all when every field was
//! supplied.

use std::cell::Cell;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{ConfigError, ConfigStore};
use crate::constants::{
    DEFAULT_DB_PORT, KEY_ACCESS_KEY_ID, KEY_DB_ADMIN_PASS, KEY_DB_ADMIN_USER, KEY_DB_HOST,
    KEY_DB_PORT, KEY_REGION, KEY_SECRET_ACCESS_KEY,
};

/// Errors from credential resolution.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("missing credentials: {} (pass them explicitly or set {} in the config file)", .fields.join(", "), .keys.join(", "))]
    Missing {
        fields: Vec<&'static str>,
        keys: Vec<&'static str>,
    },

    #[error("invalid database port: {value:?}")]
    InvalidPort { value: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Source of fallback values for fields not supplied explicitly.
pub trait ConfigLookup {
    /// Value for `key`, or `None` when the key is absent.
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

impl ConfigLookup for ConfigStore {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get(key)
    }
}

impl<T: ConfigLookup + ?Sized> ConfigLookup for &T {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).lookup(key)
    }
}

/// A [`ConfigStore`] lookup that honours a caller-supplied config path.
///
/// The explicit path is loaded on the first lookup, not on construction,
/// so a fully explicit credential set still never touches the disk.
pub struct ConfigSource<'a> {
    store: &'a ConfigStore,
    path: Option<PathBuf>,
    loaded: Cell<bool>,
}

impl<'a> ConfigSource<'a> {
    pub fn new(store: &'a ConfigStore, path: Option<&Path>) -> Self {
        Self {
            store,
            path: path.map(Path::to_path_buf),
            loaded: Cell::new(false),
        }
    }
}

impl ConfigLookup for ConfigSource<'_> {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        if let (Some(path), false) = (&self.path, self.loaded.get()) {
            if let Err(e) = self.store.load(Some(path)) {
                tracing::warn!("{e}");
                return Err(e);
            }
            self.loaded.set(true);
        }
        self.store.get(key)
    }
}

/// Explicitly supplied cloud API credentials; any field may be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialAwsCredentials {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
}

/// Complete cloud API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("region", &self.region)
            .finish()
    }
}

/// Explicitly supplied database admin credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialDbAdminCredentials {
    pub admin_user: Option<String>,
    pub admin_pass: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Complete database admin credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct DbAdminCredentials {
    pub admin_user: String,
    pub admin_pass: String,
    pub host: String,
    pub port: u16,
}

impl fmt::Debug for DbAdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbAdminCredentials")
            .field("admin_user", &self.admin_user)
            .field("admin_pass", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Merges explicit values with a [`ConfigLookup`].
pub struct CredentialResolver<L> {
    lookup: L,
}

impl<L: ConfigLookup> CredentialResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve the cloud API credential set.
    pub fn resolve_aws(
        &self,
        explicit: &PartialAwsCredentials,
    ) -> Result<AwsCredentials, CredentialError> {
        let mut fields = FieldMerge::new(&self.lookup, [
            (explicit.access_key_id.as_deref(), "access_key_id", KEY_ACCESS_KEY_ID, Need::Required),
            (explicit.secret_access_key.as_deref(), "secret_access_key", KEY_SECRET_ACCESS_KEY, Need::Required),
            (explicit.region.as_deref(), "region", KEY_REGION, Need::Required),
        ])?;

        let [access_key_id, secret_access_key, region] = fields.take_all()?;
        Ok(AwsCredentials {
            access_key_id,
            secret_access_key,
            region,
        })
    }

    /// Resolve the database admin credential set.
    ///
    /// The port falls back to the default when neither side provides one,
    /// including when no config file can be located; a configured port must
    /// parse as a number. Missing required fields are reported first.
    pub fn resolve_db_admin(
        &self,
        explicit: &PartialDbAdminCredentials,
    ) -> Result<DbAdminCredentials, CredentialError> {
        let explicit_port = explicit.port.map(|p| p.to_string());
        let mut fields = FieldMerge::new(&self.lookup, [
            (explicit.admin_user.as_deref(), "admin_user", KEY_DB_ADMIN_USER, Need::Required),
            (explicit.admin_pass.as_deref(), "admin_pass", KEY_DB_ADMIN_PASS, Need::Required),
            (explicit.host.as_deref(), "host", KEY_DB_HOST, Need::Required),
            (explicit_port.as_deref(), "port", KEY_DB_PORT, Need::Defaulted),
        ])?;

        let [admin_user, admin_pass, host] = fields.take_required([0, 1, 2])?;
        let port = match fields.take_optional(3) {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| CredentialError::InvalidPort { value })?,
            None => DEFAULT_DB_PORT,
        };

        Ok(DbAdminCredentials {
            admin_user,
            admin_pass,
            host,
            port,
        })
    }
}

/// Whether a field must end up set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Need {
    Required,
    /// Has a built-in fallback.
    Defaulted,
}

/// One credential field: explicit value, field name, config key, need.
type FieldSpec<'a> = (Option<&'a str>, &'static str, &'static str, Need);

/// Per-field merge of explicit and config values.
struct FieldMerge<const N: usize> {
    values: [Option<String>; N],
    names: [&'static str; N],
    keys: [&'static str; N],
}

impl<const N: usize> FieldMerge<N> {
    /// Fill each field from `explicit` when non-empty, otherwise from `lookup`.
    ///
    /// `lookup` is never called when every field is supplied explicitly. A
    /// missing config file counts as "no values". Other config errors
    /// propagate, unless every field still unset is [`Need::Defaulted`].
    fn new(lookup: &impl ConfigLookup, specs: [FieldSpec<'_>; N]) -> Result<Self, CredentialError> {
        let names = specs.map(|(_, name, _, _)| name);
        let keys = specs.map(|(_, _, key, _)| key);
        let needs = specs.map(|(_, _, _, need)| need);
        let mut values = specs.map(|(value, _, _, _)| non_empty(value));

        if values.iter().all(Option::is_some) {
            tracing::debug!("all credential fields supplied explicitly, skipping config");
            return Ok(Self { values, names, keys });
        }

        for i in 0..N {
            if values[i].is_some() {
                continue;
            }
            let found = match lookup.lookup(keys[i]) {
                Ok(found) => non_empty(found.as_deref()),
                Err(ConfigError::NotFound { path }) => {
                    tracing::debug!(path = %path.display(), "no config file, leaving fields unset");
                    break;
                }
                Err(e) => {
                    let required_unset = values
                        .iter()
                        .zip(needs)
                        .any(|(v, need)| v.is_none() && need == Need::Required);
                    if required_unset {
                        return Err(e.into());
                    }
                    tracing::debug!("config unavailable ({e}), using defaults");
                    break;
                }
            };
            values[i] = found;
        }

        Ok(Self { values, names, keys })
    }

    fn take_optional(&mut self, idx: usize) -> Option<String> {
        self.values[idx].take()
    }

    fn take_all(&mut self) -> Result<[String; N], CredentialError> {
        self.take_required(std::array::from_fn(|i| i))
    }

    /// Take the fields at `indices`, failing with every one that is unset.
    fn take_required<const M: usize>(
        &mut self,
        indices: [usize; M],
    ) -> Result<[String; M], CredentialError> {
        let missing: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| self.values[i].is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CredentialError::Missing {
                fields: missing.iter().map(|&i| self.names[i]).collect(),
                keys: missing.iter().map(|&i| self.keys[i]).collect(),
            });
        }
        Ok(indices.map(|i| self.values[i].take().unwrap_or_default()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
