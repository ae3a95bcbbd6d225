//! Output renderers: terminal and JSON.
//!
//! Commands build a report, then hand it to the renderer picked by
//! `--format`. Secrets are masked when the report is built, so no
//! renderer ever sees them.

pub mod json;
pub mod terminal;

use serde::Serialize;

use crate::cloud::ServiceHandle;
use crate::config::ConfigFile;
use crate::credentials::AwsCredentials;
use crate::database::BootstrapOutcome;

/// Config key fragments whose values are masked in `config show`.
const SENSITIVE_KEY_PARTS: &[&str] = &["secret", "pass", "token", "key"];

/// Key fragments naming passwords, which are masked without a tail.
const PASSWORD_KEY_PARTS: &[&str] = &["pass"];

/// Key fragments that look sensitive but name public identifiers.
const PUBLIC_KEY_PARTS: &[&str] = &["keyid", "key_id"];

/// Trait for rendering command reports.
pub trait OutputRenderer {
    fn render_credentials(&self, report: &CredentialReport) -> String;
    fn render_service(&self, report: &ServiceReport) -> String;
    fn render_config(&self, report: &ConfigReport) -> String;
    fn render_database(&self, report: &DatabaseReport) -> String;
}

/// Resolved cloud credentials with the secret masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialReport {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl From<&AwsCredentials> for CredentialReport {
    fn from(creds: &AwsCredentials) -> Self {
        Self {
            access_key_id: creds.access_key_id.clone(),
            secret_access_key: mask(&creds.secret_access_key),
            region: creds.region.clone(),
        }
    }
}

/// An opened service connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub service: String,
    pub endpoint: String,
    pub signing_region: String,
    pub access_key_id: String,
}

impl From<&ServiceHandle> for ServiceReport {
    fn from(handle: &ServiceHandle) -> Self {
        Self {
            service: handle.service.to_string(),
            endpoint: handle.endpoint.clone(),
            signing_region: handle.signing_region.clone(),
            access_key_id: handle.credentials.access_key_id.clone(),
        }
    }
}

/// A loaded config file with sensitive values masked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReport {
    pub path: String,
    pub entries: indexmap::IndexMap<String, String>,
}

impl From<&ConfigFile> for ConfigReport {
    fn from(config: &ConfigFile) -> Self {
        let entries = config
            .entries()
            .iter()
            .map(|(k, v)| {
                (k.clone(), mask_config_value(k, v))
            })
            .collect();
        Self {
            path: config.path().display().to_string(),
            entries,
        }
    }
}

/// Result of a database check or bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseReport {
    pub database: String,
    pub host: String,
    pub port: u16,
    pub exists: bool,
    /// Set only by `db init`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl DatabaseReport {
    pub fn with_outcome(mut self, outcome: BootstrapOutcome) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }
}

/// Whether a config key names a secret.
pub fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    if PUBLIC_KEY_PARTS.iter().any(|p| lower.contains(p)) {
        return false;
    }
    SENSITIVE_KEY_PARTS.iter().any(|p| lower.contains(p))
}

/// The value `config show` prints for `key`.
fn mask_config_value(key: &str, value: &str) -> String {
    if !is_sensitive_key(key) {
        return value.to_string();
    }
    let lower = key.to_lowercase();
    if PASSWORD_KEY_PARTS.iter().any(|p| lower.contains(p)) {
        return "****".to_string();
    }
    mask(value)
}

/// Mask a secret, keeping the last four characters of long values.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() < 12 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
