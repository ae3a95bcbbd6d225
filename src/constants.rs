//! App-wide constants.
//!
//! Centralises the tool name, config key names, environment variable
//! names, and connection defaults so a rename only requires changing
//! this file.

use std::time::Duration;

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "cloudboot";

/// Crate version as reported by `cloudboot version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple, exported by `build.rs`.
pub const TARGET: &str = env!("TARGET");

/// Default config filename, resolved against the user's home directory.
pub const DEFAULT_CONFIG_FILENAME: &str = ".awsconfig";

// ── Environment variable names ──────────────────────────────────────

/// Overrides the default config file location.
pub const ENV_CONFIG_FILE: &str = "AWS_CONFIG_FILE";

// ── Config keys: cloud API ──────────────────────────────────────────

pub const KEY_ACCESS_KEY_ID: &str = "AWSAccessKeyId";
pub const KEY_SECRET_ACCESS_KEY: &str = "AWSSecretKey";
pub const KEY_REGION: &str = "AWSRegion";

// ── Config keys: document database ──────────────────────────────────

pub const KEY_DB_HOST: &str = "DBHost";
pub const KEY_DB_PORT: &str = "DBPort";
pub const KEY_DB_ADMIN_USER: &str = "DBAdminUser";
pub const KEY_DB_ADMIN_PASS: &str = "DBAdminPass";

// ── Database connection ─────────────────────────────────────────────

/// URI scheme of the document database.
pub const DB_URI_SCHEME: &str = "mongodb";

/// Namespace administrative connections authenticate against.
pub const DB_ADMIN_NAMESPACE: &str = "admin";

/// Port used when neither flags nor config name one.
pub const DEFAULT_DB_PORT: u16 = 27017;

/// Role granted to provisioned application users on their database.
pub const DB_APP_USER_ROLE: &str = "dbOwner";

/// Collection created in a new database so the server lists it.
pub const DB_MARKER_COLLECTION: &str = "cloudboot_meta";

/// Upper bound on connecting to and selecting a database server.
pub const DB_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
