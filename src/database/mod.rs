//! Idempotent database bootstrap.
//!
//! [`DatabaseBootstrapper::exists`] and [`DatabaseBootstrapper::create`]
//! each open one administrative connection and release it on return.
//! `create` does not check for an existing database; callers run `exists`
//! first, or use [`DatabaseBootstrapper::ensure`] which does both.

pub mod mongo;
pub mod uri;

use std::fmt;

use thiserror::Error;

use crate::credentials::DbAdminCredentials;

pub use mongo::MongoDriver;
pub use uri::AdminUri;

/// Failures reported by a [`DatabaseDriver`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("operation rejected: {0}")]
    Rejected(String),
}

/// Errors from a bootstrap operation.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("cannot connect to database server {host}:{port}: {source}")]
    Connection {
        host: String,
        port: u16,
        source: DriverError,
    },

    #[error("failed to provision user '{user}' on database '{database}': {source}")]
    Provisioning {
        database: String,
        user: String,
        source: DriverError,
    },
}

/// Opens administrative connections.
pub trait DatabaseDriver {
    /// Connect and authenticate with the credentials embedded in `uri`.
    fn connect(&self, uri: &AdminUri) -> Result<Box<dyn DatabaseConnection>, DriverError>;
}

impl<D: DatabaseDriver + ?Sized> DatabaseDriver for &D {
    fn connect(&self, uri: &AdminUri) -> Result<Box<dyn DatabaseConnection>, DriverError> {
        (**self).connect(uri)
    }
}

/// An open administrative connection.
pub trait DatabaseConnection {
    /// Names of all databases on the server.
    fn list_database_names(&self) -> Result<Vec<String>, DriverError>;

    /// Select a database by name. The database need not exist yet.
    fn database(&self, name: &str) -> Box<dyn DatabaseHandle + '_>;
}

/// A selected database.
pub trait DatabaseHandle {
    fn name(&self) -> &str;

    /// Create the database on the server so that it is listed.
    ///
    /// Succeeds when the database already exists.
    fn materialize(&self) -> Result<(), DriverError>;

    /// Add a user scoped to this database.
    fn add_user(&self, user: &str, pass: &str) -> Result<(), DriverError>;
}

/// Credentials of the application-level user to provision.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// Everything one bootstrap run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub admin: DbAdminCredentials,
    pub name: String,
    pub app: AppCredentials,
}

/// How [`DatabaseBootstrapper::ensure`] finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The database was already listed; nothing was changed.
    AlreadyExists,
    /// The database was created and the application user added.
    Provisioned,
}

impl fmt::Display for BootstrapOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapOutcome::AlreadyExists => write!(f, "already exists"),
            BootstrapOutcome::Provisioned => write!(f, "provisioned"),
        }
    }
}

/// Checks for and provisions databases through a [`DatabaseDriver`].
pub struct DatabaseBootstrapper<D> {
    driver: D,
}

impl<D: DatabaseDriver> DatabaseBootstrapper<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    /// Whether `db_name` is among the databases the admin can list.
    pub fn exists(&self, admin: &DbAdminCredentials, db_name: &str) -> Result<bool, BootstrapError> {
        let conn = self.open(admin)?;
        let names = conn
            .list_database_names()
            .map_err(|e| connection_error(admin, e))?;
        let found = names.iter().any(|n| n == db_name);
        tracing::debug!(database = db_name, found, listed = names.len(), "checked database");
        Ok(found)
    }

    /// Create `db_name` and add `app` as a user on it.
    ///
    /// The database is materialized before the user is added, so a later
    /// [`exists`](Self::exists) sees it. A rejected creation (for example a
    /// duplicate user) is a [`BootstrapError::Provisioning`]; it is not
    /// retried.
    pub fn create(
        &self,
        admin: &DbAdminCredentials,
        db_name: &str,
        app: &AppCredentials,
    ) -> Result<(), BootstrapError> {
        let conn = self.open(admin)?;
        let db = conn.database(db_name);
        tracing::debug!(database = db.name(), "creating database");

        let provisioning_error = |e: DriverError| match e {
            DriverError::Rejected(_) => BootstrapError::Provisioning {
                database: db_name.to_string(),
                user: app.user.clone(),
                source: e,
            },
            other => connection_error(admin, other),
        };
        db.materialize().map_err(provisioning_error)?;
        db.add_user(&app.user, &app.pass).map_err(provisioning_error)?;

        tracing::info!(database = db_name, user = %app.user, "provisioned database user");
        Ok(())
    }

    /// Create the target database unless it already exists.
    ///
    /// After creating, existence is checked again; a database still missing
    /// from the listing is logged, not an error.
    pub fn ensure(&self, target: &DatabaseTarget) -> Result<BootstrapOutcome, BootstrapError> {
        if self.exists(&target.admin, &target.name)? {
            tracing::info!(database = %target.name, "database already exists");
            return Ok(BootstrapOutcome::AlreadyExists);
        }

        self.create(&target.admin, &target.name, &target.app)?;

        if !self.exists(&target.admin, &target.name)? {
            tracing::warn!(
                database = %target.name,
                "database not listed after provisioning"
            );
        }
        Ok(BootstrapOutcome::Provisioned)
    }

    fn open(&self, admin: &DbAdminCredentials) -> Result<Box<dyn DatabaseConnection>, BootstrapError> {
        let uri = AdminUri::new(admin);
        tracing::debug!(%uri, "opening admin connection");
        self.driver.connect(&uri).map_err(|e| connection_error(admin, e))
    }
}

fn connection_error(admin: &DbAdminCredentials, source: DriverError) -> BootstrapError {
    BootstrapError::Connection {
        host: admin.host.clone(),
        port: admin.port,
        source,
    }
}
