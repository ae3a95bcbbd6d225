//! Document database driver backed by the `mongodb` crate's blocking API.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::sync::{Client, Database};

use super::uri::AdminUri;
use super::{DatabaseConnection, DatabaseDriver, DatabaseHandle, DriverError};
use crate::constants::{DB_APP_USER_ROLE, DB_CONNECT_TIMEOUT, DB_MARKER_COLLECTION};

/// Server error code for an unauthorized command.
const CODE_UNAUTHORIZED: i32 = 13;
/// Server error code for failed authentication.
const CODE_AUTHENTICATION_FAILED: i32 = 18;
/// Server error code for creating a collection that already exists.
const CODE_NAMESPACE_EXISTS: i32 = 48;

/// Opens one client per [`DatabaseDriver::connect`] call; nothing is pooled
/// across calls.
#[derive(Debug, Clone)]
pub struct MongoDriver {
    timeout: Duration,
}

impl MongoDriver {
    pub fn new() -> Self {
        Self::with_timeout(DB_CONNECT_TIMEOUT)
    }

    /// Bound connecting and server selection by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn connection_string(&self, uri: &AdminUri) -> String {
        let ms = self.timeout.as_millis();
        format!(
            "{}?connectTimeoutMS={ms}&serverSelectionTimeoutMS={ms}",
            uri.connection_string()
        )
    }
}

impl Default for MongoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseDriver for MongoDriver {
    fn connect(&self, uri: &AdminUri) -> Result<Box<dyn DatabaseConnection>, DriverError> {
        let client = Client::with_uri_str(self.connection_string(uri)).map_err(classify)?;
        Ok(Box::new(MongoConnection { client }))
    }
}

struct MongoConnection {
    client: Client,
}

impl DatabaseConnection for MongoConnection {
    fn list_database_names(&self) -> Result<Vec<String>, DriverError> {
        self.client
            .list_database_names(None, None)
            .map_err(classify)
    }

    fn database(&self, name: &str) -> Box<dyn DatabaseHandle + '_> {
        Box::new(MongoDatabase {
            db: self.client.database(name),
        })
    }
}

struct MongoDatabase {
    db: Database,
}

impl DatabaseHandle for MongoDatabase {
    fn name(&self) -> &str {
        self.db.name()
    }

    fn materialize(&self) -> Result<(), DriverError> {
        match self.db.create_collection(DB_MARKER_COLLECTION, None) {
            Ok(()) => Ok(()),
            Err(e) if command_code(&e) == Some(CODE_NAMESPACE_EXISTS) => Ok(()),
            Err(e) => Err(classify_provisioning(e)),
        }
    }

    fn add_user(&self, user: &str, pass: &str) -> Result<(), DriverError> {
        let command = doc! {
            "createUser": user,
            "pwd": pass,
            "roles": [{ "role": DB_APP_USER_ROLE, "db": self.db.name() }],
        };
        self.db
            .run_command(command, None)
            .map(|_| ())
            .map_err(classify_provisioning)
    }
}

fn command_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(cmd) => Some(cmd.code),
        _ => None,
    }
}

/// Map an error from connecting or listing onto the connection / auth /
/// rejection split.
fn classify(err: MongoError) -> DriverError {
    let message = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => DriverError::Authentication(message),
        ErrorKind::Command(cmd)
            if cmd.code == CODE_UNAUTHORIZED || cmd.code == CODE_AUTHENTICATION_FAILED =>
        {
            DriverError::Authentication(message)
        }
        ErrorKind::Command(_) | ErrorKind::Write(_) => DriverError::Rejected(message),
        _ => DriverError::Unreachable(message),
    }
}

/// Map an error from a provisioning command. The admin is already
/// authenticated here, so any server refusal is a rejection.
fn classify_provisioning(err: MongoError) -> DriverError {
    let message = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::Authentication { .. } => DriverError::Authentication(message),
        ErrorKind::Command(_) | ErrorKind::Write(_) => DriverError::Rejected(message),
        _ => DriverError::Unreachable(message),
    }
}
