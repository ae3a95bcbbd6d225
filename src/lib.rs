//! cloudboot: cloud credential resolution and database bootstrap (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod cloud;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod database;
pub mod env;
pub mod logging;
pub mod output;
