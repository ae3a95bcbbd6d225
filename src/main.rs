//! cloudboot: cloud credential resolution and database bootstrap CLI.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use cloudboot::cloud;
use cloudboot::config::ConfigStore;
use cloudboot::constants;
use cloudboot::credentials::{ConfigSource, CredentialResolver};
use cloudboot::database::{AppCredentials, DatabaseBootstrapper, DatabaseTarget, MongoDriver};
use cloudboot::logging;
use cloudboot::output::{ConfigReport, CredentialReport, DatabaseReport, ServiceReport};

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{AwsArgs, Cli, Command, ConfigAction, ConnectArgs, DbAction, OutputFormat};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let store = ConfigStore::global();
    let config_path = cli.config.as_deref();
    let format = cli.format;

    match cli.command {
        Command::Config { action } => run_config(action, store, config_path, format),
        Command::Creds(args) => run_creds(&args, store, config_path, format),
        Command::Connect(args) => run_connect(&args, store, config_path, format),
        Command::Db { action } => run_db(action, store, config_path, format),
        Command::Version => run_version(),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Show the config file or its resolved path.
fn run_config(
    action: ConfigAction,
    store: &ConfigStore,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = store
                .effective_path(config_path)
                .context("failed to resolve config path")?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = store.load(config_path).context("failed to load config")?;
            print!("{}", format.renderer().render_config(&ConfigReport::from(&*config)));
        }
    }
    Ok(())
}

/// Resolve cloud credentials and print them with the secret masked.
fn run_creds(
    args: &AwsArgs,
    store: &ConfigStore,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = ConfigSource::new(store, config_path);
    let creds = CredentialResolver::new(&source)
        .resolve_aws(&args.to_partial())
        .context("failed to resolve cloud credentials")?;
    print!("{}", format.renderer().render_credentials(&CredentialReport::from(&creds)));
    Ok(())
}

/// Resolve credentials and open a service connection.
fn run_connect(
    args: &ConnectArgs,
    store: &ConfigStore,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = ConfigSource::new(store, config_path);
    let handle = cloud::login(args.service, &args.credentials.to_partial(), &source)
        .with_context(|| format!("failed to connect to {}", args.service))?;
    print!("{}", format.renderer().render_service(&ServiceReport::from(&handle)));
    Ok(())
}

/// Check for or bootstrap a database.
fn run_db(
    action: DbAction,
    store: &ConfigStore,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let source = ConfigSource::new(store, config_path);
    let resolver = CredentialResolver::new(&source);
    let bootstrapper = DatabaseBootstrapper::new(MongoDriver::new());

    match action {
        DbAction::Exists(args) => {
            let admin = resolver
                .resolve_db_admin(&args.admin.to_partial())
                .context("failed to resolve database admin credentials")?;
            let exists = bootstrapper
                .exists(&admin, &args.name)
                .with_context(|| format!("failed to check database '{}'", args.name))?;
            let report = DatabaseReport {
                database: args.name,
                host: admin.host,
                port: admin.port,
                exists,
                outcome: None,
            };
            print!("{}", format.renderer().render_database(&report));
        }
        DbAction::Init(args) => {
            let admin = resolver
                .resolve_db_admin(&args.admin.to_partial())
                .context("failed to resolve database admin credentials")?;
            let target = DatabaseTarget {
                admin,
                name: args.name,
                app: AppCredentials {
                    user: args.app_user,
                    pass: args.app_pass,
                },
            };
            let outcome = bootstrapper
                .ensure(&target)
                .with_context(|| format!("failed to bootstrap database '{}'", target.name))?;
            let report = DatabaseReport {
                database: target.name,
                host: target.admin.host,
                port: target.admin.port,
                exists: true,
                outcome: None,
            }
            .with_outcome(outcome);
            print!("{}", format.renderer().render_database(&report));
        }
    }
    Ok(())
}
