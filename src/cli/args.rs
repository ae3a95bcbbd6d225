//! Clap argument types.

use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

use cloudboot::cloud::ServiceKind;
use cloudboot::credentials::{PartialAwsCredentials, PartialDbAdminCredentials};
use cloudboot::output::OutputRenderer;
use cloudboot::output::json::JsonRenderer;
use cloudboot::output::terminal::TerminalRenderer;

/// Resolve cloud credentials and bootstrap databases.
#[derive(Parser, Debug)]
#[command(name = "cloudboot", version = cloudboot::constants::VERSION)]
pub struct Cli {
    /// Config file to read instead of $AWS_CONFIG_FILE or ~/.awsconfig.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, default_value = "terminal")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(long, short = 'q', global = true, default_value_t = false)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Inspect the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Resolve and print cloud credentials.
    Creds(AwsArgs),

    /// Open a connection to a cloud service and print its endpoint.
    Connect(ConnectArgs),

    /// Check for or bootstrap a database.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Print version and build information.
    Version,
}

/// Config subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the parsed config entries (secrets masked).
    Show,
    /// Print the config file path that would be read.
    Path,
}

/// Database subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum DbAction {
    /// Report whether a database exists.
    Exists(DbExistsArgs),
    /// Create a database and its application user unless it already exists.
    Init(DbInitArgs),
}

/// Explicit cloud credentials. Anything left out comes from the config file.
#[derive(Args, Debug, Default)]
pub struct AwsArgs {
    /// Access key id (config key: AWSAccessKeyId).
    #[arg(long)]
    pub access_key_id: Option<String>,

    /// Secret access key (config key: AWSSecretKey).
    #[arg(long)]
    pub secret_access_key: Option<String>,

    /// Region (config key: AWSRegion).
    #[arg(long)]
    pub region: Option<String>,
}

impl AwsArgs {
    pub fn to_partial(&self) -> PartialAwsCredentials {
        PartialAwsCredentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            region: self.region.clone(),
        }
    }
}

/// Arguments for the `connect` subcommand.
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Service to connect to: ec2 or route53.
    pub service: ServiceKind,

    #[command(flatten)]
    pub credentials: AwsArgs,
}

/// Explicit database admin credentials. Anything left out comes from the config file.
#[derive(Args, Debug, Default)]
pub struct DbAdminArgs {
    /// Database host (config key: DBHost).
    #[arg(long)]
    pub host: Option<String>,

    /// Database port (config key: DBPort, default 27017).
    #[arg(long)]
    pub port: Option<u16>,

    /// Administrative user (config key: DBAdminUser).
    #[arg(long)]
    pub admin_user: Option<String>,

    /// Administrative password (config key: DBAdminPass).
    #[arg(long)]
    pub admin_pass: Option<String>,
}

impl DbAdminArgs {
    pub fn to_partial(&self) -> PartialDbAdminCredentials {
        PartialDbAdminCredentials {
            admin_user: self.admin_user.clone(),
            admin_pass: self.admin_pass.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Arguments for `db exists`.
#[derive(Args, Debug)]
pub struct DbExistsArgs {
    /// Database name to look for.
    #[arg(long)]
    pub name: String,

    #[command(flatten)]
    pub admin: DbAdminArgs,
}

/// Arguments for `db init`.
#[derive(Args, Debug)]
pub struct DbInitArgs {
    /// Database name to create.
    #[arg(long)]
    pub name: String,

    /// Application user to add to the database.
    #[arg(long)]
    pub app_user: String,

    /// Password for the application user.
    #[arg(long)]
    pub app_pass: String,

    #[command(flatten)]
    pub admin: DbAdminArgs,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl OutputFormat {
    /// The renderer for this format.
    pub fn renderer(&self) -> &'static dyn OutputRenderer {
        match self {
            OutputFormat::Terminal => &TerminalRenderer,
            OutputFormat::Json => &JsonRenderer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_creds_with_partial_flags() {
        let cli = Cli::parse_from(["cloudboot", "creds", "--access-key-id", "OVERRIDE"]);
        let Command::Creds(args) = cli.command else {
            panic!("expected creds");
        };
        let partial = args.to_partial();
        assert_eq!(partial.access_key_id.as_deref(), Some("OVERRIDE"));
        assert!(partial.secret_access_key.is_none());
        assert!(partial.region.is_none());
    }

    #[test]
    fn parses_connect_service() {
        let cli = Cli::parse_from(["cloudboot", "connect", "route53", "--region", "eu-west-1"]);
        let Command::Connect(args) = cli.command else {
            panic!("expected connect");
        };
        assert_eq!(args.service, ServiceKind::Route53);
        assert_eq!(args.credentials.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn rejects_unknown_service() {
        assert!(Cli::try_parse_from(["cloudboot", "connect", "s3"]).is_err());
    }

    #[test]
    fn parses_db_init_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "cloudboot", "db", "init", "--name", "openshift", "--app-user", "broker",
            "--app-pass", "dbsecret", "--port", "27018", "--config", "/etc/cb.conf", "-vv",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/cb.conf")));
        assert_eq!(cli.verbose, 2);
        let Command::Db { action: DbAction::Init(args) } = cli.command else {
            panic!("expected db init");
        };
        assert_eq!(args.name, "openshift");
        assert_eq!(args.admin.to_partial().port, Some(27018));
        assert!(args.admin.to_partial().host.is_none());
    }

    #[test]
    fn db_init_requires_app_credentials() {
        assert!(Cli::try_parse_from(["cloudboot", "db", "init", "--name", "x"]).is_err());
    }
}
