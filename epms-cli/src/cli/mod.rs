//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::api::ProcurementApi;
use crate::config::Config;
use commands::auth::{LoginArgs, PasswdArgs, WhoamiArgs};
use commands::query::handler::ListTarget;
use commands::query::{ListArgs, MetadataArgs, PickerArgs};

/// Command-line client for the EPMS procurement backend
#[derive(Debug, Parser)]
#[command(name = "epms-cli")]
#[command(about = "Query purchase orders, vendors and materials from the EPMS OData API")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config and EPMS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in and persist the session
    Login(LoginArgs),
    /// Clear the persisted session
    Logout,
    /// Show the signed-in user
    Whoami(WhoamiArgs),
    /// Change your password (required before first use of a new account)
    Passwd(PasswdArgs),
    /// List your purchase orders
    Orders(ListArgs),
    /// List purchase orders awaiting approval (pending by default)
    Approvals(ListArgs),
    /// List vendors
    Vendors(ListArgs),
    /// List materials
    Materials(ListArgs),
    /// Load the full active vendor or material list used by pickers
    Picker(PickerArgs),
    /// Show the OData service metadata
    Metadata(MetadataArgs),
}

/// Dispatch a parsed command
pub async fn run(command: Commands, api: &ProcurementApi, config: &Config) -> Result<()> {
    match command {
        Commands::Login(args) => commands::auth::handle_login_command(api, args).await,
        Commands::Logout => commands::auth::handle_logout_command(api).await,
        Commands::Whoami(args) => commands::auth::handle_whoami_command(api, args).await,
        Commands::Passwd(args) => commands::auth::handle_passwd_command(api, args).await,
        Commands::Orders(args) => {
            commands::query::handle_list_command(api, config, ListTarget::Orders, args).await
        }
        Commands::Approvals(args) => {
            commands::query::handle_list_command(api, config, ListTarget::Approvals, args).await
        }
        Commands::Vendors(args) => {
            commands::query::handle_list_command(api, config, ListTarget::Vendors, args).await
        }
        Commands::Materials(args) => {
            commands::query::handle_list_command(api, config, ListTarget::Materials, args).await
        }
        Commands::Picker(args) => commands::query::handle_picker_command(api, args).await,
        Commands::Metadata(args) => commands::query::handle_metadata_command(api, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use commands::query::{OutputFormat, PickerSource};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_flags() {
        let cli = Cli::try_parse_from([
            "epms-cli", "vendors", "--page", "2", "--page-size", "50", "-k", "acme", "--status", "ACTIVE", "-f", "csv",
        ])
        .unwrap();
        let Commands::Vendors(args) = cli.command else {
            panic!("expected vendors command");
        };
        assert_eq!(args.page, 2);
        assert_eq!(args.page_size, Some(50));
        assert_eq!(args.keyword.as_deref(), Some("acme"));
        assert_eq!(args.status.as_deref(), Some("ACTIVE"));
        assert_eq!(args.output.format, OutputFormat::Csv);
    }

    #[test]
    fn test_parse_picker_and_globals() {
        let cli = Cli::try_parse_from(["epms-cli", "picker", "all", "--api-url", "http://epms:8080", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://epms:8080"));
        let Commands::Picker(args) = cli.command else {
            panic!("expected picker command");
        };
        assert_eq!(args.source, PickerSource::All);
    }

    #[test]
    fn test_login_requires_username() {
        assert!(Cli::try_parse_from(["epms-cli", "login"]).is_err());
        let cli = Cli::try_parse_from(["epms-cli", "login", "admin", "--password", "secret"]).unwrap();
        let Commands::Login(args) = cli.command else {
            panic!("expected login command");
        };
        assert_eq!(args.username, "admin");
        assert_eq!(args.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parse_passwd() {
        let cli = Cli::try_parse_from(["epms-cli", "passwd", "--old", "Welcome@123"]).unwrap();
        let Commands::Passwd(args) = cli.command else {
            panic!("expected passwd command");
        };
        assert_eq!(args.old.as_deref(), Some("Welcome@123"));
        assert_eq!(args.new, None);
    }
}
