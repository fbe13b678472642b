use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use is_terminal::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use epms_cli::api::{ApiClient, ApiError, AuthContext, ProcurementApi, user_message};
use epms_cli::cli::{self, Cli};
use epms_cli::config::Config;
use epms_cli::navigation::TerminalNavigator;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }

    init_logging(&config, cli.verbose);
    log::debug!("Using API at {}", config.api_url);

    let store = config.session_store()?;
    log::debug!("Session file: {}", store.path().display());
    let auth = Arc::new(AuthContext::restore(store));

    let client = ApiClient::with_timeout(
        config.api_url.clone(),
        config.timeout(),
        auth,
        Arc::new(TerminalNavigator),
    )?;
    let api = ProcurementApi::new(client);

    cli::run(cli.command, &api, &config).await
}

fn init_logging(config: &Config, verbose: bool) {
    let default_level = if verbose { "debug" } else { config.log_level.as_str() };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api_err) => {
            log::debug!("{:#}", err);
            eprintln!("{} {}", "Error:".red().bold(), user_message(api_err));
        }
        None => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }
}
