//! hostfit - placement recommender for VMs on Azure dedicated hosts.
//!
//! `refresh` reads the fleet from Azure Resource Manager into a local
//! snapshot. `recommend` and `hosts` work off that snapshot only.
//! `create-host` grows a host group.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod arm;
mod commands;
mod config;
mod error;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(error::exit_code(&e));
    }

    Ok(())
}

/// Logs go to stderr; stdout is reserved for command output.
///
/// Prefers RUST_LOG, then HOSTFIT_LOG; `--verbose` raises the default to
/// debug. `HOSTFIT_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "debug".to_string()
    } else {
        std::env::var("HOSTFIT_LOG").unwrap_or_else(|_| "warn".to_string())
    };
    let json = std::env::var("HOSTFIT_LOG_FORMAT").is_ok_and(|v| v == "json");

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();
}
