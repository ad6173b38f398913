//! CLI commands.

mod create_host;
mod hosts;
mod recommend;
mod refresh;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use hostfit_catalog::Catalog;
use hostfit_inventory::{Snapshot, SnapshotStore};
use hostfit_placement::PlacementFilters;
use tracing::warn;

use crate::arm::{acquire_token, ArmClient};
use crate::config::{Config, Credentials};
use crate::error::CliError;
use crate::output::{print_warning, OutputFormat};

/// hostfit - place VMs on Azure dedicated hosts.
#[derive(Debug, Parser)]
#[command(name = "hostfit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Inventory snapshot file.
    #[arg(long, global = true, env = "HOSTFIT_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Service principal credentials file.
    #[arg(long, global = true)]
    credentials: Option<PathBuf>,

    /// Log operational details to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read host groups, hosts and VMs from Azure and save a snapshot.
    #[command(alias = "analyze")]
    Refresh(refresh::RefreshCommand),

    /// Recommend a host for a VM size.
    Recommend(recommend::RecommendCommand),

    /// Add hosts to a host group.
    CreateHost(create_host::CreateHostCommand),

    /// Show host utilization from the snapshot.
    Hosts(hosts::HostsCommand),

    /// Show CLI version.
    Version,
}

impl Cli {
    /// Run the CLI command.
    pub async fn run(self) -> Result<()> {
        self.run_with(Config::load).await
    }

    /// Config is only loaded by commands that use it, so `version` still
    /// works with a broken config file.
    async fn run_with(self, load_config: fn() -> Result<Config>) -> Result<()> {
        let (format, snapshot, credentials) = (self.format, self.snapshot, self.credentials);
        let ctx = move || -> Result<CommandContext> {
            Ok(CommandContext {
                config: load_config()?,
                format,
                snapshot,
                credentials,
            })
        };

        match self.command {
            Commands::Refresh(cmd) => cmd.run(ctx()?).await,
            Commands::Recommend(cmd) => cmd.run(ctx()?),
            Commands::CreateHost(cmd) => cmd.run(ctx()?).await,
            Commands::Hosts(cmd) => cmd.run(ctx()?),
            Commands::Version => {
                println!("hostfit {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    pub snapshot: Option<PathBuf>,
    pub credentials: Option<PathBuf>,
}

impl CommandContext {
    /// The snapshot store for this invocation.
    pub fn store(&self) -> Result<SnapshotStore> {
        Ok(SnapshotStore::new(
            self.config.snapshot_path(self.snapshot.as_deref())?,
        ))
    }

    /// Load the snapshot, warning when it is older than configured.
    pub fn load_snapshot(&self) -> Result<Snapshot> {
        let snapshot = self.store()?.load()?;

        let age = snapshot.age();
        if age > self.config.max_snapshot_age() {
            warn!(
                age_secs = age.num_seconds(),
                refreshed_at = %snapshot.refreshed_at,
                "Snapshot is stale"
            );
            print_warning(&format!(
                "Inventory snapshot is {} minutes old; run `hostfit refresh` for current data.",
                age.num_minutes()
            ));
        }

        Ok(snapshot)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        self.config.catalog()
    }

    /// Sign in and get an ARM client for the configured subscription.
    pub async fn arm_client(&self) -> Result<ArmClient> {
        let credentials = Credentials::load(self.credentials.as_deref())?;
        let token = acquire_token(&self.config.endpoints, &credentials).await?;
        ArmClient::new(&self.config.endpoints, &credentials.subscription_id, &token)
    }
}

/// Where to look: shared by commands that read the snapshot.
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// Region, e.g. eastus.
    #[arg(long, short = 'l')]
    location: Option<String>,

    /// Availability zone (1, 2 or 3). Requires --location.
    #[arg(long, short = 'z')]
    zone: Option<String>,

    /// Platform fault domain (0, 1 or 2). Requires --location.
    #[arg(long)]
    fault_domain: Option<String>,

    /// Resource group.
    #[arg(long, short = 'r')]
    resource_group: Option<String>,

    /// Host group name.
    #[arg(long)]
    host_group: Option<String>,
}

impl TargetArgs {
    /// Validate and convert into placement filters.
    pub fn filters(&self) -> Result<PlacementFilters, CliError> {
        if self.location.is_none() && (self.zone.is_some() || self.fault_domain.is_some()) {
            return Err(CliError::InvalidInput(
                "--zone and --fault-domain require --location".to_string(),
            ));
        }

        Ok(PlacementFilters {
            location: self.location.clone(),
            zone: self.zone.clone(),
            resource_group: self.resource_group.clone(),
            host_group: self.host_group.clone(),
            fault_domain: self.fault_domain.clone(),
        })
    }
}
