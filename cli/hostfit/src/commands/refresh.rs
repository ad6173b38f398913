//! Refresh command (rebuild the inventory snapshot).

use anyhow::{Context, Result};
use clap::Args;
use hostfit_inventory::{refresh, HostCache, RefreshScope, Snapshot};

use crate::arm::ArmInventorySource;
use crate::output::{print_output, print_success, print_warning, HostRow, OutputFormat};

use super::CommandContext;

/// Refresh command.
#[derive(Debug, Args)]
pub struct RefreshCommand {
    /// Limit to one resource group.
    #[arg(long, short = 'r')]
    resource_group: Option<String>,

    /// Limit to one host group.
    #[arg(long)]
    host_group: Option<String>,
}

impl RefreshCommand {
    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let store = ctx.store()?;
        let source = ArmInventorySource::new(ctx.arm_client().await?);

        let scope = RefreshScope {
            resource_group: self.resource_group,
            host_group: self.host_group,
        };
        let cache = refresh(&source, &scope, &catalog)
            .await
            .context("Inventory refresh failed")?;
        if let Some(warning) = empty_scope_warning(&cache, &scope) {
            print_warning(&warning);
        }

        let snapshot = Snapshot::new(cache);
        store.save(&snapshot)?;

        let rows: Vec<HostRow> = snapshot
            .cache
            .groups()
            .flat_map(|g| g.hosts.values().map(move |h| HostRow::new(g, h)))
            .collect();
        print_output(&rows, ctx.format);

        if ctx.format == OutputFormat::Table {
            print_success(&format!(
                "Saved {} hosts in {} host groups to {}",
                snapshot.cache.host_count(),
                snapshot.cache.host_groups.len(),
                store.path().display()
            ));
        }
        Ok(())
    }
}

/// Warning for a refresh that found no host groups.
fn empty_scope_warning(cache: &HostCache, scope: &RefreshScope) -> Option<String> {
    if !cache.is_empty() {
        return None;
    }
    let within = match (&scope.resource_group, &scope.host_group) {
        (Some(rg), Some(hg)) => format!("host group {hg} in resource group {rg}"),
        (Some(rg), None) => format!("resource group {rg}"),
        (None, Some(hg)) => format!("host group {hg}"),
        (None, None) => "the subscription".to_string(),
    };
    Some(format!("No host groups found in {within}"))
}
