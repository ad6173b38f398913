//! Hosts command (utilization table from the snapshot).

use anyhow::Result;
use clap::Args;
use hostfit_inventory::HostCache;
use hostfit_placement::PlacementFilters;

use crate::output::{print_output, HostRow};

use super::{CommandContext, TargetArgs};

/// Hosts command.
#[derive(Debug, Args)]
pub struct HostsCommand {
    #[command(flatten)]
    target: TargetArgs,
}

impl HostsCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let filters = self.target.filters()?;
        let snapshot = ctx.load_snapshot()?;

        print_output(&rows(&snapshot.cache, &filters), ctx.format);
        Ok(())
    }
}

fn rows(cache: &HostCache, filters: &PlacementFilters) -> Vec<HostRow> {
    cache
        .groups()
        .filter(|g| filters.admits_group(g))
        .flat_map(|g| {
            g.hosts
                .values()
                .filter(|h| filters.admits_host(h))
                .map(move |h| HostRow::new(g, h))
        })
        .collect()
}
