//! Recommend command (VM placement).

use anyhow::Result;
use clap::{Args, ValueEnum};
use hostfit_placement::{recommend, PlacementResult, ScorePreference};

use crate::output::{print_receipt, Receipt, ReceiptNextStep};

use super::{CommandContext, TargetArgs};

/// Which score wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Prefer {
    /// Highest score (tight packing on estimates).
    #[default]
    Highest,
    /// Lowest positive score.
    Lowest,
}

impl From<Prefer> for ScorePreference {
    fn from(p: Prefer) -> Self {
        match p {
            Prefer::Highest => Self::Highest,
            Prefer::Lowest => Self::Lowest,
        }
    }
}

/// Recommend command.
#[derive(Debug, Args)]
pub struct RecommendCommand {
    /// VM size, e.g. Standard_D4s_v3.
    #[arg(long, short = 's')]
    size: String,

    #[command(flatten)]
    target: TargetArgs,

    /// Score preference.
    #[arg(long, value_enum, default_value_t = Prefer::Highest)]
    prefer: Prefer,
}

impl RecommendCommand {
    pub fn run(self, ctx: CommandContext) -> Result<()> {
        let filters = self.target.filters()?;
        let catalog = ctx.catalog()?;
        let snapshot = ctx.load_snapshot()?;

        let result = recommend(
            &snapshot.cache,
            &filters,
            &self.size,
            &catalog,
            self.prefer.into(),
        )?;

        let next = next_steps(&result);
        let (message, status) = match &result {
            PlacementResult::PlacedOn {
                host_name,
                host_group,
                score,
                ..
            } => (
                format!(
                    "Place {} on host {host_name} in host group {host_group} (score {score:.3})",
                    self.size
                ),
                "placed",
            ),
            PlacementResult::CreateHostRequired {
                host_sku,
                host_group,
                ..
            } => (
                format!(
                    "No host fits {}; add a {host_sku} host to host group {host_group}",
                    self.size
                ),
                "create_host_required",
            ),
        };

        print_receipt(
            ctx.format,
            Receipt {
                message,
                status,
                kind: "recommend",
                resource_key: "placement",
                resource: &result,
                next: &next,
            },
        );
        Ok(())
    }
}

fn next_steps(result: &PlacementResult) -> Vec<ReceiptNextStep> {
    match result {
        PlacementResult::PlacedOn { .. } => Vec::new(),
        PlacementResult::CreateHostRequired {
            host_sku,
            resource_group,
            host_group,
            location,
            ..
        } => {
            let mut cmd = format!(
                "hostfit create-host --sku {host_sku} --resource-group {resource_group} --host-group {host_group}"
            );
            match location {
                Some(location) => cmd.push_str(&format!(" --location {location}")),
                None => cmd.push_str(" --location <location>"),
            }
            vec![ReceiptNextStep {
                label: "Create host",
                cmd,
            }]
        }
    }
}
