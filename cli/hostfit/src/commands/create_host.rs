//! Create-host command (grow a host group).

use anyhow::Result;
use clap::Args;
use hostfit_placement::{provision, CreateHostRequest};
use serde::Serialize;

use crate::arm::ArmProvisioner;
use crate::output::{print_receipt, Receipt, ReceiptNextStep};

use super::CommandContext;

/// Create-host command.
#[derive(Debug, Args)]
pub struct CreateHostCommand {
    /// Host SKU, e.g. DSv3-Type1.
    #[arg(long)]
    sku: String,

    /// Region of the host group.
    #[arg(long, short = 'l')]
    location: String,

    /// Resource group of the host group.
    #[arg(long, short = 'r')]
    resource_group: String,

    /// Host group to grow.
    #[arg(long)]
    host_group: String,

    /// Host name; generated from the host group name if omitted.
    #[arg(long)]
    host_name: Option<String>,

    /// Number of hosts to create.
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Platform fault domain for the new hosts.
    #[arg(long)]
    fault_domain: Option<u32>,
}

#[derive(Debug, Serialize)]
struct CreatedHosts<'a> {
    sku: &'a str,
    host_group: &'a str,
    host_ids: Vec<String>,
}

impl CreateHostCommand {
    fn request(&self) -> CreateHostRequest {
        CreateHostRequest {
            sku: self.sku.clone(),
            location: self.location.clone(),
            resource_group: self.resource_group.clone(),
            host_group: self.host_group.clone(),
            host_name: self.host_name.clone(),
            fault_domain: self.fault_domain,
            count: self.count,
        }
    }

    pub async fn run(self, ctx: CommandContext) -> Result<()> {
        let catalog = ctx.catalog()?;
        let request = self.request();
        // Reject bad input before signing in.
        request.validate(&catalog)?;

        let provisioner = ArmProvisioner::new(ctx.arm_client().await?);
        let host_ids = provision(&provisioner, &catalog, &request).await?;

        let created = CreatedHosts {
            sku: &request.sku,
            host_group: &request.host_group,
            host_ids,
        };
        let next = [ReceiptNextStep {
            label: "Refresh inventory",
            cmd: format!(
                "hostfit refresh --resource-group {} --host-group {}",
                request.resource_group, request.host_group
            ),
        }];

        print_receipt(
            ctx.format,
            Receipt {
                message: format!(
                    "Created {} {} host(s) in host group {}",
                    created.host_ids.len(),
                    request.sku,
                    request.host_group
                ),
                status: "created",
                kind: "create_host",
                resource_key: "hosts",
                resource: &created,
                next: &next,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        cmd: CreateHostCommand,
    }

    #[test]
    fn test_flags_map_to_request() {
        let harness = Harness::try_parse_from([
            "create-host",
            "--sku",
            "DSv3-Type1",
            "--location",
            "eastus",
            "--resource-group",
            "rg",
            "--host-group",
            "hg",
            "--count",
            "2",
        ])
        .unwrap();

        let request = harness.cmd.request();
        assert_eq!(request.count, 2);
        assert!(request.host_name.is_none());
        assert!(request.fault_domain.is_none());
    }

    #[test]
    fn test_missing_host_group_is_rejected() {
        let err = Harness::try_parse_from([
            "create-host",
            "--sku",
            "DSv3-Type1",
            "--location",
            "eastus",
            "--resource-group",
            "rg",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_zone_flag_is_not_accepted() {
        // Hosts take the zone of their host group.
        let err = Harness::try_parse_from([
            "create-host",
            "--sku",
            "DSv3-Type1",
            "--location",
            "eastus",
            "--zone",
            "1",
            "--resource-group",
            "rg",
            "--host-group",
            "hg",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
