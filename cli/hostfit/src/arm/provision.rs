//! Host provisioner backed by ARM.

use anyhow::Result;
use async_trait::async_trait;
use hostfit_placement::{HostProvisioner, HostToCreate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ArmClient;

/// Creates dedicated hosts with a PUT on the host resource.
pub struct ArmProvisioner {
    client: ArmClient,
}

impl ArmProvisioner {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Serialize)]
struct CreateHostBody<'a> {
    location: &'a str,
    sku: SkuRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<CreateHostProperties>,
}

#[derive(Debug, Serialize)]
struct SkuRef<'a> {
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateHostProperties {
    platform_fault_domain: u32,
}

#[derive(Debug, Deserialize)]
struct CreatedHost {
    id: String,
}

fn host_path(host: &HostToCreate) -> String {
    format!(
        "/resourceGroups/{}/providers/Microsoft.Compute/hostGroups/{}/hosts/{}",
        host.resource_group, host.host_group, host.name
    )
}

fn body(host: &HostToCreate) -> CreateHostBody<'_> {
    CreateHostBody {
        location: &host.location,
        sku: SkuRef { name: &host.sku },
        properties: host
            .fault_domain
            .map(|platform_fault_domain| CreateHostProperties {
                platform_fault_domain,
            }),
    }
}

#[async_trait]
impl HostProvisioner for ArmProvisioner {
    async fn create_host(&self, host: &HostToCreate) -> Result<String> {
        let path = host_path(host);
        debug!(%path, sku = %host.sku, "Creating host");
        let created: CreatedHost = self.client.put(&path, &body(host)).await?;
        Ok(created.id)
    }
}
