//! Inventory source backed by the compute provider.
//!
//! Wire types mirror the ARM JSON and are mapped to inventory records here,
//! so the inventory crate never sees provider payloads.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use hostfit_inventory::{
    HostGroup, HostGroupRecord, HostRecord, InventorySource, RefreshScope, VmRecord,
};
use serde::Deserialize;

use super::ArmClient;

const COMPUTE: &str = "/providers/Microsoft.Compute";

/// Reads host groups, hosts and VMs from ARM.
pub struct ArmInventorySource {
    client: ArmClient,
}

impl ArmInventorySource {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }
}

fn scoped(scope: &RefreshScope, collection: &str) -> String {
    match &scope.resource_group {
        Some(rg) => format!("/resourceGroups/{rg}{COMPUTE}/{collection}"),
        None => format!("{COMPUTE}/{collection}"),
    }
}

fn hosts_path(group: &HostGroup) -> String {
    format!(
        "/resourceGroups/{}{COMPUTE}/hostGroups/{}/hosts",
        group.resource_group, group.name
    )
}

#[async_trait]
impl InventorySource for ArmInventorySource {
    async fn host_groups(&self, scope: &RefreshScope) -> Result<Vec<HostGroupRecord>> {
        let groups: Vec<HostGroupResource> = self.client.list(&scoped(scope, "hostGroups")).await?;
        Ok(groups.into_iter().map(HostGroupRecord::from).collect())
    }

    async fn hosts(&self, group: &HostGroup) -> Result<Vec<HostRecord>> {
        let hosts: Vec<HostResource> = self.client.list(&hosts_path(group)).await?;
        Ok(hosts.into_iter().map(HostRecord::from).collect())
    }

    async fn allocatable_capacity(
        &self,
        group: &HostGroup,
        host: &HostRecord,
    ) -> Result<BTreeMap<String, u32>> {
        let path = format!("{}/{}", hosts_path(group), host.name);
        let resource: HostResource = self.client.get(&path, Some("instanceView")).await?;
        Ok(resource.allocatable_capacity())
    }

    async fn vm_details(&self, scope: &RefreshScope) -> Result<Vec<VmRecord>> {
        let vms: Vec<VmResource> = self.client.list(&scoped(scope, "virtualMachines")).await?;
        Ok(vms.into_iter().map(VmRecord::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct HostGroupResource {
    id: String,
    name: String,
    location: String,
    #[serde(default)]
    zones: Vec<String>,
}

impl From<HostGroupResource> for HostGroupRecord {
    fn from(r: HostGroupResource) -> Self {
        Self {
            id: r.id,
            name: r.name,
            location: r.location,
            zones: r.zones,
            resource_group: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Sku {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SubResource {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HostResource {
    id: String,
    name: String,
    location: String,
    sku: Sku,
    #[serde(default)]
    properties: HostProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostProperties {
    #[serde(default, alias = "faultDomain")]
    platform_fault_domain: Option<u32>,

    #[serde(default)]
    virtual_machines: Vec<SubResource>,

    #[serde(default)]
    instance_view: Option<HostInstanceView>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostInstanceView {
    #[serde(default)]
    available_capacity: Option<AvailableCapacity>,
}

#[derive(Debug, Deserialize)]
struct AvailableCapacity {
    #[serde(rename = "allocatableVMs", default)]
    allocatable_vms: Vec<AllocatableVm>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocatableVm {
    vm_size: String,
    /// Typed as a JSON number by the API.
    count: f64,
}

impl HostResource {
    fn allocatable_capacity(&self) -> BTreeMap<String, u32> {
        self.properties
            .instance_view
            .as_ref()
            .and_then(|view| view.available_capacity.as_ref())
            .map(|capacity| {
                capacity
                    .allocatable_vms
                    .iter()
                    .map(|entry| (entry.vm_size.clone(), entry.count.max(0.0) as u32))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<HostResource> for HostRecord {
    fn from(r: HostResource) -> Self {
        Self {
            id: r.id,
            name: r.name,
            sku: r.sku.name,
            location: r.location,
            fault_domain: r.properties.platform_fault_domain.map(|fd| fd.to_string()),
            virtual_machine_ids: r
                .properties
                .virtual_machines
                .into_iter()
                .map(|vm| vm.id)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VmResource {
    id: String,
    name: String,
    #[serde(default)]
    properties: VmProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmProperties {
    #[serde(default)]
    hardware_profile: Option<HardwareProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardwareProfile {
    vm_size: String,
}

impl From<VmResource> for VmRecord {
    fn from(r: VmResource) -> Self {
        Self {
            id: r.id,
            name: r.name,
            size: r
                .properties
                .hardware_profile
                .map(|hw| hw.vm_size)
                .unwrap_or_default(),
        }
    }
}
