//! Two-phase inventory construction.
//!
//! Phase one builds the skeleton (groups, hosts, VM ids) from host group and
//! host listings. Phase two resolves VM sizes and allocatable capacity from
//! separate data sources. Each phase is a plain function over records so it
//! can be tested without any network access.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BuildError;
use crate::model::{normalize_vm_id, Host, HostCache, HostGroup, Vm};

/// Host group as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroupRecord {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub zones: Vec<String>,

    /// Explicit resource group; derived from `id` when absent.
    #[serde(default)]
    pub resource_group: Option<String>,
}

/// Dedicated host as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRecord {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub location: String,
    #[serde(default)]
    pub fault_domain: Option<String>,
    #[serde(default)]
    pub virtual_machine_ids: Vec<String>,
}

/// VM details used to resolve sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    pub id: String,
    pub name: String,
    pub size: String,
}

/// Extract the resource group segment from a resource id.
///
/// Resource ids look like `/subscriptions/{sub}/resourceGroups/{rg}/...`;
/// the `resourceGroups` key is matched case-insensitively.
pub fn resource_group_from_id(id: &str) -> Option<&str> {
    let mut segments = id.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment.eq_ignore_ascii_case("resourceGroups") {
            return segments.next();
        }
    }
    None
}

impl HostGroup {
    /// Build an empty host group from its record.
    pub fn from_record(record: &HostGroupRecord) -> Result<Self, BuildError> {
        let resource_group = match &record.resource_group {
            Some(rg) if !rg.is_empty() => rg.clone(),
            _ => resource_group_from_id(&record.id)
                .ok_or_else(|| BuildError::MissingResourceGroup(record.id.clone()))?
                .to_string(),
        };

        Ok(Self {
            id: record.id.clone(),
            name: record.name.clone(),
            location: record.location.clone(),
            zone: record.zones.first().cloned(),
            resource_group,
            hosts: BTreeMap::new(),
        })
    }
}

impl Host {
    /// Build a host skeleton with unresolved VMs.
    pub fn from_record(record: &HostRecord, group: &HostGroup) -> Self {
        let resource_group = resource_group_from_id(&record.id)
            .map(str::to_string)
            .unwrap_or_else(|| group.resource_group.clone());

        let vms = record
            .virtual_machine_ids
            .iter()
            .map(|id| {
                let vm = Vm::from_id(id);
                (vm.id.clone(), vm)
            })
            .collect();

        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            group_name: group.name.clone(),
            location: record.location.clone(),
            resource_group,
            sku: record.sku.clone(),
            fault_domain: record.fault_domain.clone().unwrap_or_default(),
            vms,
            ..Self::default()
        }
    }
}

impl HostCache {
    /// Resolve VM names and sizes from a VM listing.
    ///
    /// VMs absent from the listing stay unresolved. Returns the number of
    /// VMs that were resolved.
    pub fn apply_vm_details<I>(&mut self, details: I) -> usize
    where
        I: IntoIterator<Item = VmRecord>,
    {
        let by_id: BTreeMap<String, VmRecord> = details
            .into_iter()
            .map(|record| (normalize_vm_id(&record.id), record))
            .collect();

        let mut resolved = 0;
        for host in self.hosts_mut() {
            for (id, vm) in host.vms.iter_mut() {
                if let Some(record) = by_id.get(id) {
                    vm.name = record.name.clone();
                    vm.size = record.size.clone();
                    resolved += 1;
                }
            }
        }

        debug!(listed = by_id.len(), resolved, "Applied VM details");
        resolved
    }

    /// Attach a provider-reported allocatable capacity map to a host.
    ///
    /// Returns false if no host has the given id.
    pub fn apply_allocatable_capacity(
        &mut self,
        host_id: &str,
        capacity: BTreeMap<String, u32>,
    ) -> bool {
        match self
            .hosts_mut()
            .find(|h| h.id.eq_ignore_ascii_case(host_id))
        {
            Some(host) => {
                host.allocatable_capacity = capacity;
                true
            }
            None => false,
        }
    }
}
