//! Inventory entities: host groups, hosts and the VMs running on them.
//!
//! Ownership is strictly hierarchical. A [`HostCache`] owns its
//! [`HostGroup`]s, a group owns its [`Host`]s, a host owns its [`Vm`]s.
//! There are no back-references; membership is by key lookup.
//!
//! All maps are `BTreeMap`s so that every scan over the inventory visits
//! entities in the same order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A virtual machine placed on a dedicated host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vm {
    /// Resource id, upper-cased.
    pub id: String,

    pub name: String,

    /// VM size; empty until resolved from VM details.
    pub size: String,

    /// Cores consumed (derived from `size`).
    pub core_count: u32,

    /// Memory consumed in GiB (derived from `size`).
    pub memory_gib: u32,
}

impl Vm {
    /// Create an unresolved VM from its resource id.
    pub fn from_id(id: &str) -> Self {
        Self {
            id: normalize_vm_id(id),
            ..Self::default()
        }
    }

    /// Returns true once the VM size is known.
    pub fn is_resolved(&self) -> bool {
        !self.size.is_empty()
    }
}

/// Normalize a VM resource id for lookups.
///
/// Resource ids are case-insensitive; host listings and VM listings do not
/// agree on casing.
pub fn normalize_vm_id(id: &str) -> String {
    id.to_uppercase()
}

/// A dedicated host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,

    /// Name of the owning host group.
    pub group_name: String,

    pub location: String,
    pub resource_group: String,

    /// Host SKU (references the catalog).
    pub sku: String,

    /// Platform fault domain, empty when not reported.
    pub fault_domain: String,

    /// VMs keyed by normalized id.
    pub vms: BTreeMap<String, Vm>,

    /// Provider-reported count of additional VMs per size that still fit.
    pub allocatable_capacity: BTreeMap<String, u32>,

    pub total_cores: u32,
    pub total_memory_gib: u32,
    pub utilized_cores: u32,
    pub utilized_memory_gib: u32,

    /// `total_cores - utilized_cores`; negative when oversubscribed.
    pub available_cores: i64,

    /// `total_memory_gib - utilized_memory_gib`; negative when oversubscribed.
    pub available_memory_gib: i64,

    /// VMs skipped by the last utilization pass because their size was unknown.
    pub unresolved_vm_count: u32,
}

impl Host {
    /// Snapshot of the derived capacity fields.
    pub fn utilization(&self) -> Utilization {
        Utilization {
            total_cores: self.total_cores,
            total_memory_gib: self.total_memory_gib,
            utilized_cores: self.utilized_cores,
            utilized_memory_gib: self.utilized_memory_gib,
            available_cores: self.available_cores,
            available_memory_gib: self.available_memory_gib,
            unresolved_vm_count: self.unresolved_vm_count,
        }
    }

    /// Returns true if the host matches the fault domain filter.
    pub fn in_fault_domain(&self, fault_domain: Option<&str>) -> bool {
        fault_domain.is_none_or(|fd| self.fault_domain == fd)
    }
}

/// Derived capacity of a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utilization {
    pub total_cores: u32,
    pub total_memory_gib: u32,
    pub utilized_cores: u32,
    pub utilized_memory_gib: u32,
    pub available_cores: i64,
    pub available_memory_gib: i64,
    pub unresolved_vm_count: u32,
}

impl Utilization {
    /// Returns true if more is allocated than the host provides.
    pub fn is_oversubscribed(&self) -> bool {
        self.available_cores < 0 || self.available_memory_gib < 0
    }

    /// Returns true if every VM on the host was costed.
    pub fn is_complete(&self) -> bool {
        self.unresolved_vm_count == 0
    }
}

/// A group of dedicated hosts sharing location, zone and resource group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostGroup {
    pub id: String,
    pub name: String,
    pub location: String,

    /// Availability zone, if the group is zonal.
    pub zone: Option<String>,

    pub resource_group: String,

    /// Hosts keyed by host name.
    pub hosts: BTreeMap<String, Host>,
}

impl HostGroup {
    /// Add or replace a host.
    pub fn insert_host(&mut self, host: Host) {
        self.hosts.insert(host.name.clone(), host);
    }
}

/// The full inventory: every host group visible to one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCache {
    /// Host groups keyed by resource id.
    pub host_groups: BTreeMap<String, HostGroup>,
}

impl HostCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a host group.
    pub fn insert_group(&mut self, group: HostGroup) {
        self.host_groups.insert(group.id.clone(), group);
    }

    /// Iterate over host groups in id order.
    pub fn groups(&self) -> impl Iterator<Item = &HostGroup> {
        self.host_groups.values()
    }

    /// Iterate over every host, group by group.
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.host_groups.values().flat_map(|g| g.hosts.values())
    }

    pub(crate) fn hosts_mut(&mut self) -> impl Iterator<Item = &mut Host> {
        self.host_groups
            .values_mut()
            .flat_map(|g| g.hosts.values_mut())
    }

    /// Find a host by resource id (case-insensitive).
    pub fn find_host(&self, host_id: &str) -> Option<&Host> {
        self.hosts().find(|h| h.id.eq_ignore_ascii_case(host_id))
    }

    pub fn host_count(&self) -> usize {
        self.host_groups.values().map(|g| g.hosts.len()).sum()
    }

    pub fn vm_count(&self) -> usize {
        self.hosts().map(|h| h.vms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.host_groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(name: &str, fault_domain: &str) -> Host {
        Host {
            id: format!("/hosts/{name}"),
            name: name.to_string(),
            fault_domain: fault_domain.to_string(),
            ..Host::default()
        }
    }

    #[test]
    fn test_vm_id_is_normalized() {
        let vm = Vm::from_id("/subscriptions/abc/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/vm1");
        assert_eq!(
            vm.id,
            "/SUBSCRIPTIONS/ABC/RESOURCEGROUPS/RG/PROVIDERS/MICROSOFT.COMPUTE/VIRTUALMACHINES/VM1"
        );
        assert!(!vm.is_resolved());
    }

    #[test]
    fn test_fault_domain_filter() {
        let h = host("h1", "1");
        assert!(h.in_fault_domain(None));
        assert!(h.in_fault_domain(Some("1")));
        assert!(!h.in_fault_domain(Some("2")));
    }

    #[test]
    fn test_cache_counts_and_lookup() {
        let mut group = HostGroup {
            id: "/groups/g1".to_string(),
            name: "g1".to_string(),
            ..HostGroup::default()
        };
        let mut h1 = host("h1", "0");
        h1.vms.insert("VM1".to_string(), Vm::from_id("vm1"));
        group.insert_host(h1);
        group.insert_host(host("h2", "1"));

        let mut cache = HostCache::new();
        cache.insert_group(group);

        assert_eq!(cache.host_count(), 2);
        assert_eq!(cache.vm_count(), 1);
        assert!(cache.find_host("/HOSTS/H2").is_some());
        assert!(cache.find_host("/hosts/h3").is_none());

        let names: Vec<_> = cache.hosts().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["h1", "h2"]);
    }

    #[test]
    fn test_utilization_flags() {
        let u = Utilization {
            available_cores: -2,
            unresolved_vm_count: 1,
            ..Utilization::default()
        };
        assert!(u.is_oversubscribed());
        assert!(!u.is_complete());
    }
}
