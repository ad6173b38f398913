//! VM size and dedicated host SKU catalog.
//!
//! The catalog is an immutable lookup value built once per process and passed
//! explicitly to everything that needs capacity figures. It answers three
//! questions:
//!
//! - How many cores and how much memory does a VM size consume?
//! - How many cores and how much memory does a host SKU provide?
//! - Which host SKU can run a given VM size?
//!
//! # Invariants
//!
//! - Lookups never fall back to a default; a miss is an error.
//! - Iteration order is lexicographic by identifier, so reverse lookups are
//!   deterministic.

mod builtin;
mod error;

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub use error::CatalogError;

/// Core and memory cost of a single VM size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSizeSpec {
    /// VM size identifier (e.g. `Standard_D2s_v3`).
    pub id: String,

    /// Number of cores consumed on the host.
    pub core_count: u32,

    /// Memory consumed on the host, in GiB.
    pub memory_gib: u32,
}

/// Capacity and compatibility of a dedicated host SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSkuSpec {
    /// Host SKU identifier (e.g. `DSv3-Type1`).
    pub id: String,

    /// Total cores available to VMs.
    pub total_core_count: u32,

    /// Total memory available to VMs, in GiB.
    pub total_memory_gib: u32,

    /// VM sizes this SKU can host.
    pub compatible_vm_sizes: BTreeSet<String>,
}

impl HostSkuSpec {
    /// Returns true if the SKU can host the given VM size.
    pub fn supports(&self, vm_size: &str) -> bool {
        self.compatible_vm_sizes.contains(vm_size)
    }
}

/// Immutable SKU catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    vm_sizes: BTreeMap<String, VmSizeSpec>,
    host_skus: BTreeMap<String, HostSkuSpec>,
}

impl Catalog {
    /// The built-in catalog of supported Azure dedicated host SKUs.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Start building a custom catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Look up a VM size.
    pub fn vm_spec(&self, vm_size: &str) -> Result<&VmSizeSpec, CatalogError> {
        self.vm_sizes
            .get(vm_size)
            .ok_or_else(|| CatalogError::VmSizeNotFound(vm_size.to_string()))
    }

    /// Look up a host SKU.
    pub fn host_spec(&self, sku: &str) -> Result<&HostSkuSpec, CatalogError> {
        self.host_skus
            .get(sku)
            .ok_or_else(|| CatalogError::HostSkuNotFound(sku.to_string()))
    }

    /// Find a host SKU able to run the given VM size.
    ///
    /// When several SKUs qualify, the lexicographically smallest SKU id wins.
    pub fn host_sku_supporting(&self, vm_size: &str) -> Option<&str> {
        self.host_skus
            .values()
            .find(|sku| sku.supports(vm_size))
            .map(|sku| sku.id.as_str())
    }

    /// Returns true if the VM size is known to the catalog.
    pub fn contains_vm_size(&self, vm_size: &str) -> bool {
        self.vm_sizes.contains_key(vm_size)
    }

    /// Returns true if the host SKU is known to the catalog.
    pub fn contains_host_sku(&self, sku: &str) -> bool {
        self.host_skus.contains_key(sku)
    }

    /// Iterate over all VM sizes in id order.
    pub fn vm_sizes(&self) -> impl Iterator<Item = &VmSizeSpec> {
        self.vm_sizes.values()
    }

    /// Iterate over all host SKUs in id order.
    pub fn host_skus(&self) -> impl Iterator<Item = &HostSkuSpec> {
        self.host_skus.values()
    }

    /// Compatible VM sizes that have no entry in the VM size table.
    ///
    /// Returns `(host_sku, vm_size)` pairs. An empty result means every
    /// compatibility entry can be costed.
    pub fn dangling_compatibility(&self) -> Vec<(&str, &str)> {
        self.host_skus
            .values()
            .flat_map(|sku| {
                sku.compatible_vm_sizes
                    .iter()
                    .filter(|size| !self.contains_vm_size(size.as_str()))
                    .map(move |size| (sku.id.as_str(), size.as_str()))
            })
            .collect()
    }
}

/// Builder for [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Add a VM size.
    pub fn vm_size(mut self, id: &str, core_count: u32, memory_gib: u32) -> Self {
        self.catalog.vm_sizes.insert(
            id.to_string(),
            VmSizeSpec {
                id: id.to_string(),
                core_count,
                memory_gib,
            },
        );
        self
    }

    /// Add a host SKU with the VM sizes it can run.
    pub fn host_sku(
        mut self,
        id: &str,
        total_core_count: u32,
        total_memory_gib: u32,
        compatible_vm_sizes: &[&str],
    ) -> Self {
        self.catalog.host_skus.insert(
            id.to_string(),
            HostSkuSpec {
                id: id.to_string(),
                total_core_count,
                total_memory_gib,
                compatible_vm_sizes: compatible_vm_sizes
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        );
        self
    }

    /// Finish building.
    pub fn build(self) -> Catalog {
        self.catalog
    }
}
