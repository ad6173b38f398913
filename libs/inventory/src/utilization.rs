//! Per-host utilization derived from the VM list and the SKU catalog.

use hostfit_catalog::Catalog;
use tracing::{debug, warn};

use crate::error::UtilizationError;
use crate::model::{Host, HostCache, Utilization};

impl Host {
    /// Compute utilization without modifying the host.
    ///
    /// Totals already recorded on the host are kept; they are only looked up
    /// in the catalog while still unknown. VM costs are always looked up.
    pub fn measure(&self, catalog: &Catalog) -> Result<Utilization, UtilizationError> {
        let (total_cores, total_memory_gib) = if self.total_cores == 0 || self.total_memory_gib == 0
        {
            let spec = catalog
                .host_spec(&self.sku)
                .map_err(|_| UtilizationError::UnknownSku {
                    host: self.name.clone(),
                    sku: self.sku.clone(),
                })?;
            (spec.total_core_count, spec.total_memory_gib)
        } else {
            (self.total_cores, self.total_memory_gib)
        };

        let mut utilized_cores: u32 = 0;
        let mut utilized_memory_gib: u32 = 0;
        let mut unresolved_vm_count: u32 = 0;

        for vm in self.vms.values() {
            if !vm.is_resolved() {
                unresolved_vm_count += 1;
                continue;
            }
            let spec = catalog
                .vm_spec(&vm.size)
                .map_err(|_| UtilizationError::UnknownVmSize {
                    host: self.name.clone(),
                    vm: vm.id.clone(),
                    size: vm.size.clone(),
                })?;
            utilized_cores = utilized_cores.saturating_add(spec.core_count);
            utilized_memory_gib = utilized_memory_gib.saturating_add(spec.memory_gib);
        }

        Ok(Utilization {
            total_cores,
            total_memory_gib,
            utilized_cores,
            utilized_memory_gib,
            available_cores: i64::from(total_cores) - i64::from(utilized_cores),
            available_memory_gib: i64::from(total_memory_gib) - i64::from(utilized_memory_gib),
            unresolved_vm_count,
        })
    }

    /// Recompute and store the derived capacity fields.
    ///
    /// Idempotent: calling it again without changing the VM list yields the
    /// same values. Each resolved VM also gets its core/memory cost filled in.
    pub fn recompute_utilization(&mut self, catalog: &Catalog) -> Result<(), UtilizationError> {
        let utilization = self.measure(catalog)?;

        for vm in self.vms.values_mut().filter(|vm| vm.is_resolved()) {
            // measure() already proved every resolved size is in the catalog
            if let Ok(spec) = catalog.vm_spec(&vm.size) {
                vm.core_count = spec.core_count;
                vm.memory_gib = spec.memory_gib;
            }
        }

        self.total_cores = utilization.total_cores;
        self.total_memory_gib = utilization.total_memory_gib;
        self.utilized_cores = utilization.utilized_cores;
        self.utilized_memory_gib = utilization.utilized_memory_gib;
        self.available_cores = utilization.available_cores;
        self.available_memory_gib = utilization.available_memory_gib;
        self.unresolved_vm_count = utilization.unresolved_vm_count;

        if !utilization.is_complete() {
            warn!(
                host = %self.name,
                unresolved = utilization.unresolved_vm_count,
                "VMs with unknown size are not counted; utilization is understated"
            );
        }

        debug!(
            host = %self.name,
            group = %self.group_name,
            sku = %self.sku,
            fault_domain = %self.fault_domain,
            vms = self.vms.len(),
            utilized_cores = self.utilized_cores,
            total_cores = self.total_cores,
            utilized_memory_gib = self.utilized_memory_gib,
            total_memory_gib = self.total_memory_gib,
            "Host utilization"
        );

        Ok(())
    }
}

impl HostCache {
    /// Recompute utilization for every host.
    ///
    /// Stops at the first host that references an unknown SKU or VM size.
    pub fn recompute_utilization(&mut self, catalog: &Catalog) -> Result<(), UtilizationError> {
        for host in self.hosts_mut() {
            host.recompute_utilization(catalog)?;
        }
        Ok(())
    }
}
