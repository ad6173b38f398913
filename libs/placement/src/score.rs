//! Allocation scoring.
//!
//! A score of 0 means the VM cannot be placed on the host. Positive scores
//! rank hosts against each other; their meaning depends on the source:
//!
//! - **Provider capacity**: when the host reports an allocatable count for
//!   the size, the score is that count.
//! - **Local estimate**: otherwise the score is the bottleneck fraction of
//!   remaining capacity the VM would consume, `max(cores, memory)`. Higher
//!   means a tighter fit.

use hostfit_catalog::Catalog;
use hostfit_inventory::{Host, UtilizationError};

use crate::error::ScoreError;

/// Score a host for one VM of the given size.
pub fn score(host: &Host, vm_size: &str, catalog: &Catalog) -> Result<f64, ScoreError> {
    if let Some(count) = host.allocatable_capacity.get(vm_size) {
        return Ok(f64::from(*count));
    }
    estimate(host, vm_size, catalog)
}

/// Score from locally derived utilization, ignoring provider capacity.
pub fn estimate(host: &Host, vm_size: &str, catalog: &Catalog) -> Result<f64, ScoreError> {
    let sku = catalog
        .host_spec(&host.sku)
        .map_err(|_| UtilizationError::UnknownSku {
            host: host.name.clone(),
            sku: host.sku.clone(),
        })?;
    if !sku.supports(vm_size) {
        return Ok(0.0);
    }

    let Ok(required) = catalog.vm_spec(vm_size) else {
        return Ok(0.0);
    };

    let utilization = host.measure(catalog)?;
    let required_cores = i64::from(required.core_count);
    let required_memory = i64::from(required.memory_gib);

    if utilization.available_cores <= 0
        || utilization.available_memory_gib <= 0
        || required_cores > utilization.available_cores
        || required_memory > utilization.available_memory_gib
    {
        return Ok(0.0);
    }

    let core_fraction = required_cores as f64 / utilization.available_cores as f64;
    let memory_fraction = required_memory as f64 / utilization.available_memory_gib as f64;

    Ok(core_fraction.max(memory_fraction))
}
