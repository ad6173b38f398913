//! Placement selection across the inventory.
//!
//! The selector scans the cache under the caller's filters, scores every
//! eligible host and picks one. When nothing fits it works out which host
//! SKU would have to be added instead.
//!
//! # Determinism
//!
//! The cache iterates host groups by id and hosts by name. Ties between equal
//! scores go to the host seen first in that order.

use hostfit_catalog::Catalog;
use hostfit_inventory::{Host, HostCache, HostGroup};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::PlacementError;
use crate::score::score;

/// Caller-supplied constraints on where a VM may go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementFilters {
    /// Region, exact match.
    pub location: Option<String>,

    /// Availability zone, exact match.
    pub zone: Option<String>,

    /// Resource group, case-insensitive.
    pub resource_group: Option<String>,

    /// Host group name, case-insensitive.
    pub host_group: Option<String>,

    /// Platform fault domain, exact match.
    pub fault_domain: Option<String>,
}

impl PlacementFilters {
    /// Returns true if the host group passes the group-level filters.
    pub fn admits_group(&self, group: &HostGroup) -> bool {
        self.location.as_deref().is_none_or(|l| group.location == l)
            && self
                .zone
                .as_deref()
                .is_none_or(|z| group.zone.as_deref() == Some(z))
            && self
                .resource_group
                .as_deref()
                .is_none_or(|rg| group.resource_group.eq_ignore_ascii_case(rg))
            && self
                .host_group
                .as_deref()
                .is_none_or(|name| group.name.eq_ignore_ascii_case(name))
    }

    /// Returns true if the host passes the host-level filters.
    pub fn admits_host(&self, host: &Host) -> bool {
        host.in_fault_domain(self.fault_domain.as_deref())
    }

    /// Resource group and host group a new host would go into.
    ///
    /// `None` unless both are set.
    pub fn target(&self) -> Option<(&str, &str)> {
        Some((self.resource_group.as_deref()?, self.host_group.as_deref()?))
    }
}

/// Which end of the score range wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorePreference {
    /// Highest score wins: tight packing on estimates, most headroom on
    /// provider capacity counts.
    #[default]
    Highest,

    /// Lowest positive score wins.
    Lowest,
}

impl ScorePreference {
    fn prefers(self, candidate: f64, best: f64) -> bool {
        match self {
            Self::Highest => candidate > best,
            Self::Lowest => candidate < best,
        }
    }
}

/// A host that can take the VM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub host_id: String,
    pub host_name: String,
    pub host_group: String,
    pub score: f64,
}

/// Outcome of a placement request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlacementResult {
    /// Place the VM on an existing host.
    PlacedOn {
        host_id: String,
        host_name: String,
        host_group: String,
        score: f64,
    },

    /// No existing host fits; a new host of this SKU is needed.
    CreateHostRequired {
        host_sku: String,
        resource_group: String,
        host_group: String,
        location: Option<String>,
        zone: Option<String>,
    },
}

/// Score every eligible host, in scan order. Hosts scoring 0 are dropped.
pub fn candidates(
    cache: &HostCache,
    filters: &PlacementFilters,
    vm_size: &str,
    catalog: &Catalog,
) -> Result<Vec<Candidate>, PlacementError> {
    let mut found = Vec::new();

    for group in cache.groups() {
        if !filters.admits_group(group) {
            debug!(host_group = %group.name, "Host group filtered out");
            continue;
        }

        for host in group.hosts.values() {
            if !filters.admits_host(host) {
                debug!(host = %host.name, fault_domain = %host.fault_domain, "Host filtered out");
                continue;
            }

            let value = score(host, vm_size, catalog)?;
            debug!(host = %host.name, vm_size, score = value, "Scored host");
            if value > 0.0 {
                found.push(Candidate {
                    host_id: host.id.clone(),
                    host_name: host.name.clone(),
                    host_group: group.name.clone(),
                    score: value,
                });
            }
        }
    }

    Ok(found)
}

/// Recommend a host for one VM of `vm_size`.
///
/// Never mutates the cache. Running out of room is a normal outcome
/// ([`PlacementResult::CreateHostRequired`]), not an error.
#[instrument(skip(cache, catalog))]
pub fn recommend(
    cache: &HostCache,
    filters: &PlacementFilters,
    vm_size: &str,
    catalog: &Catalog,
    preference: ScorePreference,
) -> Result<PlacementResult, PlacementError> {
    let mut best: Option<Candidate> = None;
    for candidate in candidates(cache, filters, vm_size, catalog)? {
        match &best {
            Some(current) if !preference.prefers(candidate.score, current.score) => {}
            _ => best = Some(candidate),
        }
    }

    if let Some(best) = best {
        info!(host = %best.host_name, score = best.score, "Selected host");
        return Ok(PlacementResult::PlacedOn {
            host_id: best.host_id,
            host_name: best.host_name,
            host_group: best.host_group,
            score: best.score,
        });
    }

    let host_sku = catalog
        .host_sku_supporting(vm_size)
        .ok_or_else(|| PlacementError::UnsupportedVmSize(vm_size.to_string()))?;

    let Some((resource_group, host_group)) = filters.target() else {
        return Err(PlacementError::MissingTarget {
            vm_size: vm_size.to_string(),
            host_sku: host_sku.to_string(),
        });
    };

    info!(host_sku, %resource_group, %host_group, "No host fits; a new host is required");
    Ok(PlacementResult::CreateHostRequired {
        host_sku: host_sku.to_string(),
        resource_group: resource_group.to_string(),
        host_group: host_group.to_string(),
        location: filters.location.clone(),
        zone: filters.zone.clone(),
    })
}
