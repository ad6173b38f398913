//! Inventory refresh: pull records from a source and build a [`HostCache`].

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use hostfit_catalog::Catalog;
use tracing::{debug, info, instrument};

use crate::build::{HostGroupRecord, HostRecord, VmRecord};
use crate::error::RefreshError;
use crate::model::{Host, HostCache, HostGroup};

/// Which part of the fleet a refresh covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshScope {
    /// Limit to one resource group; the whole subscription otherwise.
    pub resource_group: Option<String>,

    /// Limit to one host group (matched by name, case-insensitive).
    pub host_group: Option<String>,
}

impl RefreshScope {
    /// Returns true if the host group record is inside this scope.
    pub fn includes(&self, record: &HostGroupRecord) -> bool {
        self.host_group
            .as_deref()
            .is_none_or(|name| record.name.eq_ignore_ascii_case(name))
    }
}

/// Provider of raw inventory records.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// List host groups in scope.
    async fn host_groups(&self, scope: &RefreshScope) -> Result<Vec<HostGroupRecord>>;

    /// List hosts of one host group.
    async fn hosts(&self, group: &HostGroup) -> Result<Vec<HostRecord>>;

    /// Fetch the allocatable VM count per size for one host.
    async fn allocatable_capacity(
        &self,
        group: &HostGroup,
        host: &HostRecord,
    ) -> Result<BTreeMap<String, u32>>;

    /// List VM details in scope.
    async fn vm_details(&self, scope: &RefreshScope) -> Result<Vec<VmRecord>>;
}

/// Build a fully resolved cache from an inventory source.
#[instrument(skip(source, catalog))]
pub async fn refresh<S>(
    source: &S,
    scope: &RefreshScope,
    catalog: &Catalog,
) -> Result<HostCache, RefreshError>
where
    S: InventorySource + ?Sized,
{
    let mut cache = HostCache::new();
    let mut capacities = Vec::new();

    // Phase one: skeleton
    for record in source.host_groups(scope).await? {
        if !scope.includes(&record) {
            debug!(host_group = %record.name, "Host group outside scope");
            continue;
        }

        let mut group = HostGroup::from_record(&record)?;
        let hosts = source.hosts(&group).await?;
        debug!(
            host_group = %group.name,
            location = %group.location,
            zone = group.zone.as_deref().unwrap_or("-"),
            host_count = hosts.len(),
            "Listed hosts"
        );

        let fetches = hosts
            .iter()
            .map(|host| source.allocatable_capacity(&group, host));
        let host_capacities = try_join_all(fetches).await?;

        for (record, capacity) in hosts.iter().zip(host_capacities) {
            let host = Host::from_record(record, &group);
            capacities.push((host.id.clone(), capacity));
            group.insert_host(host);
        }

        cache.insert_group(group);
    }

    // Phase two: resolution
    let vms = source.vm_details(scope).await?;
    let resolved = cache.apply_vm_details(vms);
    for (host_id, capacity) in capacities {
        cache.apply_allocatable_capacity(&host_id, capacity);
    }

    cache.recompute_utilization(catalog)?;

    info!(
        host_groups = cache.host_groups.len(),
        hosts = cache.host_count(),
        vms = cache.vm_count(),
        resolved_vms = resolved,
        "Inventory refreshed"
    );

    Ok(cache)
}
