//! Host creation planning.
//!
//! The placement engine only decides that a host must be created and which
//! SKU it needs. The actual call goes through a [`HostProvisioner`].

use anyhow::Result;
use async_trait::async_trait;
use hostfit_catalog::Catalog;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::ProvisionError;

/// Length of the random suffix in generated host names.
const NAME_SUFFIX_LEN: usize = 6;

/// A request to grow a host group.
///
/// There is no zone: a host lands in the zone of its host group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateHostRequest {
    pub sku: String,
    pub location: String,
    pub resource_group: String,
    pub host_group: String,

    /// Explicit host name; generated from the host group name when absent.
    pub host_name: Option<String>,

    pub fault_domain: Option<u32>,

    /// Number of hosts to create.
    pub count: u32,
}

/// One host to be created by a provisioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostToCreate {
    pub name: String,
    pub sku: String,
    pub location: String,
    pub resource_group: String,
    pub host_group: String,
    pub fault_domain: Option<u32>,
}

impl CreateHostRequest {
    /// Check the request against the catalog.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), ProvisionError> {
        if self.location.is_empty() {
            return Err(ProvisionError::MissingTarget("location"));
        }
        if self.resource_group.is_empty() {
            return Err(ProvisionError::MissingTarget("resource group"));
        }
        if self.host_group.is_empty() {
            return Err(ProvisionError::MissingTarget("host group"));
        }
        if self.count == 0 {
            return Err(ProvisionError::InvalidCount);
        }
        if !catalog.contains_host_sku(&self.sku) {
            return Err(ProvisionError::UnknownHostSku(self.sku.clone()));
        }
        Ok(())
    }

    /// Names of the hosts this request creates.
    ///
    /// A single host keeps the base name; several get `-1`, `-2`, ...
    pub fn host_names(&self) -> Vec<String> {
        let base = self
            .host_name
            .clone()
            .unwrap_or_else(|| generated_name(&self.host_group));

        if self.count <= 1 {
            return vec![base];
        }
        (1..=self.count).map(|i| format!("{base}-{i}")).collect()
    }

    /// Expand into one [`HostToCreate`] per host.
    pub fn hosts(&self) -> Vec<HostToCreate> {
        self.host_names()
            .into_iter()
            .map(|name| HostToCreate {
                name,
                sku: self.sku.clone(),
                location: self.location.clone(),
                resource_group: self.resource_group.clone(),
                host_group: self.host_group.clone(),
                fault_domain: self.fault_domain,
            })
            .collect()
    }
}

fn generated_name(host_group: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{host_group}-{}", &id[id.len() - NAME_SUFFIX_LEN..])
}

/// Creates hosts in the cloud.
#[async_trait]
pub trait HostProvisioner: Send + Sync {
    /// Create one host and return its resource id.
    async fn create_host(&self, host: &HostToCreate) -> Result<String>;
}

/// Validate the request and create its hosts one by one.
///
/// Stops at the first failure; hosts created before it are not rolled back.
pub async fn provision<P>(
    provisioner: &P,
    catalog: &Catalog,
    request: &CreateHostRequest,
) -> Result<Vec<String>, ProvisionError>
where
    P: HostProvisioner + ?Sized,
{
    request.validate(catalog)?;

    let mut created = Vec::new();
    for host in request.hosts() {
        let id = provisioner
            .create_host(&host)
            .await
            .map_err(|source| ProvisionError::Provisioner {
                host_name: host.name.clone(),
                created: created.len(),
                source,
            })?;
        info!(host = %host.name, sku = %host.sku, host_group = %host.host_group, "Host created");
        created.push(id);
    }

    Ok(created)
}
