//! Error types for scoring, selection and host creation.

use hostfit_inventory::UtilizationError;
use thiserror::Error;

/// Errors from the allocation scorer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error(transparent)]
    Utilization(#[from] UtilizationError),
}

/// Errors from the placement selector.
///
/// "No capacity" is not an error: it is reported as
/// [`crate::PlacementResult::CreateHostRequired`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// No host SKU in the catalog can run the requested size.
    #[error("VM size '{0}' is not supported by any host SKU")]
    UnsupportedVmSize(String),

    /// A new host is needed but the request does not say where.
    #[error("no host can fit '{vm_size}'; a new {host_sku} host is needed but no target resource group and host group were given")]
    MissingTarget { vm_size: String, host_sku: String },

    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Errors from host creation.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The requested host SKU is not in the catalog.
    #[error("unsupported host SKU '{0}'")]
    UnknownHostSku(String),

    /// A required target field is empty.
    #[error("missing required parameter: {0}")]
    MissingTarget(&'static str),

    #[error("host count must be at least 1")]
    InvalidCount,

    /// The provisioner failed after creating `created` hosts.
    #[error("failed to create host '{host_name}' ({created} created before the failure): {source:#}")]
    Provisioner {
        host_name: String,
        created: usize,
        #[source]
        source: anyhow::Error,
    },
}
