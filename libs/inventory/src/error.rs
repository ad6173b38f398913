//! Error types for inventory construction, utilization and snapshots.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the utilization calculator.
///
/// Both variants are data-integrity failures: the inventory references a SKU
/// the catalog does not know, so capacity cannot be computed safely.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UtilizationError {
    /// The host's SKU is absent from the catalog.
    #[error("host '{host}' has unknown SKU '{sku}'")]
    UnknownSku { host: String, sku: String },

    /// A VM on the host has a size absent from the catalog.
    #[error("VM '{vm}' on host '{host}' has unknown size '{size}'")]
    UnknownVmSize {
        host: String,
        vm: String,
        size: String,
    },
}

/// Errors while building the inventory skeleton from raw records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No resource group could be derived for a resource.
    #[error("cannot determine resource group for '{0}'")]
    MissingResourceGroup(String),
}

/// Errors from a full inventory refresh.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The inventory source failed.
    #[error("inventory source error: {0:#}")]
    Source(#[from] anyhow::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Utilization(#[from] UtilizationError),
}

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No snapshot has been written yet.
    #[error("no inventory snapshot at {0}")]
    Missing(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The snapshot was written by an incompatible version.
    #[error("snapshot format version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
}
