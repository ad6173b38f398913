//! Error types for catalog lookups.

use thiserror::Error;

/// Errors returned by catalog lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The VM size is not present in the catalog.
    #[error("VM size not found in catalog: {0}")]
    VmSizeNotFound(String),

    /// The host SKU is not present in the catalog.
    #[error("host SKU not found in catalog: {0}")]
    HostSkuNotFound(String),
}
