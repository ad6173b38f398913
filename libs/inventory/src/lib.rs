//! Dedicated host inventory.
//!
//! This crate holds the entity graph the placement engine works on:
//!
//! - **Model**: host groups own hosts, hosts own VMs ([`HostCache`]).
//! - **Utilization**: used and available cores/memory per host, derived from
//!   the VM list and the SKU catalog.
//! - **Build**: two-phase construction from provider records (skeleton first,
//!   then VM size and capacity resolution).
//! - **Refresh**: drives a full build from an [`InventorySource`].
//! - **Snapshot**: persists the cache between refresh and recommend.
//!
//! # Invariants
//!
//! - Capacity inputs are unsigned; only the derived `available_*` fields are
//!   signed, and they go negative on oversubscription instead of clamping.
//! - Recomputing utilization is idempotent.
//! - A snapshot round-trips every field of the cache.

mod build;
mod error;
mod model;
mod refresh;
mod snapshot;
mod utilization;

pub use build::{resource_group_from_id, HostGroupRecord, HostRecord, VmRecord};
pub use error::{BuildError, RefreshError, SnapshotError, UtilizationError};
pub use model::{normalize_vm_id, Host, HostCache, HostGroup, Utilization, Vm};
pub use refresh::{refresh, InventorySource, RefreshScope};
pub use snapshot::{Snapshot, SnapshotStore, SNAPSHOT_VERSION};
