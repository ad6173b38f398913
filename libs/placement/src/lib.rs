//! VM placement on dedicated hosts.
//!
//! - **Score**: how well one VM size fits one host ([`score`]).
//! - **Select**: best host across the inventory under filters, or the host
//!   SKU to create when nothing fits ([`recommend`]).
//! - **Provision**: validate and expand host creation requests and hand them
//!   to a [`HostProvisioner`].
//!
//! Everything here is a pure function of an inventory snapshot and the
//! catalog, apart from [`provision`], which delegates to the provisioner.
//! Recommendations are best effort: nothing is reserved, so two callers
//! acting on the same snapshot may race for a host's last slot.

mod error;
mod provision;
mod score;
mod select;

pub use error::{PlacementError, ProvisionError, ScoreError};
pub use provision::{provision, CreateHostRequest, HostProvisioner, HostToCreate};
pub use score::{estimate, score};
pub use select::{
    candidates, recommend, Candidate, PlacementFilters, PlacementResult, ScorePreference,
};
