//! Azure Resource Manager access: sign-in, REST client, and the inventory
//! and provisioning adapters built on it.

mod auth;
mod client;
mod provision;
mod source;

pub use auth::acquire_token;
pub use client::ArmClient;
pub use provision::ArmProvisioner;
pub use source::ArmInventorySource;
