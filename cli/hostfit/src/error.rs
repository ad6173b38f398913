//! Error handling and display for the CLI.

use std::path::PathBuf;

use colored::Colorize;
use hostfit_inventory::{RefreshError, SnapshotError, UtilizationError};
use hostfit_placement::{PlacementError, ProvisionError, ScoreError};
use thiserror::Error;

/// Exit code for bad arguments and requests that cannot be satisfied.
pub const EXIT_USER_INPUT: i32 = 2;

/// Exit code for inventory data the catalog cannot account for.
pub const EXIT_DATA_INTEGRITY: i32 = 3;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("No Azure credentials found")]
    MissingCredentials { searched: Vec<PathBuf> },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("ARM error: {message}")]
    Arm {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an ARM error from response details.
    pub fn arm(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Arm {
            status,
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Map an error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(code) = classify(cause) {
            return code;
        }
    }
    1
}

fn classify(cause: &(dyn std::error::Error + 'static)) -> Option<i32> {
    if let Some(e) = cause.downcast_ref::<CliError>() {
        return matches!(e, CliError::InvalidInput(_)).then_some(EXIT_USER_INPUT);
    }
    if let Some(e) = cause.downcast_ref::<PlacementError>() {
        return Some(match e {
            PlacementError::UnsupportedVmSize(_) | PlacementError::MissingTarget { .. } => {
                EXIT_USER_INPUT
            }
            PlacementError::Score(_) => EXIT_DATA_INTEGRITY,
        });
    }
    if let Some(e) = cause.downcast_ref::<ProvisionError>() {
        return match e {
            ProvisionError::Provisioner { .. } => None,
            _ => Some(EXIT_USER_INPUT),
        };
    }
    if let Some(e) = cause.downcast_ref::<SnapshotError>() {
        return matches!(e, SnapshotError::Missing(_)).then_some(EXIT_USER_INPUT);
    }
    if let Some(e) = cause.downcast_ref::<RefreshError>() {
        return matches!(e, RefreshError::Utilization(_)).then_some(EXIT_DATA_INTEGRITY);
    }
    if cause.is::<UtilizationError>() || cause.is::<ScoreError>() {
        return Some(EXIT_DATA_INTEGRITY);
    }
    None
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    if let Some(hint) = err.chain().find_map(hint) {
        eprintln!("\n{}", hint.yellow());
    }
}

fn hint(cause: &(dyn std::error::Error + 'static)) -> Option<String> {
    if let Some(e) = cause.downcast_ref::<CliError>() {
        return match e {
            CliError::MissingCredentials { searched } => {
                let paths: Vec<String> = searched.iter().map(|p| p.display().to_string()).collect();
                Some(format!(
                    "Hint: Create a credentials file with tenantId, appId, appSecret and subscriptionId.\nSearched: {}",
                    paths.join(", ")
                ))
            }
            CliError::Auth(_) => {
                Some("Hint: Check the service principal id, secret and tenant.".to_string())
            }
            CliError::Arm { status: 401, .. } => {
                Some("Hint: The access token was rejected. Check the tenant and endpoints.".to_string())
            }
            CliError::Arm { status: 403, .. } => Some(
                "Hint: The service principal may not have permission for this operation.".to_string(),
            ),
            CliError::Network(_) => {
                Some("Hint: Check your network connection and AZURE_RM_ENDPOINT.".to_string())
            }
            _ => None,
        };
    }
    if let Some(SnapshotError::Missing(_) | SnapshotError::VersionMismatch { .. }) =
        cause.downcast_ref::<SnapshotError>()
    {
        return Some("Hint: Run `hostfit refresh` to build the inventory snapshot.".to_string());
    }
    if let Some(e) = cause.downcast_ref::<PlacementError>() {
        return match e {
            PlacementError::MissingTarget { .. } => Some(
                "Hint: Pass --resource-group and --host-group to get a host creation recommendation."
                    .to_string(),
            ),
            PlacementError::UnsupportedVmSize(_) => {
                Some("Hint: VM sizes are case-sensitive, e.g. Standard_D4s_v3.".to_string())
            }
            PlacementError::Score(_) => None,
        };
    }
    if cause.is::<UtilizationError>() {
        return Some(
            "Hint: Add the missing SKU or size to a catalog file and set catalog_path in the config."
                .to_string(),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let user = anyhow::Error::new(PlacementError::UnsupportedVmSize("x".to_string()));
        assert_eq!(exit_code(&user), EXIT_USER_INPUT);

        let missing = anyhow::Error::new(SnapshotError::Missing(PathBuf::from("/x")));
        assert_eq!(exit_code(&missing), EXIT_USER_INPUT);

        let integrity = anyhow::Error::new(RefreshError::Utilization(UtilizationError::UnknownSku {
            host: "h".to_string(),
            sku: "s".to_string(),
        }));
        assert_eq!(exit_code(&integrity), EXIT_DATA_INTEGRITY);

        let network = anyhow::Error::new(CliError::arm(500, "InternalError", "boom"));
        assert_eq!(exit_code(&network), 1);
    }

    #[test]
    fn test_exit_code_looks_through_context() {
        let err = anyhow::Error::new(ProvisionError::InvalidCount).context("create-host failed");
        assert_eq!(exit_code(&err), EXIT_USER_INPUT);
    }
}
