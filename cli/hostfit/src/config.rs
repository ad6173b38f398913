//! Configuration and credentials.
//!
//! Handles:
//! - ARM endpoints (public cloud by default, env overrides for other clouds)
//! - Snapshot and catalog locations
//! - Service principal credentials

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hostfit_catalog::Catalog;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CliError;

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Credentials file name, shared with other Azure tooling.
pub const CREDENTIALS_FILE: &str = "azurermconfig.json";

/// Snapshot file name inside the data directory.
const SNAPSHOT_FILE: &str = "snapshot.json";

/// One hour.
const DEFAULT_MAX_SNAPSHOT_AGE_SECS: u64 = 3600;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "hostfit", "hostfit")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

/// Azure endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Resource manager base URL.
    #[serde(default = "default_resource_manager")]
    pub resource_manager: String,

    /// Token authority.
    #[serde(default = "default_auth")]
    pub auth: String,

    /// Audience requested for ARM tokens.
    #[serde(default = "default_resource")]
    pub resource: String,
}

fn env_or(key: &str, fallback: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| fallback.to_string())
}

fn default_resource_manager() -> String {
    env_or("AZURE_RM_ENDPOINT", "https://management.azure.com")
}

fn default_auth() -> String {
    env_or("AZURE_AUTH_ENDPOINT", "https://login.microsoftonline.com/")
}

fn default_resource() -> String {
    env_or("AZURE_RESOURCE_ENDPOINT", "https://management.core.windows.net/")
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            resource_manager: default_resource_manager(),
            auth: default_auth(),
            resource: default_resource(),
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Endpoints,

    /// Where the inventory snapshot lives; the platform data dir otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    /// JSON catalog replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,

    /// Snapshots older than this trigger a warning.
    #[serde(default = "default_max_snapshot_age_secs")]
    pub max_snapshot_age_secs: u64,
}

fn default_max_snapshot_age_secs() -> u64 {
    DEFAULT_MAX_SNAPSHOT_AGE_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            snapshot_path: None,
            catalog_path: None,
            max_snapshot_age_secs: DEFAULT_MAX_SNAPSHOT_AGE_SECS,
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from a specific file, or return default if it is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Resolve the snapshot location, preferring an explicit override.
    pub fn snapshot_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit.or(self.snapshot_path.as_deref()) {
            return Ok(path.to_path_buf());
        }
        Ok(project_dirs()?.data_dir().join(SNAPSHOT_FILE))
    }

    pub fn max_snapshot_age(&self) -> chrono::Duration {
        let secs = i64::try_from(self.max_snapshot_age_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }

    /// Load the SKU catalog: the configured file, or the built-in table.
    pub fn catalog(&self) -> Result<Catalog> {
        let Some(path) = &self.catalog_path else {
            return Ok(Catalog::builtin());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        let catalog: Catalog = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog from {:?}", path))?;

        for (host_sku, vm_size) in catalog.dangling_compatibility() {
            warn!(host_sku, vm_size, "Host SKU lists a VM size missing from the catalog");
        }
        debug!(
            path = %path.display(),
            vm_sizes = catalog.vm_sizes().count(),
            host_skus = catalog.host_skus().count(),
            "Loaded catalog"
        );
        Ok(catalog)
    }
}

/// Service principal credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub tenant_id: String,
    pub app_id: String,
    pub app_secret: String,
    pub subscription_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

impl Credentials {
    /// Locate and load credentials.
    ///
    /// An explicit path must exist. Without one, the working directory is
    /// tried first, then the config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::MissingCredentials {
                    searched: vec![path.to_path_buf()],
                }
                .into());
            }
            return Self::load_from(path);
        }

        let searched = vec![PathBuf::from(CREDENTIALS_FILE), config_dir()?.join(CREDENTIALS_FILE)];
        match searched.iter().find(|p| p.exists()) {
            Some(path) => Self::load_from(path),
            None => Err(CliError::MissingCredentials { searched }.into()),
        }
    }

    /// Load credentials from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials from {:?}", path))?;

        let creds: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {:?}", path))?;

        debug!(path = %path.display(), subscription_id = %creds.subscription_id, "Loaded credentials");
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.endpoints.resource_manager.is_empty());
        assert_eq!(config.max_snapshot_age_secs, 3600);
        assert_eq!(config.max_snapshot_age(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{"snapshot_path": "/tmp/inv.json", "max_snapshot_age_secs": 60}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/inv.json")));
        assert_eq!(config.max_snapshot_age_secs, 60);
        assert_eq!(config.endpoints, Endpoints::default());
    }

    #[test]
    fn test_snapshot_path_prefers_explicit() {
        let config = Config {
            snapshot_path: Some(PathBuf::from("/from/config.json")),
            ..Config::default()
        };
        assert_eq!(
            config.snapshot_path(Some(Path::new("/from/flag.json"))).unwrap(),
            PathBuf::from("/from/flag.json")
        );
        assert_eq!(
            config.snapshot_path(None).unwrap(),
            PathBuf::from("/from/config.json")
        );
    }

    #[test]
    fn test_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let custom = Catalog::builder()
            .vm_size("Standard_X1", 1, 2)
            .host_sku("XSv1-Type1", 8, 16, &["Standard_X1"])
            .build();
        fs::write(&path, serde_json::to_string(&custom).unwrap()).unwrap();

        let config = Config {
            catalog_path: Some(path),
            ..Config::default()
        };
        assert_eq!(config.catalog().unwrap(), custom);
        assert_eq!(Config::default().catalog().unwrap(), Catalog::builtin());
    }

    #[test]
    fn test_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CREDENTIALS_FILE);
        fs::write(
            &path,
            r#"{"tenantId":"t","appId":"a","appSecret":"s3cret","subscriptionId":"sub"}"#,
        )
        .unwrap();

        let creds = Credentials::load(Some(&path)).unwrap();
        assert_eq!(creds.subscription_id, "sub");
        assert!(!format!("{creds:?}").contains("s3cret"));
    }

    #[test]
    fn test_explicit_credentials_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Credentials::load(Some(&dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingCredentials { .. })
        ));
    }
}
