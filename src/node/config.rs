use crate::error::{PermSetError, PermSetResult};
use crate::ingestion::ProvisioningMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for a PermSetNode deployment.
///
/// All values are deployment-time inputs; nothing here changes at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Path where the node stores its tables
    pub storage_path: PathBuf,
    /// Which ingestion pipeline this deployment runs
    pub provisioning_mode: ProvisioningMode,
    /// Name of the object-store bucket holding permission-set files
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Name of the primary metadata table
    #[serde(default = "default_metadata_table")]
    pub metadata_table: String,
    /// Name of the derived reference table
    #[serde(default = "default_reference_table")]
    pub reference_table: String,
    /// Designated caller principal; required in event mode for access-grant
    /// wiring
    #[serde(default)]
    pub caller_principal: Option<String>,
    /// Identifier of the metadata-store encryption key
    #[serde(default = "default_metadata_key_id")]
    pub metadata_key_id: String,
    /// Identifier of the log/notification encryption key
    #[serde(default = "default_log_key_id")]
    pub log_key_id: String,
    /// Bind address for the HTTP front door (API mode)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bucket() -> String {
    "permission-set-store".to_string()
}

fn default_metadata_table() -> String {
    "permission_sets".to_string()
}

fn default_reference_table() -> String {
    "permission_set_refs".to_string()
}

fn default_metadata_key_id() -> String {
    "metadata-store-key".to_string()
}

fn default_log_key_id() -> String {
    "log-key".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:9001".to_string()
}

impl NodeConfig {
    /// Create a configuration with the given storage path and mode,
    /// defaults everywhere else
    pub fn new(storage_path: PathBuf, provisioning_mode: ProvisioningMode) -> Self {
        Self {
            storage_path,
            provisioning_mode,
            bucket: default_bucket(),
            metadata_table: default_metadata_table(),
            reference_table: default_reference_table(),
            caller_principal: None,
            metadata_key_id: default_metadata_key_id(),
            log_key_id: default_log_key_id(),
            bind_address: default_bind_address(),
        }
    }

    /// Set the designated caller principal
    pub fn with_caller_principal(mut self, principal: impl Into<String>) -> Self {
        self.caller_principal = Some(principal.into());
        self
    }

    /// Replace only the port of the bind address, keeping the configured host
    pub fn override_port(&mut self, port: u16) {
        let new_address = match self.bind_address.rsplit_once(':') {
            Some((host, _)) => format!("{}:{}", host, port),
            None => format!("{}:{}", self.bind_address, port),
        };
        self.bind_address = new_address;
    }

    /// Checks the cross-field constraints that serde cannot express
    pub fn validate(&self) -> PermSetResult<()> {
        if self.provisioning_mode == ProvisioningMode::Event && self.caller_principal.is_none() {
            return Err(PermSetError::Config(
                "caller_principal is required in event mode for access-grant wiring".to_string(),
            ));
        }
        if self.bucket.is_empty() {
            return Err(PermSetError::Config("bucket cannot be empty".to_string()));
        }
        if self.metadata_table.is_empty() || self.reference_table.is_empty() {
            return Err(PermSetError::Config(
                "table names cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads a node configuration from a JSON file
pub fn load_node_config(path: &Path) -> PermSetResult<NodeConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| PermSetError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;
    let config: NodeConfig = serde_json::from_str(&contents)
        .map_err(|e| PermSetError::Config(format!("Failed to parse config {}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}
