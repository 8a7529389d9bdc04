//! Configuration management with validation and defaults
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables. Command-line flags go through `ConfigLoader::load_with` so they
//! are in place before validation.

use crate::common::types::HashEncoding;
use crate::errors::{ConfigurationError, VerifyResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Blocks between progress diagnostics
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
}

/// Where the block store lives and how it encodes hashes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_directory: String,
    pub hash_encoding: HashEncoding,
    /// Verification never writes, so a missing database is an error by default
    pub create_if_missing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_directory: "./blockchain_data".to_string(),
            hash_encoding: HashEncoding::Binary,
            create_if_missing: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub progress_interval: u64,
    /// Only verify this chain when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            chain_id: None,
        }
    }
}

impl VerifyConfig {
    pub fn validate(&self) -> VerifyResult<()> {
        if self.storage.data_directory.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                field: "storage.data_directory".to_string(),
                value: self.storage.data_directory.clone(),
                reason: "Data directory cannot be empty".to_string(),
            }
            .into());
        }

        if self.verification.progress_interval == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "verification.progress_interval".to_string(),
                value: "0".to_string(),
                reason: "Progress interval cannot be zero".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Configuration loader with environment variable support
#[derive(Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables
    pub fn load(&self) -> VerifyResult<VerifyConfig> {
        self.load_with(|_| {})
    }

    /// Like `load`, but `overrides` runs before validation
    pub fn load_with<F>(&self, overrides: F) -> VerifyResult<VerifyConfig>
    where
        F: FnOnce(&mut VerifyConfig),
    {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            VerifyConfig::default()
        };

        apply_env_overrides(&mut config, |key| env::var(key).ok())?;
        overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> VerifyResult<VerifyConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e))
        })?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, config: &VerifyConfig, path: P) -> VerifyResult<()> {
        let content = toml::to_string_pretty(config)?;
        std::fs::write(path.as_ref(), content).map_err(|e| {
            ConfigurationError::SaveFailed(format!(
                "Failed to write {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(())
    }
}

/// Apply `MERKLE_VERIFY_*` overrides read through `lookup`
fn apply_env_overrides<F>(config: &mut VerifyConfig, lookup: F) -> VerifyResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(data_dir) = lookup("MERKLE_VERIFY_DATA_DIR") {
        config.storage.data_directory = data_dir;
    }

    if let Some(encoding) = lookup("MERKLE_VERIFY_HASH_ENCODING") {
        config.storage.hash_encoding =
            encoding
                .parse()
                .map_err(|reason| ConfigurationError::InvalidValue {
                    field: "MERKLE_VERIFY_HASH_ENCODING".to_string(),
                    value: encoding.clone(),
                    reason,
                })?;
    }

    if let Some(interval) = lookup("MERKLE_VERIFY_PROGRESS_INTERVAL") {
        config.verification.progress_interval =
            interval
                .parse()
                .map_err(|_| ConfigurationError::InvalidValue {
                    field: "MERKLE_VERIFY_PROGRESS_INTERVAL".to_string(),
                    value: interval.clone(),
                    reason: "Invalid block count".to_string(),
                })?;
    }

    Ok(())
}
