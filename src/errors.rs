//! Error types for the Merkle verifier
//!
//! Mismatches found while verifying are diagnostics, not errors. Everything
//! in here aborts a run.

use crate::common::types::HashDecodeError;
use std::error::Error as StdError;
use std::fmt;

/// Root error type for all verifier operations
#[derive(Debug)]
pub enum VerifyError {
    /// Configuration related errors
    Configuration(ConfigurationError),

    /// Block store errors
    Storage(StorageError),
}

/// Configuration and validation errors
#[derive(Debug)]
pub enum ConfigurationError {
    InvalidValue { field: String, value: String, reason: String },
    LoadFailed(String),
    SaveFailed(String),
}

/// Block store errors
#[derive(Debug)]
pub enum StorageError {
    DatabaseOpenFailed(String),
    ReadFailed(String),
    WriteFailed(String),
    CorruptedData(String),
    InvalidHash { expected: usize, actual: usize },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Configuration(e) => write!(f, "Configuration error: {}", e),
            VerifyError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
            ConfigurationError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
            ConfigurationError::SaveFailed(msg) => write!(f, "Failed to save configuration: {}", msg),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseOpenFailed(msg) => write!(f, "Database open failed: {}", msg),
            StorageError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            StorageError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            StorageError::CorruptedData(msg) => write!(f, "Corrupted data: {}", msg),
            StorageError::InvalidHash { expected, actual } => {
                write!(f, "Invalid hash length: expected {} bytes, got {}", expected, actual)
            }
        }
    }
}

impl StdError for VerifyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            VerifyError::Configuration(e) => Some(e),
            VerifyError::Storage(e) => Some(e),
        }
    }
}

impl StdError for ConfigurationError {}
impl StdError for StorageError {}

impl From<ConfigurationError> for VerifyError {
    fn from(e: ConfigurationError) -> Self {
        VerifyError::Configuration(e)
    }
}

impl From<StorageError> for VerifyError {
    fn from(e: StorageError) -> Self {
        VerifyError::Storage(e)
    }
}

impl From<HashDecodeError> for VerifyError {
    fn from(e: HashDecodeError) -> Self {
        match e {
            HashDecodeError::Length { expected, actual } => {
                VerifyError::Storage(StorageError::InvalidHash { expected, actual })
            }
            HashDecodeError::Hex(msg) => VerifyError::Storage(StorageError::CorruptedData(msg)),
        }
    }
}

// External error conversions
impl From<rocksdb::Error> for VerifyError {
    fn from(e: rocksdb::Error) -> Self {
        VerifyError::Storage(StorageError::ReadFailed(e.to_string()))
    }
}

impl From<bincode::Error> for VerifyError {
    fn from(e: bincode::Error) -> Self {
        VerifyError::Storage(StorageError::CorruptedData(e.to_string()))
    }
}

impl From<toml::de::Error> for VerifyError {
    fn from(e: toml::de::Error) -> Self {
        VerifyError::Configuration(ConfigurationError::LoadFailed(e.to_string()))
    }
}

impl From<toml::ser::Error> for VerifyError {
    fn from(e: toml::ser::Error) -> Self {
        VerifyError::Configuration(ConfigurationError::SaveFailed(e.to_string()))
    }
}

/// Convenience type alias for Results
pub type VerifyResult<T> = Result<T, VerifyError>;
