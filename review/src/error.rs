use std::path::PathBuf;

use shared::{SettingsError, UploadError};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid case payload in {path}: {source}")]
    CasePayload {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Unsupported config version {0}")]
    ConfigVersion(u32),
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("Upload rejected: {0}")]
    Upload(#[from] UploadError),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
