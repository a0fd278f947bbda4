//! Attachment storage configuration.

use serde::{Deserialize, Serialize};

/// File storage configuration for ticket attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which attachment files are stored.
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// Maximum accepted request body size in bytes (uploads included).
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_root: default_upload_root(),
            max_upload_size_bytes: default_max_upload_size(),
        }
    }
}

fn default_upload_root() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    25 * 1024 * 1024
}
