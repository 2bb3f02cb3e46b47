//! Wire types exchanged with the registration service.
//!
//! Field names follow the service's camelCase JSON.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A registration record as returned by the verify and list endpoints.
///
/// Only `poseidonHash` and `isRegistered` are guaranteed; a not-found
/// verify answer carries nothing else, so every other field is defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Service-assigned identity.
    #[serde(default)]
    pub id: u64,
    /// Original file name.
    #[serde(default)]
    pub filename: String,
    /// MIME-like label; may be empty.
    #[serde(default)]
    pub file_type: String,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,
    /// Content fingerprint, `0x`-prefixed hex.
    pub poseidon_hash: String,
    /// Registered author address, `0x`-prefixed hex.
    #[serde(default)]
    pub author_address: Option<String>,
    /// Ledger transaction hash, once known.
    #[serde(default)]
    pub starknet_tx_hash: Option<String>,
    /// Registration timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Whether a hash→author binding exists.
    #[serde(rename = "isRegistered", alias = "registered")]
    pub is_registered: bool,
    /// Explorer link for the transaction, present only with a tx hash.
    #[serde(default)]
    pub starknet_explorer_url: Option<String>,
}

impl FileRecord {
    /// Drop the fields that carry no meaning for an unregistered hash.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if !self.is_registered {
            self.author_address = None;
            self.starknet_tx_hash = None;
            self.created_at = None;
            self.starknet_explorer_url = None;
        }
        self
    }
}

/// Response of a successful upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// Service-assigned identity.
    #[serde(default)]
    pub id: u64,
    /// Original file name.
    #[serde(default)]
    pub filename: String,
    /// MIME-like label; may be empty.
    #[serde(default)]
    pub file_type: String,
    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,
    /// Content fingerprint computed by the service.
    pub poseidon_hash: String,
    /// Author the hash is now bound to.
    pub author_address: String,
    /// Ledger transaction hash, if the registration was submitted.
    #[serde(default)]
    pub starknet_tx_hash: Option<String>,
    /// Registration timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Human-readable status message.
    #[serde(default)]
    pub message: String,
}

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Service status, `UP` when healthy.
    pub status: String,
    /// Service name.
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    /// Whether the service reports itself as up.
    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name sent with the multipart part.
    pub name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadFile {
    /// Create a new upload file.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: Option<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type,
            data: data.into(),
        }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: &std::path::Path) -> crate::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, None, data))
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}
