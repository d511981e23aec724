//! Upload storage service
//!
//! Files are written under the configured root directory and addressed by a
//! public URL of the form `{base}/{bucket}/{folder}/{owner}/{millis}.{ext}`.

use std::path::PathBuf;
use chrono::Utc;
use tracing::{debug, info};
use crate::config::StorageConfig;
use crate::utils::errors::{KarmaHubError, Result};
use crate::utils::helpers::{file_extension, sanitize_path_component};

pub const SELFIE_BUCKET: &str = "event-selfies";
pub const CERTIFICATE_BUCKET: &str = "event-certificates";
pub const REGISTRATION_BUCKET: &str = "event-registrations";
pub const LISTING_BUCKET: &str = "listing-images";

/// A file received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageService {
    config: StorageConfig,
}

impl StorageService {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn root_dir(&self) -> &str {
        &self.config.root_dir
    }

    /// Check size and extension; returns the normalized extension
    pub fn validate(&self, file: &UploadedFile) -> Result<String> {
        if file.bytes.is_empty() {
            return Err(KarmaHubError::InvalidInput("Uploaded file is empty".to_string()));
        }
        if file.bytes.len() > self.config.max_upload_bytes {
            return Err(KarmaHubError::InvalidInput(format!(
                "Uploaded file exceeds the {} byte limit",
                self.config.max_upload_bytes
            )));
        }

        let ext = file_extension(&file.filename).ok_or_else(|| {
            KarmaHubError::InvalidInput(format!("File '{}' has no usable extension", file.filename))
        })?;
        if !self.config.allowed_extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)) {
            return Err(KarmaHubError::InvalidInput(format!("File type '.{}' is not allowed", ext)));
        }

        Ok(ext)
    }

    /// Store a file and return its public URL
    pub async fn store(&self, bucket: &str, folder: &str, owner: &str, file: &UploadedFile) -> Result<String> {
        let ext = self.validate(file)?;

        let bucket = sanitize_path_component(bucket);
        let folder = sanitize_path_component(folder);
        let owner = sanitize_path_component(owner);
        let name = format!("{}.{}", Utc::now().timestamp_millis(), ext);

        let dir: PathBuf = [self.config.root_dir.as_str(), &bucket, &folder, &owner].iter().collect();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(&name);
        tokio::fs::write(&path, &file.bytes).await?;

        debug!(path = %path.display(), bytes = file.bytes.len(), "Upload written");

        let url = format!(
            "{}/{}/{}/{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            bucket,
            folder,
            owner,
            name
        );
        info!(url = %url, "File stored");
        Ok(url)
    }
}
