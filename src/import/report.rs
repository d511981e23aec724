//! Import results and credential files

use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::utils::errors::{KarmaHubError, Result};

pub const RESULTS_PREFIX: &str = "import-results-";
pub const CREDENTIALS_PREFIX: &str = "user-credentials-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSuccess {
    pub row: usize,
    pub email: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportFailure {
    pub row: usize,
    pub email: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSkip {
    pub row: usize,
    pub email: Option<String>,
    pub reason: String,
}

/// Outcome of one import run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResults {
    pub success: Vec<ImportSuccess>,
    pub failed: Vec<ImportFailure>,
    pub skipped: Vec<ImportSkip>,
}

/// Files written for a finished run
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub results_file: PathBuf,
    pub credentials_file: Option<PathBuf>,
}

/// Timestamp usable in file names: ISO 8601 with `:` and `.` replaced
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

impl ImportResults {
    pub fn total(&self) -> usize {
        self.success.len() + self.failed.len() + self.skipped.len()
    }

    /// Plain-text credential sheet for the created accounts
    pub fn credentials_text(&self) -> String {
        let mut text = String::from("CAMPUS KARMA HUB - USER CREDENTIALS\n");
        text.push_str(&"=".repeat(60));
        text.push_str("\n\n");
        for user in &self.success {
            text.push_str(&format!("Email: {}\n", user.email));
            text.push_str(&format!("Password: {}\n", user.password));
            text.push_str(&format!("User ID: {}\n", user.user_id));
            if let Some(warning) = &user.warning {
                text.push_str(&format!("Warning: {}\n", warning));
            }
            text.push_str(&"-".repeat(60));
            text.push('\n');
        }
        text
    }

    /// Write the results JSON and, when anything succeeded, the credentials file
    pub fn write(&self, dir: &Path, at: DateTime<Utc>) -> Result<WrittenReport> {
        fs::create_dir_all(dir)?;
        let stamp = file_timestamp(at);

        let results_file = dir.join(format!("{}{}.json", RESULTS_PREFIX, stamp));
        fs::write(&results_file, serde_json::to_string_pretty(self)?)?;

        let credentials_file = if self.success.is_empty() {
            None
        } else {
            let path = dir.join(format!("{}{}.txt", CREDENTIALS_PREFIX, stamp));
            fs::write(&path, self.credentials_text())?;
            Some(path)
        };

        Ok(WrittenReport { results_file, credentials_file })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Newest `import-results-*.json` in a directory, by file name
pub fn latest_results_file(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(RESULTS_PREFIX) && n.ends_with(".json"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.pop().ok_or_else(|| {
        KarmaHubError::InvalidInput(format!("No {}*.json file found in {}", RESULTS_PREFIX, dir.display()))
    })
}
