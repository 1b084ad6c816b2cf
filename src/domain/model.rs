use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Body of a create-archive call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub archive_name: Option<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

/// Body of an extract-archive call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractRequest {
    pub archive_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    pub archive_path: PathBuf,
    /// `archive_path` relative to the server root.
    pub relative_path: String,
    pub file_count: usize,
}

impl ArchiveOutcome {
    pub fn message(&self) -> String {
        format!("Created archive with {} files", self.file_count)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub extract_dir: PathBuf,
    /// `extract_dir` relative to the server root.
    pub relative_path: String,
    /// Number of archive entries, directory entries included.
    pub entry_count: usize,
}

impl ExtractOutcome {
    pub fn message(&self) -> String {
        format!("Extracted {} files", self.entry_count)
    }
}

/// What extraction does when `<stem>_extracted` already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExtractConflictPolicy {
    /// Extract over the existing tree; entries present in the archive win.
    #[default]
    Merge,
    Fail,
    /// Delete the existing tree before extracting.
    Replace,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    pub success: bool,
    pub archive_path: String,
    pub message: String,
}

impl From<ArchiveOutcome> for ArchiveResponse {
    fn from(outcome: ArchiveOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message(),
            archive_path: outcome.relative_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub extract_path: String,
    pub message: String,
}

impl From<ExtractOutcome> for ExtractResponse {
    fn from(outcome: ExtractOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message(),
            extract_path: outcome.relative_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
