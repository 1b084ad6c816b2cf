use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("{message}")]
    MissingInput { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Path escapes server root: {path}")]
    PathEscapesRoot { path: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("Extraction directory already exists: {path}")]
    ExtractionConflict { path: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller sent something unusable.
    Client,
    NotFound,
    Conflict,
    /// Filesystem or archive library failure while serving a request.
    Operational,
    Configuration,
}

impl ArchiveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ArchiveError::MissingInput { .. }
            | ArchiveError::InvalidRequest { .. }
            | ArchiveError::PathEscapesRoot { .. } => ErrorCategory::Client,
            ArchiveError::NotFound { .. } => ErrorCategory::NotFound,
            ArchiveError::ExtractionConflict { .. } => ErrorCategory::Conflict,
            ArchiveError::ZipError(_) | ArchiveError::IoError(_) | ArchiveError::TaskError(_) => {
                ErrorCategory::Operational
            }
            ArchiveError::ConfigError { .. }
            | ArchiveError::ConfigValidationError { .. }
            | ArchiveError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self.category() {
            ErrorCategory::Client => 400,
            ErrorCategory::NotFound => 404,
            ErrorCategory::Conflict => 409,
            ErrorCategory::Operational | ErrorCategory::Configuration => 500,
        }
    }

    pub fn missing_input(message: impl Into<String>) -> Self {
        ArchiveError::MissingInput {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        ArchiveError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ArchiveError::NotFound {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
