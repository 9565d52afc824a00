use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Remote catalog returned {status} for {path}")]
    RemoteError { status: StatusCode, path: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Remote,
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::RemoteError { .. } => ErrorCategory::Remote,
            ImportError::HttpError(_) => ErrorCategory::Network,
            ImportError::SerializationError(_)
            | ImportError::CsvError(_)
            | ImportError::ProcessingError { .. } => ErrorCategory::Data,
            ImportError::ZipError(_) | ImportError::IoError(_) => ErrorCategory::Storage,
            ImportError::ConfigError { .. }
            | ImportError::MissingConfigError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 5xx 與連線錯誤通常可重跑
            ImportError::RemoteError { status, .. } if status.is_server_error() => {
                ErrorSeverity::Medium
            }
            ImportError::HttpError(_) => ErrorSeverity::Medium,
            ImportError::RemoteError { .. } => ErrorSeverity::High,
            ImportError::SerializationError(_)
            | ImportError::CsvError(_)
            | ImportError::ProcessingError { .. } => ErrorSeverity::High,
            ImportError::ZipError(_) | ImportError::IoError(_) => ErrorSeverity::Critical,
            ImportError::ConfigError { .. }
            | ImportError::MissingConfigError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::ConfigValidationError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ImportError::RemoteError { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                "Check that TMDB_API_KEY (or --api-key) holds a valid TMDb v3 key".to_string()
            }
            ImportError::RemoteError { status, .. } if *status == StatusCode::NOT_FOUND => {
                "The requested resource does not exist upstream; check the base URL".to_string()
            }
            ImportError::RemoteError { .. } | ImportError::HttpError(_) => {
                "Retry the import later; the catalog API may be unavailable".to_string()
            }
            ImportError::SerializationError(_) => {
                "The catalog API returned an unexpected payload shape".to_string()
            }
            ImportError::CsvError(_) | ImportError::ZipError(_) | ImportError::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            ImportError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            ImportError::InvalidConfigValueError { field, .. }
            | ImportError::ConfigValidationError { field, .. } => {
                format!("Fix the value of '{}' and run again", field)
            }
            ImportError::ConfigError { .. } => "Review the configuration file".to_string(),
            ImportError::ProcessingError { .. } => {
                "Run with --verbose to see which record failed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Remote => format!("Catalog API rejected the request: {}", self),
            ErrorCategory::Network => format!("Could not reach the catalog API: {}", self),
            ErrorCategory::Data => format!("Could not process imported data: {}", self),
            ErrorCategory::Storage => format!("Could not write the import output: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
