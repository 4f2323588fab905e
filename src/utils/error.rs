use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Malformed trip record: expected {expected} fields, found {found} in line {line:?}")]
    MalformedRecord {
        expected: usize,
        found: usize,
        line: String,
    },

    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Unsupported save format '{format}' for {target}")]
    UnsupportedFormat { format: String, target: String },

    #[error("Storage error at '{location}': {message}")]
    Storage { location: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Input is not valid UTF-8: {0}")]
    EncodingError(#[from] std::string::FromUtf8Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Storage,
    Encoding,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::MalformedRecord { .. } | EtlError::EncodingError(_) => ErrorCategory::Input,
            EtlError::Storage { .. } | EtlError::IoError(_) => ErrorCategory::Storage,
            EtlError::Schema { .. }
            | EtlError::ArrowError(_)
            | EtlError::ParquetError(_)
            | EtlError::SerializationError(_) => ErrorCategory::Encoding,
            EtlError::UnsupportedFormat { .. }
            | EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Storage => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Encoding | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Processing => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::MalformedRecord { .. } => {
                "Check that every data line has 11 comma-separated fields and that no field contains a comma"
            }
            EtlError::EncodingError(_) => "Re-encode the input file as UTF-8",
            EtlError::Schema { .. } => {
                "Check the input header names and pass a 9-column header when writing parquet"
            }
            EtlError::UnsupportedFormat { .. } => "Use one of: csv, txt, parquet (tables: csv, parquet)",
            EtlError::Storage { .. } => {
                "Verify the object-store endpoint, bucket name and AWS_* credential variables"
            }
            EtlError::IoError(_) => "Check that the input file exists and the output folder is writable",
            EtlError::ArrowError(_) | EtlError::ParquetError(_) => {
                "Inspect the input for inconsistent column values"
            }
            EtlError::SerializationError(_) => "Report output could not be serialized; rerun without --json-report",
            EtlError::ConfigError { .. }
            | EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => "Review the command-line flags or the TOML job file",
            EtlError::ProcessingError { .. } => "Rerun the job; a worker task failed unexpectedly",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MalformedRecord { found, .. } => {
                format!("A trip line had only {} fields; the job was stopped", found)
            }
            EtlError::Storage { location, .. } => format!("Could not access storage at {}", location),
            EtlError::UnsupportedFormat { format, .. } => {
                format!("'{}' is not a supported output format", format)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
