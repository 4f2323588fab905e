pub mod cli;
#[cfg(feature = "s3")]
pub mod s3;
pub mod toml_config;

use crate::adapters::location::Location;
use crate::domain::model::{PipelineKind, RunMode, SaveFormat};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "cli")]
use crate::domain::model::APP_NAME;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_S3_ENDPOINT: &str = "http://localhost:4566";
pub const DEFAULT_S3_REGION: &str = "us-east-1";
pub const MAX_PARTITIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsProvider {
    /// AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY / AWS_SESSION_TOKEN only.
    Environment,
    /// The SDK's default provider chain.
    Default,
}

impl FromStr for CredentialsProvider {
    type Err = EtlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" | "env" => Ok(CredentialsProvider::Environment),
            "default" => Ok(CredentialsProvider::Default),
            _ => Err(EtlError::InvalidConfigValueError {
                field: "storage.credentials_provider".to_string(),
                value: s.to_string(),
                reason: "Expected one of: environment, default".to_string(),
            }),
        }
    }
}

impl fmt::Display for CredentialsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialsProvider::Environment => f.write_str("environment"),
            CredentialsProvider::Default => f.write_str("default"),
        }
    }
}

/// Object-store connection parameters, set once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
#[serde(default)]
pub struct StorageSettings {
    #[cfg_attr(feature = "cli", arg(long = "s3-endpoint", default_value = DEFAULT_S3_ENDPOINT))]
    pub endpoint: String,

    #[cfg_attr(feature = "cli", arg(long = "s3-region", default_value = DEFAULT_S3_REGION))]
    pub region: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "environment"))]
    pub credentials_provider: CredentialsProvider,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_S3_ENDPOINT.to_string(),
            region: DEFAULT_S3_REGION.to_string(),
            credentials_provider: CredentialsProvider::Environment,
        }
    }
}

/// Checks shared by every `ConfigProvider`.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("app_name", config.app_name())?;
    validate_path("input", config.input_path())?;
    validate_path("output", config.output_path())?;
    Location::parse(config.input_path())?;
    Location::parse(config.output_path())?;

    validate_range("partitions", config.partitions(), 1, MAX_PARTITIONS)?;

    let settings = config.storage_settings();
    validate_url("storage.endpoint", &settings.endpoint)?;
    validate_non_empty_string("storage.region", &settings.region)?;

    if config.mode().runs(PipelineKind::Table) && config.save_format() == SaveFormat::Txt {
        return Err(EtlError::InvalidConfigValueError {
            field: "format".to_string(),
            value: SaveFormat::Txt.to_string(),
            reason: format!(
                "Table output supports csv and parquet only (mode is '{}')",
                config.mode()
            ),
        });
    }

    if config.mode() == RunMode::Both && config.output_path().trim_end_matches('/').is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: "output".to_string(),
            value: config.output_path().to_string(),
            reason: "Output root cannot be '/' when both pipelines run".to_string(),
        });
    }

    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "trip-events")]
#[command(about = "Split trip records into START/END event rows")]
pub struct CliConfig {
    /// Trip CSV location (local path or s3a:// URI)
    #[arg(long, default_value = "./trip.csv")]
    pub input: String,

    /// Output folder location
    #[arg(long, default_value = "./result")]
    pub output: String,

    /// Output format: csv, txt or parquet
    #[arg(long, default_value = "parquet")]
    pub format: SaveFormat,

    /// Which formulation to run: lines, table or both
    #[arg(long, default_value = "both")]
    pub mode: RunMode,

    #[arg(long, default_value = "2")]
    pub partitions: usize,

    /// Treat the first input line as data instead of a header
    #[arg(long)]
    pub keep_header: bool,

    /// Read every table column as text
    #[arg(long)]
    pub no_infer_schema: bool,

    #[arg(long, default_value = APP_NAME)]
    pub app_name: String,

    #[command(flatten)]
    pub storage: StorageSettings,

    /// Print the first rows of each result
    #[arg(long)]
    pub show: bool,

    /// Print the run reports as JSON on stdout
    #[arg(long)]
    pub json_report: bool,

    /// Load the job from a TOML file instead of flags
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn save_format(&self) -> SaveFormat {
        self.format
    }

    fn mode(&self) -> RunMode {
        self.mode
    }

    fn partitions(&self) -> usize {
        self.partitions
    }

    fn skip_header(&self) -> bool {
        !self.keep_header
    }

    fn infer_schema(&self) -> bool {
        !self.no_infer_schema
    }

    fn storage_settings(&self) -> &StorageSettings {
        &self.storage
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
