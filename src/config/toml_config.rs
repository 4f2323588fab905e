use crate::config::{validate_provider, StorageSettings};
use crate::domain::model::{RunMode, SaveFormat, APP_NAME};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_required_field, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// A job described in a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub app: AppConfig,
    pub source: SourceConfig,
    pub sink: SinkConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: Option<String>,
    pub skip_header: Option<bool>,
    pub infer_schema: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    pub path: Option<String>,
    pub format: Option<SaveFormat>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    pub mode: Option<RunMode>,
    pub partitions: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading job file {}", path.display());
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::substitute_env_vars(content);

        toml::from_str(&expanded).map_err(|e| EtlError::ConfigValidationError {
            field: "job file".to_string(),
            message: e.to_string(),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables are left verbatim.
    fn substitute_env_vars(content: &str) -> String {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().is_some_and(|m| m.enabled)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn app_name(&self) -> &str {
        self.app.name.as_deref().unwrap_or(APP_NAME)
    }

    fn input_path(&self) -> &str {
        self.source.path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        self.sink.path.as_deref().unwrap_or_default()
    }

    fn save_format(&self) -> SaveFormat {
        self.sink.format.unwrap_or(SaveFormat::Parquet)
    }

    fn mode(&self) -> RunMode {
        self.execution.mode.unwrap_or(RunMode::Both)
    }

    fn partitions(&self) -> usize {
        self.execution.partitions.unwrap_or(2)
    }

    fn skip_header(&self) -> bool {
        self.source.skip_header.unwrap_or(true)
    }

    fn infer_schema(&self) -> bool {
        self.source.infer_schema.unwrap_or(true)
    }

    fn storage_settings(&self) -> &StorageSettings {
        &self.storage
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_required_field("source.path", &self.source.path)?;
        validate_required_field("sink.path", &self.sink.path)?;
        validate_provider(self)
    }
}
