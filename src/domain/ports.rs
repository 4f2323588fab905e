use crate::config::StorageSettings;
use crate::domain::model::{PipelineKind, RunMode, SaveFormat};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn app_name(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn save_format(&self) -> SaveFormat;
    fn mode(&self) -> RunMode;
    fn partitions(&self) -> usize;
    /// Drop the first line of partition 0.
    fn skip_header(&self) -> bool;
    fn infer_schema(&self) -> bool;
    fn storage_settings(&self) -> &StorageSettings;

    /// With `RunMode::Both` each pipeline writes to its own sub-folder.
    fn output_folder(&self, kind: PipelineKind) -> String {
        match self.mode() {
            RunMode::Both => format!(
                "{}/{}",
                self.output_path().trim_end_matches('/'),
                kind.folder_name()
            ),
            _ => self.output_path().to_string(),
        }
    }
}

pub trait RowCount {
    fn row_count(&self) -> usize;
}

pub trait Preview {
    /// Human-readable rendering of at most `limit` rows.
    fn preview(&self, limit: usize) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub output_path: String,
    pub files: Vec<String>,
    pub rows: usize,
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: RowCount + Send;
    type Transformed: RowCount + Preview + Send + Sync;

    fn name(&self) -> &'static str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, data: &Self::Transformed) -> Result<WriteSummary>;
}
