use crate::domain::ports::{Pipeline, RowCount};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub pipeline: String,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_path: String,
    pub files_written: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// The report plus the transformed data, kept for previews and cross-checks.
pub struct RunOutput<T> {
    pub report: RunReport,
    pub data: T,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, enable_monitoring: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub async fn run(&self) -> Result<RunOutput<P::Transformed>> {
        let name = self.pipeline.name();
        let started_at = Utc::now();
        let timer = Instant::now();
        tracing::info!("🚀 Starting {} pipeline", name);
        self.monitor.log_stats("Start");

        let extracted = self.pipeline.extract().await?;
        let input_rows = extracted.row_count();
        tracing::info!("📥 [{}] Extracted {} trip records", name, input_rows);
        self.monitor.log_stats("Extract");

        let transformed = self.pipeline.transform(extracted).await?;
        let output_rows = transformed.row_count();
        tracing::info!("🔄 [{}] Split into {} event records", name, output_rows);
        if output_rows != input_rows * 2 {
            tracing::warn!(
                "[{}] expected {} event records for {} trips, got {}",
                name,
                input_rows * 2,
                input_rows,
                output_rows
            );
        }
        self.monitor.log_stats("Transform");

        let summary = self.pipeline.load(&transformed).await?;
        tracing::info!(
            "💾 [{}] Wrote {} files to {}",
            name,
            summary.files.len(),
            summary.output_path
        );
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        let report = RunReport {
            pipeline: name.to_string(),
            input_rows,
            output_rows,
            output_path: summary.output_path,
            files_written: summary.files,
            started_at,
            elapsed_ms: u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        Ok(RunOutput {
            report,
            data: transformed,
        })
    }
}
