use crate::adapters::location::Location;
use crate::adapters::sink::save_events;
use crate::adapters::source::{read_partitions, LinePartitions};
use crate::core::splitter::split_lines;
use crate::domain::model::{EventRecord, PipelineKind, EVENT_HEADER};
use crate::domain::ports::{ConfigProvider, Pipeline, Preview, RowCount, Storage, WriteSummary};
use crate::utils::error::{EtlError, Result};

/// Event records per partition, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPartitions {
    pub partitions: Vec<Vec<EventRecord>>,
}

impl EventPartitions {
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.partitions.iter().flatten()
    }
}

impl RowCount for EventPartitions {
    fn row_count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }
}

impl Preview for EventPartitions {
    fn preview(&self, limit: usize) -> Result<String> {
        let lines: Vec<String> = self.iter().take(limit).map(EventRecord::to_csv_line).collect();
        Ok(lines.join("\n"))
    }
}

/// Line-oriented split: partitioned raw lines, one blocking task per partition.
pub struct LinePipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> LinePipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }
}

fn split_partition(index: usize, lines: Vec<String>) -> Result<Vec<EventRecord>> {
    let events = split_lines(&lines).inspect_err(|e| {
        tracing::error!("❌ Partition {} failed: {}", index, e);
    })?;
    tracing::debug!("Partition {}: {} lines -> {} events", index, lines.len(), events.len());
    Ok(events)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for LinePipeline<S, C> {
    type Extracted = LinePartitions;
    type Transformed = EventPartitions;

    fn name(&self) -> &'static str {
        "lines"
    }

    async fn extract(&self) -> Result<LinePartitions> {
        let input = Location::parse(self.config.input_path())?;
        tracing::debug!("Reading trip lines from {}", input);
        let bytes = self.source.read_file(input.key()).await?;

        read_partitions(bytes, self.config.partitions(), self.config.skip_header())
    }

    async fn transform(&self, data: LinePartitions) -> Result<EventPartitions> {
        let handles: Vec<_> = data
            .partitions
            .into_iter()
            .enumerate()
            .map(|(index, lines)| tokio::task::spawn_blocking(move || split_partition(index, lines)))
            .collect();

        let mut partitions = Vec::with_capacity(handles.len());
        for handle in handles {
            let events = handle.await.map_err(|e| EtlError::ProcessingError {
                message: format!("partition task failed: {}", e),
            })??;
            partitions.push(events);
        }

        Ok(EventPartitions { partitions })
    }

    async fn load(&self, data: &EventPartitions) -> Result<WriteSummary> {
        let folder = Location::parse(&self.config.output_folder(PipelineKind::Lines))?;
        save_events(
            &self.sink,
            &folder,
            &data.partitions,
            Some(&EVENT_HEADER[..]),
            self.config.save_format(),
        )
        .await
    }
}
