use crate::adapters::location::Location;
use crate::adapters::sink::save_table;
use crate::adapters::source::{read_table, TableReadOptions, TripTable};
use crate::core::table::{explode_table, EventTable};
use crate::domain::model::PipelineKind;
use crate::domain::ports::{ConfigProvider, Pipeline, Storage, WriteSummary};
use crate::utils::error::Result;

/// Declarative split over an Arrow table read with header detection and type inference.
pub struct TablePipeline<S: Storage, C: ConfigProvider> {
    source: S,
    sink: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TablePipeline<S, C> {
    pub fn new(source: S, sink: S, config: C) -> Self {
        Self {
            source,
            sink,
            config,
        }
    }

    fn read_options(&self) -> TableReadOptions {
        TableReadOptions {
            header: self.config.skip_header(),
            infer_schema: self.config.infer_schema(),
            ..TableReadOptions::default()
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for TablePipeline<S, C> {
    type Extracted = TripTable;
    type Transformed = EventTable;

    fn name(&self) -> &'static str {
        "table"
    }

    async fn extract(&self) -> Result<TripTable> {
        let input = Location::parse(self.config.input_path())?;
        tracing::debug!("Reading trip table from {}", input);
        let bytes = self.source.read_file(input.key()).await?;

        read_table(&bytes, self.read_options())
    }

    async fn transform(&self, data: TripTable) -> Result<EventTable> {
        explode_table(&data)
    }

    async fn load(&self, data: &EventTable) -> Result<WriteSummary> {
        let folder = Location::parse(&self.config.output_folder(PipelineKind::Table))?;
        save_table(&self.sink, &folder, data, self.config.save_format()).await
    }
}
