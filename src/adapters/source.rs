use crate::domain::model::TRIP_HEADER;
use crate::domain::ports::RowCount;
use crate::utils::error::Result;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

/// Raw input lines, split into contiguous partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinePartitions {
    pub partitions: Vec<Vec<String>>,
}

impl RowCount for LinePartitions {
    fn row_count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }
}

/// Decodes `bytes` as UTF-8 and deals its lines into `partitions` contiguous chunks.
///
/// Partitions are filled front to back. Trailing partitions may be empty when there
/// are fewer lines than partitions. With `skip_header` the first line of partition 0
/// is dropped; other partitions are never touched.
pub fn read_partitions(bytes: Vec<u8>, partitions: usize, skip_header: bool) -> Result<LinePartitions> {
    let text = String::from_utf8(bytes)?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    let partition_count = partitions.max(1);
    let chunk_size = lines.len().div_ceil(partition_count).max(1);

    let mut chunks: Vec<Vec<String>> = lines.chunks(chunk_size).map(<[String]>::to_vec).collect();
    chunks.resize_with(partition_count, Vec::new);

    if skip_header {
        if let Some(first) = chunks.first_mut() {
            if !first.is_empty() {
                first.remove(0);
            }
        }
    }

    Ok(LinePartitions { partitions: chunks })
}

#[derive(Debug, Clone, Copy)]
pub struct TableReadOptions {
    pub header: bool,
    pub infer_schema: bool,
    pub batch_size: usize,
}

impl Default for TableReadOptions {
    fn default() -> Self {
        Self {
            header: true,
            infer_schema: true,
            batch_size: 8192,
        }
    }
}

/// Trip rows as Arrow record batches.
#[derive(Debug, Clone)]
pub struct TripTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl RowCount for TripTable {
    fn row_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// Field metadata key holding the type detected for a column, e.g. `Int64`.
pub const INFERRED_TYPE_KEY: &str = "trip_events.inferred_type";

/// Reads CSV bytes into a table of text columns.
///
/// Values are kept exactly as written (leading zeros, timestamp spelling), so every
/// column is nullable Utf8. With `infer_schema` the type detected over the whole file
/// is recorded under [`INFERRED_TYPE_KEY`] in the field metadata. Without a header
/// row the columns take their `TRIP_HEADER` names by position.
pub fn read_table(bytes: &[u8], options: TableReadOptions) -> Result<TripTable> {
    let format = Format::default().with_header(options.header);
    let (inferred, _) = format.infer_schema(Cursor::new(bytes), None)?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let name = match TRIP_HEADER.get(index) {
                Some(name) if !options.header => *name,
                _ => field.name().as_str(),
            };
            let text = Field::new(name, DataType::Utf8, true);
            if options.infer_schema {
                text.with_metadata(HashMap::from([(
                    INFERRED_TYPE_KEY.to_string(),
                    field.data_type().to_string(),
                )]))
            } else {
                text
            }
        })
        .collect();
    let schema = Arc::new(Schema::new(fields));
    tracing::debug!("Table schema: {:?}", schema);

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(options.header)
        .with_batch_size(options.batch_size)
        .build(Cursor::new(bytes))?;
    let batches = reader.collect::<std::result::Result<Vec<_>, ArrowError>>()?;

    Ok(TripTable { schema, batches })
}
