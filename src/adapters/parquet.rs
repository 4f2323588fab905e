use crate::domain::model::{EventRecord, EVENT_FIELD_COUNT};
use crate::utils::error::{EtlError, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::format::KeyValue;
use std::sync::{Arc, OnceLock};

const ROW_GROUP_SIZE: usize = 64 * 1024;

/// Shared writer properties: Snappy, dictionary pages, page statistics.
pub fn writer_properties() -> &'static WriterProperties {
    static PROPERTIES: OnceLock<WriterProperties> = OnceLock::new();
    PROPERTIES.get_or_init(|| {
        let metadata = vec![KeyValue {
            key: "trip_events.version".to_string(),
            value: Some(env!("CARGO_PKG_VERSION").to_string()),
        }];

        WriterProperties::builder()
            .set_dictionary_enabled(true)
            .set_statistics_enabled(EnabledStatistics::Page)
            .set_compression(Compression::SNAPPY)
            .set_max_row_group_size(ROW_GROUP_SIZE)
            .set_key_value_metadata(Some(metadata))
            .build()
    })
}

/// All-text schema for event tuples. The header must name exactly nine columns.
pub fn event_schema(header: &[&str]) -> Result<SchemaRef> {
    if header.len() != EVENT_FIELD_COUNT {
        return Err(EtlError::Schema {
            message: format!(
                "event header has {} names, expected {}",
                header.len(),
                EVENT_FIELD_COUNT
            ),
        });
    }

    let fields: Vec<Field> = header
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, false))
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

pub fn events_to_batch(schema: SchemaRef, events: &[EventRecord]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = (0..EVENT_FIELD_COUNT)
        .map(|index| {
            let values = events.iter().map(|event| event.fields()[index]);
            Arc::new(StringArray::from_iter_values(values)) as ArrayRef
        })
        .collect();

    Ok(RecordBatch::try_new(schema, columns)?)
}

/// Encodes batches into one Parquet file. An empty batch list yields a file with
/// the schema and no rows.
pub fn encode_record_batches(
    schema: SchemaRef,
    batches: &[RecordBatch],
    properties: &WriterProperties,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = ArrowWriter::try_new(&mut buffer, schema.clone(), Some(properties.clone()))?;
        for batch in batches {
            if batch.schema() != schema {
                return Err(EtlError::Schema {
                    message: "all batches must share the same schema".to_string(),
                });
            }
            writer.write(batch)?;
        }
        writer.close()?;
    }
    Ok(buffer)
}
