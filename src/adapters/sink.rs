use crate::adapters::location::Location;
use crate::adapters::parquet::{encode_record_batches, event_schema, events_to_batch, writer_properties};
use crate::core::table::EventTable;
use crate::domain::model::{EventRecord, SaveFormat};
use crate::domain::ports::{Storage, WriteSummary};
use crate::utils::error::{EtlError, Result};

pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn part_file_name(index: usize, format: SaveFormat) -> String {
    format!("part-{:05}.{}", index, format.extension())
}

/// Writes one part-file per partition into `folder`, then a `_SUCCESS` marker.
///
/// - `csv`: fields joined with commas, one record per line
/// - `txt`: each record's `Debug` form, one per line
/// - `parquet`: requires `header`, which names the nine columns
pub async fn save_events<S: Storage>(
    sink: &S,
    folder: &Location,
    partitions: &[Vec<EventRecord>],
    header: Option<&[&str]>,
    format: SaveFormat,
) -> Result<WriteSummary> {
    let parquet_schema = match format {
        SaveFormat::Parquet => {
            let header = header.ok_or_else(|| EtlError::Schema {
                message: "parquet output of event tuples needs a header".to_string(),
            })?;
            Some(event_schema(header)?)
        }
        SaveFormat::Csv | SaveFormat::Txt => None,
    };

    let mut files = Vec::with_capacity(partitions.len());
    let mut rows = 0;

    for (index, events) in partitions.iter().enumerate() {
        let data = match (&parquet_schema, format) {
            (Some(schema), _) => {
                let batch = events_to_batch(schema.clone(), events)?;
                encode_record_batches(schema.clone(), &[batch], writer_properties())?
            }
            (None, SaveFormat::Txt) => text_lines(events.iter().map(|event| format!("{:?}", event))),
            (None, _) => text_lines(events.iter().map(EventRecord::to_csv_line)),
        };

        let name = part_file_name(index, format);
        let target = folder.join(&name);
        tracing::debug!("Writing {} ({} records, {} bytes)", target, events.len(), data.len());
        sink.write_file(target.key(), &data).await?;

        files.push(name);
        rows += events.len();
    }

    mark_success(sink, folder).await?;

    Ok(WriteSummary {
        output_path: folder.to_string(),
        files,
        rows,
    })
}

/// Writes a table as a single part-file. Text output is not defined for tables.
pub async fn save_table<S: Storage>(
    sink: &S,
    folder: &Location,
    table: &EventTable,
    format: SaveFormat,
) -> Result<WriteSummary> {
    let data = match format {
        SaveFormat::Parquet => {
            encode_record_batches(table.schema.clone(), &table.batches, writer_properties())?
        }
        SaveFormat::Csv => {
            let mut buffer = Vec::new();
            {
                let mut writer = arrow::csv::WriterBuilder::new()
                    .with_header(false)
                    .build(&mut buffer);
                for batch in &table.batches {
                    writer.write(batch)?;
                }
            }
            buffer
        }
        SaveFormat::Txt => {
            return Err(EtlError::UnsupportedFormat {
                format: format.to_string(),
                target: "table".to_string(),
            })
        }
    };

    let name = part_file_name(0, format);
    let target = folder.join(&name);
    tracing::debug!("Writing {} ({} bytes)", target, data.len());
    sink.write_file(target.key(), &data).await?;
    mark_success(sink, folder).await?;

    Ok(WriteSummary {
        output_path: folder.to_string(),
        files: vec![name],
        rows: table.batches.iter().map(|batch| batch.num_rows()).sum(),
    })
}

async fn mark_success<S: Storage>(sink: &S, folder: &Location) -> Result<()> {
    sink.write_file(folder.join(SUCCESS_MARKER).key(), &[]).await
}

fn text_lines<I: Iterator<Item = String>>(lines: I) -> Vec<u8> {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out.into_bytes()
}
