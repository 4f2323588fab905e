//! The row split expressed over Arrow record batches.
//!
//! Each trip row is exploded into two event rows by pairing the start/end
//! columns, zipping them with the literal `("START", "END")` pair and
//! interleaving the halves. Shared columns are repeated with `take`.

use crate::adapters::source::TripTable;
use crate::domain::model::{EventAction, EVENT_HEADER};
use crate::domain::ports::{Preview, RowCount};
use crate::utils::error::{EtlError, Result};
use arrow::array::{Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::{cast, interleave, take};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use arrow::util::pretty::pretty_format_batches;
use std::sync::Arc;

/// Columns copied unchanged onto both events.
const SHARED_COLUMNS: [&str; 5] = ["id", "duration", "bike_id", "subscription_type", "zip_code"];

/// (output column, start column, end column).
const PAIRED_COLUMNS: [(&str, &str, &str); 3] = [
    ("event_time", "start_date", "end_date"),
    ("station_name", "start_station_name", "end_station_name"),
    ("station_id", "start_station_id", "end_station_id"),
];

#[derive(Debug, Clone)]
pub struct EventTable {
    pub schema: SchemaRef,
    pub batches: Vec<RecordBatch>,
}

impl RowCount for EventTable {
    fn row_count(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

impl Preview for EventTable {
    fn preview(&self, limit: usize) -> Result<String> {
        let mut remaining = limit;
        let mut shown = Vec::new();
        for batch in &self.batches {
            if remaining == 0 {
                break;
            }
            let rows = batch.num_rows().min(remaining);
            shown.push(batch.slice(0, rows));
            remaining -= rows;
        }
        if shown.is_empty() {
            shown.push(RecordBatch::new_empty(self.schema.clone()));
        }
        Ok(pretty_format_batches(&shown)?.to_string())
    }
}

fn field<'a>(schema: &'a Schema, name: &str) -> Result<&'a Field> {
    schema.field_with_name(name).map_err(|_| EtlError::Schema {
        message: format!("input table has no '{}' column", name),
    })
}

/// A start/end pair keeps its type and metadata when both halves agree, else Utf8 with none.
fn pair_field(schema: &Schema, name: &str, start: &str, end: &str) -> Result<Field> {
    let start = field(schema, start)?;
    let end = field(schema, end)?;
    let data_type = if start.data_type() == end.data_type() {
        start.data_type().clone()
    } else {
        DataType::Utf8
    };
    let out_field = Field::new(name, data_type, true);
    if start.metadata() == end.metadata() {
        Ok(out_field.with_metadata(start.metadata().clone()))
    } else {
        Ok(out_field)
    }
}

/// Output schema for a trip table schema, columns in `EVENT_HEADER` order.
pub fn event_table_schema(input: &Schema) -> Result<SchemaRef> {
    let mut fields = Vec::with_capacity(EVENT_HEADER.len());
    for name in EVENT_HEADER {
        let out_field = if name == "event_action" {
            Field::new(name, DataType::Utf8, false)
        } else if let Some((_, start, end)) = PAIRED_COLUMNS.iter().find(|(out, _, _)| *out == name) {
            pair_field(input, name, start, end)?
        } else {
            let source = field(input, name)?;
            Field::new(name, source.data_type().clone(), true).with_metadata(source.metadata().clone())
        };
        fields.push(out_field);
    }
    Ok(Arc::new(Schema::new(fields)))
}

fn column(batch: &RecordBatch, name: &str) -> Result<ArrayRef> {
    batch.column_by_name(name).cloned().ok_or_else(|| EtlError::Schema {
        message: format!("input table has no '{}' column", name),
    })
}

fn coerce(array: ArrayRef, target: &DataType) -> Result<ArrayRef> {
    if array.data_type() == target {
        Ok(array)
    } else {
        Ok(cast(array.as_ref(), target)?)
    }
}

/// Explodes one trip batch into an event batch with twice as many rows.
///
/// Row `i` of the input becomes rows `2i` (START) and `2i + 1` (END).
pub fn explode_events(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let row_limit = u32::try_from(rows).map_err(|_| EtlError::Schema {
        message: format!("batch of {} rows is too large to explode", rows),
    })?;

    // zip: (0, i) is the start half of row i, (1, i) the end half
    let zipped: Vec<(usize, usize)> = (0..rows).flat_map(|row| [(0, row), (1, row)]).collect();
    let repeated = UInt32Array::from_iter_values((0..row_limit).flat_map(|row| [row, row]));

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(EVENT_HEADER.len());
    for output in schema.fields() {
        let name = output.name().as_str();
        let array = if name == "event_action" {
            let actions = (0..rows).flat_map(|_| [EventAction::Start.as_str(), EventAction::End.as_str()]);
            Arc::new(StringArray::from_iter_values(actions)) as ArrayRef
        } else if let Some((_, start, end)) = PAIRED_COLUMNS.iter().find(|(out, _, _)| *out == name) {
            let start = coerce(column(batch, start)?, output.data_type())?;
            let end = coerce(column(batch, end)?, output.data_type())?;
            interleave(&[start.as_ref(), end.as_ref()], &zipped)?
        } else if SHARED_COLUMNS.contains(&name) {
            take(column(batch, name)?.as_ref(), &repeated, None)?
        } else {
            return Err(EtlError::Schema {
                message: format!("unexpected output column '{}'", name),
            });
        };
        columns.push(array);
    }

    Ok(RecordBatch::try_new(schema.clone(), columns)?)
}

pub fn explode_table(table: &TripTable) -> Result<EventTable> {
    let schema = event_table_schema(&table.schema)?;
    let batches = table
        .batches
        .iter()
        .map(|batch| explode_events(batch, &schema))
        .collect::<Result<Vec<_>>>()?;

    Ok(EventTable { schema, batches })
}

/// Renders every cell as text, nulls as empty strings.
pub fn rows_as_strings(batch: &RecordBatch) -> Result<Vec<Vec<String>>> {
    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok((0..batch.num_rows())
        .map(|row| {
            formatters
                .iter()
                .map(|formatter| formatter.value(row).to_string())
                .collect()
        })
        .collect())
}
