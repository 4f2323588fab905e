use crate::core::line_pipeline::EventPartitions;
use crate::core::table::{rows_as_strings, EventTable};
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Multiset comparison of the two formulations' outputs. Row order is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub line_rows: usize,
    pub table_rows: usize,
    pub only_in_lines: usize,
    pub only_in_table: usize,
}

impl Comparison {
    pub fn matched(&self) -> bool {
        self.only_in_lines == 0 && self.only_in_table == 0
    }
}

pub fn compare_results(lines: &EventPartitions, table: &EventTable) -> Result<Comparison> {
    let mut counts: HashMap<Vec<String>, i64> = HashMap::new();
    let mut line_rows = 0;
    for event in lines.iter() {
        let row = event.fields().iter().map(|value| value.to_string()).collect();
        *counts.entry(row).or_default() += 1;
        line_rows += 1;
    }

    let mut table_rows = 0;
    for batch in &table.batches {
        for row in rows_as_strings(batch)? {
            *counts.entry(row).or_default() -= 1;
            table_rows += 1;
        }
    }

    let only_in_lines: usize = counts.values().filter(|n| **n > 0).map(|n| *n as usize).sum();
    let only_in_table: usize = counts.values().filter(|n| **n < 0).map(|n| n.unsigned_abs() as usize).sum();

    Ok(Comparison {
        line_rows,
        table_rows,
        only_in_lines,
        only_in_table,
    })
}
