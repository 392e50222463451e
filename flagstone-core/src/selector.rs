//! Row and conditional value selection
//!
//! Rows for the active environment are tried before all others; within each
//! group rows keep their original order. Inside a row, conditional values are
//! tried in order and the first whose criteria all match wins.

use crate::criteria::{MatchContext, all_match};
use crate::error::EvalResult;
use crate::model::{ConfigValue, Row};

/// The matched value and where it was found
#[derive(Debug, Clone, Copy)]
pub struct Selection<'c> {
    /// Index into the rows as supplied
    pub row_index: usize,
    pub conditional_value_index: usize,
    pub value: &'c ConfigValue,
}

/// Stable partition: rows for `project_env_id` first, then the rest.
pub fn prioritized_rows(rows: &[Row], project_env_id: Option<i64>) -> Vec<(usize, &Row)> {
    let is_active = |row: &Row| project_env_id.is_some() && row.project_env_id == project_env_id;

    let active = rows.iter().enumerate().filter(|&(_, row)| is_active(row));
    let others = rows.iter().enumerate().filter(|&(_, row)| !is_active(row));
    active.chain(others).collect()
}

/// Find the first matching value across all rows
pub fn select<'c>(
    rows: &'c [Row],
    project_env_id: Option<i64>,
    ctx: &MatchContext<'_>,
) -> EvalResult<Option<Selection<'c>>> {
    for (row_index, row) in prioritized_rows(rows, project_env_id) {
        for (conditional_value_index, conditional) in row.values.iter().enumerate() {
            if all_match(&conditional.criteria, ctx)? {
                return Ok(Some(Selection {
                    row_index,
                    conditional_value_index,
                    value: &conditional.value,
                }));
            }
        }
    }

    Ok(None)
}
