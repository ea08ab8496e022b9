//! Join Executor
//!
//! Applies a join path as a chain of left-outer joins over the loaded tables.
//! Cached tables are never mutated; every join produces a new frame.

use crate::error::{AssistantError, Result};
use crate::loader::TableStore;
use crate::resolver::JoinStep;
use polars::prelude::*;
use tracing::debug;

/// Merge the tables named by `join_path`, or return `primary_table` when the
/// path is empty.
pub fn merge_tables(tables: &TableStore, join_path: &[JoinStep], primary_table: &str) -> Result<DataFrame> {
    let Some(first) = join_path.first() else {
        return Ok(lookup(tables, primary_table)?.clone());
    };

    let mut merged = lookup(tables, &first.left_table)?.clone();

    for step in join_path {
        let right = lookup(tables, &step.right_table)?;
        merged = left_join(merged, right, step)?;
        debug!(
            "Joined {} on {} = {}.{}: {} rows, {} columns",
            step.left_table,
            step.left_column,
            step.right_table,
            step.right_column,
            merged.height(),
            merged.width()
        );
    }

    Ok(merged)
}

fn lookup<'a>(tables: &'a TableStore, name: &str) -> Result<&'a DataFrame> {
    tables
        .get(name)
        .ok_or_else(|| AssistantError::Join(format!("Table not loaded: {}", name)))
}

fn left_join(left: DataFrame, right: &DataFrame, step: &JoinStep) -> Result<DataFrame> {
    if left.column(&step.left_column).is_err() {
        return Err(AssistantError::Join(format!(
            "Column '{}' not found in merged data (joining {} to {})",
            step.left_column, step.left_table, step.right_table
        )));
    }
    if right.column(&step.right_column).is_err() {
        return Err(AssistantError::Join(format!(
            "Column '{}' not found in table {}",
            step.right_column, step.right_table
        )));
    }

    let joined = left
        .lazy()
        .join(
            right.clone().lazy(),
            [col(&step.left_column)],
            [col(&step.right_column)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()?;

    Ok(joined)
}
