//! Join Resolver
//!
//! Walks the relationship graph declared in the catalog and emits the ordered
//! pairwise joins that connect a set of target tables.

use crate::catalog::Catalog;
use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One left join: `left_table.left_column = right_table.right_column`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStep {
    pub left_table: String,
    pub right_table: String,
    pub left_column: String,
    pub right_column: String,
}

/// Discover join steps between the tables in `target_tables`.
///
/// Depth-first from each target in the order given. The visited set is shared
/// across start nodes, so every table is expanded at most once and cyclic
/// graphs terminate. An edge is emitted whenever its target is in
/// `target_tables`, even if that target was already visited, so the same edge
/// can appear more than once when it is reached from different entry points.
pub fn find_join_path(catalog: &Catalog, target_tables: &[String]) -> Result<Vec<JoinStep>> {
    let targets: HashSet<&str> = target_tables.iter().map(|t| t.as_str()).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut path = Vec::new();

    for table in target_tables {
        if !catalog.contains(table) {
            return Err(AssistantError::Config(format!(
                "Target table not in catalog: {}",
                table
            )));
        }
        visit(catalog, table, &targets, &mut visited, &mut path);
    }

    debug!("Join path for {:?}: {} step(s)", target_tables, path.len());
    Ok(path)
}

fn visit<'a>(
    catalog: &'a Catalog,
    current: &'a str,
    targets: &HashSet<&str>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<JoinStep>,
) {
    if !visited.insert(current) {
        return;
    }

    // Relationship targets are checked at catalog construction
    let Some(descriptor) = catalog.get(current) else {
        return;
    };

    for rel in &descriptor.relationships {
        if targets.contains(rel.target_table.as_str()) {
            path.push(JoinStep {
                left_table: current.to_string(),
                right_table: rel.target_table.clone(),
                left_column: rel.source_column.clone(),
                right_column: rel.target_column.clone(),
            });
        }
        visit(catalog, &rel.target_table, targets, visited, path);
    }
}
