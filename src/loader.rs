//! Table Loader
//!
//! Reads every catalog entry into a polars `DataFrame` once at startup. Any
//! failure aborts the whole load so a partially loaded catalog is never served.

use crate::catalog::{Catalog, SourceFormat, TableDescriptor};
use crate::error::{AssistantError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{error, info};

/// Read-only tables keyed by catalog name, shared by every request
#[derive(Debug, Clone, Default)]
pub struct TableStore {
    tables: HashMap<String, DataFrame>,
}

impl TableStore {
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = (S, DataFrame)>,
        S: Into<String>,
    {
        Self {
            tables: frames.into_iter().map(|(name, df)| (name.into(), df)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Load every table declared in the catalog
pub fn load_all(catalog: &Catalog) -> Result<TableStore> {
    let mut tables = HashMap::with_capacity(catalog.len());

    for descriptor in catalog.tables() {
        match load_table(descriptor) {
            Ok(df) => {
                info!(
                    "Successfully loaded table: {} ({} rows, {} columns)",
                    descriptor.name,
                    df.height(),
                    df.width()
                );
                tables.insert(descriptor.name.clone(), df);
            }
            Err(e) => {
                error!("Error loading {}: {}", descriptor.name, e);
                return Err(AssistantError::Load(format!(
                    "Failed to load table '{}': {}",
                    descriptor.name, e
                )));
            }
        }
    }

    Ok(TableStore { tables })
}

/// Load a single table from its declared source
pub fn load_table(descriptor: &TableDescriptor) -> Result<DataFrame> {
    let source = &descriptor.source;
    let path = source.location.as_path();

    if !path.exists() {
        return Err(AssistantError::Load(format!(
            "Source file not found: {}",
            path.display()
        )));
    }

    match source.format {
        SourceFormat::Spreadsheet => {
            let sheet = source.sheet.as_deref().ok_or_else(|| {
                AssistantError::Config(format!(
                    "Spreadsheet source for table '{}' has no sheet name",
                    descriptor.name
                ))
            })?;
            read_sheet(path, sheet)
        }
        SourceFormat::Delimited => {
            let df = LazyCsvReader::new(path)
                .with_has_header(true)
                .with_separator(source.separator_byte())
                .finish()
                .map_err(|e| AssistantError::Load(format!("Failed to load CSV: {}", e)))?
                .collect()
                .map_err(|e| AssistantError::Load(format!("Failed to read CSV: {}", e)))?;
            Ok(df)
        }
        SourceFormat::Parquet => {
            let df = LazyFrame::scan_parquet(path, ScanArgsParquet::default())
                .map_err(|e| AssistantError::Load(format!("Failed to load Parquet: {}", e)))?
                .collect()
                .map_err(|e| AssistantError::Load(format!("Failed to read Parquet: {}", e)))?;
            Ok(df)
        }
    }
}

fn read_sheet(path: &Path, sheet: &str) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AssistantError::Load(format!("Failed to open workbook {}: {}", path.display(), e))
    })?;

    let range = workbook.worksheet_range(sheet).map_err(|e| {
        AssistantError::Load(format!(
            "Failed to read sheet '{}' from {}: {}",
            sheet,
            path.display(),
            e
        ))
    })?;

    range_to_dataframe(&range)
}

/// Convert a sheet range into a frame, using the first row as the header
pub fn range_to_dataframe(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| AssistantError::Load("Sheet is empty, expected a header row".to_string()))?;

    let names: Vec<String> = header.iter().map(|cell| cell.to_string().trim().to_string()).collect();
    let mut seen = HashSet::new();
    for (idx, name) in names.iter().enumerate() {
        if name.is_empty() {
            return Err(AssistantError::Load(format!(
                "Empty header in column {}",
                idx + 1
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(AssistantError::Load(format!("Duplicate header '{}'", name)));
        }
    }

    let body: Vec<&[Data]> = rows.collect();
    let columns: Vec<Series> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<Option<&Data>> = body
                .iter()
                .map(|row| row.get(idx).filter(|cell| !is_blank(cell)))
                .collect();
            cells_to_series(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int,
    Float,
    Bool,
    Text,
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_int(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some(*f as i64)
        }
        _ => None,
    }
}

fn as_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn infer_kind(cells: &[Option<&Data>]) -> ColumnKind {
    let present: Vec<&Data> = cells.iter().flatten().copied().collect();
    if present.is_empty() {
        return ColumnKind::Text;
    }
    if present.iter().all(|c| as_int(c).is_some()) {
        ColumnKind::Int
    } else if present.iter().all(|c| as_float(c).is_some()) {
        ColumnKind::Float
    } else if present.iter().all(|c| matches!(c, Data::Bool(_))) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn cells_to_series(name: &str, cells: &[Option<&Data>]) -> Series {
    match infer_kind(cells) {
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells.iter().map(|c| c.and_then(as_int)).collect();
            Series::new(name, values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| c.and_then(as_float)).collect();
            Series::new(name, values)
        }
        ColumnKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Some(Data::Bool(b)) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name, values)
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| c.map(|d| d.to_string())).collect();
            Series::new(name, values)
        }
    }
}
