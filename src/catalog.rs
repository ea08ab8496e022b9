//! Table Catalog
//!
//! Static, declarative description of the tables the assistant can answer
//! questions about: where each table is read from, what its columns mean, and
//! the foreign-key style relationships between tables.

use crate::error::{AssistantError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Physical format of a table source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// A named sheet inside a workbook (xlsx, xls, ods)
    Spreadsheet,
    /// Delimited text with a header row
    Delimited,
    /// Parquet file
    Parquet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSource {
    pub location: PathBuf,
    pub format: SourceFormat,
    /// Required for spreadsheet sources, ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Field separator for delimited sources (defaults to ',')
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<char>,
}

impl TableSource {
    pub fn spreadsheet(location: impl Into<PathBuf>, sheet: &str) -> Self {
        Self {
            location: location.into(),
            format: SourceFormat::Spreadsheet,
            sheet: Some(sheet.to_string()),
            separator: None,
        }
    }

    pub fn delimited(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            format: SourceFormat::Delimited,
            sheet: None,
            separator: None,
        }
    }

    pub fn parquet(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            format: SourceFormat::Parquet,
            sheet: None,
            separator: None,
        }
    }

    /// Separator byte for delimited sources
    pub fn separator_byte(&self) -> u8 {
        self.separator.map(|c| c as u8).unwrap_or(b',')
    }
}

/// Directed foreign-key edge from the owning table to `target_table`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub target_table: String,
    pub source_column: String,
    pub target_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source: TableSource,
    /// Column name -> meaning. Documentation only, never checked against data.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// On-disk shape of a catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    tables: Vec<TableDescriptor>,
}

/// Validated, immutable set of table descriptors in declaration order
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: Vec<TableDescriptor>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(tables: Vec<TableDescriptor>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (idx, table) in tables.iter().enumerate() {
            if by_name.insert(table.name.clone(), idx).is_some() {
                return Err(AssistantError::Config(format!(
                    "Duplicate table name in catalog: {}",
                    table.name
                )));
            }
        }

        let catalog = Self { tables, by_name };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| AssistantError::Config(format!("Failed to parse catalog: {}", e)))?;
        Self::new(file.tables)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AssistantError::Config(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// The two-table retail catalog backed by `retail_sales.xlsx`
    pub fn retail() -> Self {
        let workbook = PathBuf::from("retail_sales.xlsx");

        let sales = TableDescriptor {
            name: "sales".to_string(),
            description: "Main sales transactions table".to_string(),
            source: TableSource::spreadsheet(workbook.clone(), "sales"),
            columns: BTreeMap::from([
                ("ID".to_string(), "Unique transaction identifier".to_string()),
                ("ship_mode_id".to_string(), "Foreign key to ship_mode.id".to_string()),
                ("Sales".to_string(), "Dollar amount of the sale".to_string()),
            ]),
            relationships: vec![Relationship {
                target_table: "ship_mode".to_string(),
                source_column: "ship_mode_id".to_string(),
                target_column: "id".to_string(),
            }],
        };

        let ship_mode = TableDescriptor {
            name: "ship_mode".to_string(),
            description: "Shipping modes reference table".to_string(),
            source: TableSource::spreadsheet(workbook, "ship_mode"),
            columns: BTreeMap::from([
                ("id".to_string(), "Primary key identifier".to_string()),
                ("ship_mode".to_string(), "Name of shipping mode".to_string()),
            ]),
            relationships: Vec::new(),
        };

        let tables = vec![sales, ship_mode];
        let by_name = tables
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.name.clone(), idx))
            .collect();
        Self { tables, by_name }
    }

    /// Check relationship targets and source descriptors
    pub fn validate(&self) -> Result<()> {
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(AssistantError::Config("Table with empty name in catalog".to_string()));
            }

            match table.source.format {
                SourceFormat::Spreadsheet => {
                    let has_sheet = table
                        .source
                        .sheet
                        .as_deref()
                        .map(|s| !s.trim().is_empty())
                        .unwrap_or(false);
                    if !has_sheet {
                        return Err(AssistantError::Config(format!(
                            "Spreadsheet source for table '{}' has no sheet name",
                            table.name
                        )));
                    }
                }
                SourceFormat::Delimited => {
                    if let Some(sep) = table.source.separator {
                        if !sep.is_ascii() {
                            return Err(AssistantError::Config(format!(
                                "Separator {:?} for table '{}' is not a single ASCII byte",
                                sep, table.name
                            )));
                        }
                    }
                }
                SourceFormat::Parquet => {}
            }

            for rel in &table.relationships {
                if !self.by_name.contains_key(&rel.target_table) {
                    return Err(AssistantError::Config(format!(
                        "Table '{}' references unknown table '{}'",
                        table.name, rel.target_table
                    )));
                }
            }
        }

        Ok(())
    }

    /// Rebase relative source locations onto `base_dir`
    pub fn resolve_locations(mut self, base_dir: &Path) -> Self {
        for table in &mut self.tables {
            if table.source.location.is_relative() {
                table.source.location = base_dir.join(&table.source.location);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&TableDescriptor> {
        self.by_name.get(name).map(|&idx| &self.tables[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn tables(&self) -> &[TableDescriptor] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
