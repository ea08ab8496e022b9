//! Question answering pipeline: join path -> merge -> prompt -> generator

use crate::catalog::Catalog;
use crate::error::{AssistantError, Result};
use crate::executor::merge_tables;
use crate::llm::AnswerGenerator;
use crate::loader::TableStore;
use crate::prompt::{build_prompt, DEFAULT_PREVIEW_ROWS};
use crate::resolver::find_join_path;
use std::sync::Arc;
use tracing::info;

/// Tables joined for every question until table selection is query driven
pub const DEFAULT_TARGET_TABLES: [&str; 2] = ["sales", "ship_mode"];

pub struct Assistant {
    catalog: Arc<Catalog>,
    tables: Arc<TableStore>,
    generator: Arc<dyn AnswerGenerator>,
    target_tables: Vec<String>,
    preview_rows: usize,
}

impl Assistant {
    pub fn new(
        catalog: Arc<Catalog>,
        tables: Arc<TableStore>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            catalog,
            tables,
            generator,
            target_tables: DEFAULT_TARGET_TABLES.iter().map(|t| t.to_string()).collect(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Replace the target tables; all must exist in the catalog
    pub fn with_target_tables(mut self, target_tables: Vec<String>) -> Result<Self> {
        if target_tables.is_empty() {
            return Err(AssistantError::Config("At least one target table is required".to_string()));
        }
        if let Some(unknown) = target_tables.iter().find(|t| !self.catalog.contains(t.as_str())) {
            return Err(AssistantError::Config(format!(
                "Target table not in catalog: {}",
                unknown
            )));
        }
        self.target_tables = target_tables;
        Ok(self)
    }

    pub fn with_preview_rows(mut self, preview_rows: usize) -> Self {
        self.preview_rows = preview_rows;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tables(&self) -> &TableStore {
        &self.tables
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub fn target_tables(&self) -> &[String] {
        &self.target_tables
    }

    /// Answer one question
    pub async fn answer(&self, question: &str) -> Result<String> {
        info!("Processing query: {}", question);

        let join_path = find_join_path(&self.catalog, &self.target_tables)?;
        let primary = self
            .target_tables
            .first()
            .ok_or_else(|| AssistantError::Config("No target tables configured".to_string()))?;
        let merged = merge_tables(&self.tables, &join_path, primary)?;

        let prompt = build_prompt(&merged, question, self.preview_rows);
        let answer = self.generator.generate(&prompt).await?;

        info!("Answered query with {} ({} chars)", self.generator.name(), answer.len());
        Ok(answer)
    }
}
