//! Startup configuration shared by the `ask` and `server` binaries

use crate::assistant::{Assistant, DEFAULT_TARGET_TABLES};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::llm::{select_generator, GeneratorConfig};
use crate::loader::load_all;
use crate::prompt::DEFAULT_PREVIEW_ROWS;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// JSON catalog file (defaults to the built-in retail catalog)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Base directory for relative source locations
    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Tables to join for every question (repeatable, order matters)
    #[arg(long = "target-table")]
    pub target_tables: Vec<String>,

    /// Number of merged rows included in the prompt
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,
}

impl Settings {
    pub fn load_catalog(&self) -> Result<Catalog> {
        let catalog = match &self.catalog {
            Some(path) => {
                info!("Loading catalog from {}", path.display());
                Catalog::from_json_file(path)?
            }
            None => Catalog::retail(),
        };
        Ok(catalog.resolve_locations(&self.data_dir))
    }

    pub fn target_tables(&self) -> Vec<String> {
        if self.target_tables.is_empty() {
            DEFAULT_TARGET_TABLES.iter().map(|t| t.to_string()).collect()
        } else {
            self.target_tables.clone()
        }
    }

    /// Build the assistant: catalog, every table, and the generator.
    /// Any error here must stop the process before it serves traffic.
    pub fn build_assistant(&self, generator_config: &GeneratorConfig) -> Result<Assistant> {
        info!("Initializing system components...");

        let catalog = self.load_catalog()?;
        let generator = select_generator(generator_config);
        let tables = load_all(&catalog)?;

        let assistant = Assistant::new(Arc::new(catalog), Arc::new(tables), generator)
            .with_target_tables(self.target_tables())?
            .with_preview_rows(self.preview_rows);

        info!(
            "All components initialized successfully ({} tables, generator: {})",
            assistant.tables().len(),
            assistant.generator_name()
        );
        Ok(assistant)
    }
}

/// Install the fmt subscriber, honouring `RUST_LOG` (default `info`)
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
