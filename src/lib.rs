pub mod assistant;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod llm;
pub mod loader;
pub mod prompt;
pub mod resolver;
pub mod server;

pub use assistant::Assistant;
pub use catalog::{Catalog, Relationship, SourceFormat, TableDescriptor, TableSource};
pub use error::{AssistantError, Result};
pub use executor::merge_tables;
pub use llm::{select_generator, AnswerGenerator, GeneratorConfig};
pub use loader::{load_all, TableStore};
pub use resolver::{find_join_path, JoinStep};
