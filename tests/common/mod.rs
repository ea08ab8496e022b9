#![allow(dead_code)]

use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use table_assistant::error::{AssistantError, Result};
use table_assistant::llm::AnswerGenerator;

pub const SALES_CSV: &str = "ID,ship_mode_id,Sales\n\
1,1,120.5\n\
2,2,80.0\n\
3,3,42.25\n\
4,1,310.0\n\
5,2,15.75\n";

pub const SHIP_MODE_CSV: &str = "id,ship_mode\n\
1,Standard Class\n\
2,Second Class\n\
3,Same Day\n";

/// Write the retail tables as CSV plus a catalog describing them
pub fn write_retail_fixture(dir: &Path) -> std::io::Result<()> {
    fs::write(dir.join("sales.csv"), SALES_CSV)?;
    fs::write(dir.join("ship_mode.csv"), SHIP_MODE_CSV)?;
    fs::write(
        dir.join("catalog.json"),
        r#"{
  "tables": [
    {
      "name": "sales",
      "description": "Main sales transactions table",
      "source": {"location": "sales.csv", "format": "delimited"},
      "columns": {"ID": "Unique transaction identifier", "ship_mode_id": "Foreign key to ship_mode.id", "Sales": "Dollar amount of the sale"},
      "relationships": [
        {"target_table": "ship_mode", "source_column": "ship_mode_id", "target_column": "id"}
      ]
    },
    {
      "name": "ship_mode",
      "description": "Shipping modes reference table",
      "source": {"location": "ship_mode.csv", "format": "delimited"},
      "columns": {"id": "Primary key identifier", "ship_mode": "Name of shipping mode"}
    }
  ]
}"#,
    )
}

/// Returns a canned answer and keeps every prompt it was given
#[derive(Default)]
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Standard Class leads with $430.50 in sales.".to_string())
    }
}

/// Fails every call whose prompt mentions "fail"
pub struct FlakyGenerator;

#[async_trait]
impl AnswerGenerator for FlakyGenerator {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.contains("fail") {
            Err(AssistantError::Generation("backend unreachable".to_string()))
        } else {
            Ok("ok".to_string())
        }
    }
}
