//! Answer generators
//!
//! A single `generate(prompt) -> text` contract with two HTTP backends: the
//! hosted Mistral chat API, and a local Ollama server used when no API key is
//! configured. The backend is chosen once at startup by `select_generator`.

use crate::error::{AssistantError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MISTRAL_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "mistral";

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Settings for both backends; presence of `mistral_api_key` picks the remote one
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub mistral_api_key: Option<String>,
    pub mistral_base_url: String,
    pub mistral_model: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            mistral_api_key: None,
            mistral_base_url: DEFAULT_MISTRAL_BASE_URL.to_string(),
            mistral_model: DEFAULT_MISTRAL_MODEL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mistral_api_key: std::env::var("MISTRAL_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            mistral_base_url: std::env::var("MISTRAL_BASE_URL").unwrap_or(defaults.mistral_base_url),
            mistral_model: std::env::var("MISTRAL_MODEL").unwrap_or(defaults.mistral_model),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(defaults.ollama_base_url),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
        }
    }
}

/// Pick the generator for this process
pub fn select_generator(config: &GeneratorConfig) -> Arc<dyn AnswerGenerator> {
    match &config.mistral_api_key {
        Some(key) => {
            info!("Initialized Mistral API client (model: {})", config.mistral_model);
            Arc::new(MistralGenerator::new(
                key.clone(),
                config.mistral_model.clone(),
                config.mistral_base_url.clone(),
            ))
        }
        None => {
            warn!(
                "MISTRAL_API_KEY not set - using local Ollama at {} (model: {})",
                config.ollama_base_url, config.ollama_model
            );
            Arc::new(OllamaGenerator::new(
                config.ollama_model.clone(),
                config.ollama_base_url.clone(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct MistralGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl MistralGenerator {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for MistralGenerator {
    fn name(&self) -> &'static str {
        "mistral"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Generation(format!("Mistral API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AssistantError::Generation(format!(
                "Mistral API returned {}: {}",
                status, detail
            )));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AssistantError::Generation(format!("Failed to parse Mistral response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AssistantError::Generation("No content in Mistral response".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    model: String,
    base_url: String,
}

impl OllamaGenerator {
    pub fn new(model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AnswerGenerator for OllamaGenerator {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Generation(format!("Ollama call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AssistantError::Generation(format!(
                "Ollama returned {}: {}",
                status, detail
            )));
        }

        let parsed: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::Generation(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(parsed.response)
    }
}
