pub mod prompts;

mod gemini;

use std::sync::Arc;

use tracing::info;

use crate::config::{Config, LlmConfig};
use crate::error::Result;

pub use gemini::GeminiEngine;

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

impl From<&LlmConfig> for GenerationParams {
    fn from(llm: &LlmConfig) -> Self {
        Self {
            temperature: llm.temperature,
            top_p: llm.top_p,
            top_k: llm.top_k,
            max_output_tokens: llm.max_output_tokens,
            response_mime_type: llm.response_mime_type.clone(),
        }
    }
}

/// A generative-text provider.
///
/// Each call is a single prompt with no conversation history; the backend
/// returns the generated text or an error describing why it could not.
#[async_trait::async_trait]
pub trait LlmBackend: Send + Sync {
    /// Human-readable name of this backend (e.g. "Gemini API").
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

#[async_trait::async_trait]
impl LlmBackend for GeminiEngine {
    fn name(&self) -> &str {
        "Gemini API"
    }
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        self.generate(prompt, params).await
    }
}

/// Build the generative backend from config and the startup credential.
pub fn build_backend(config: &Config, api_key: String) -> Result<Arc<dyn LlmBackend>> {
    let engine: Arc<dyn LlmBackend> = Arc::new(GeminiEngine::new(&config.llm, api_key)?);
    info!(name = engine.name(), model = %config.llm.model, "LLM backend selected");
    Ok(engine)
}
