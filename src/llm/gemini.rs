use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::{EcofertilError, Result};
use crate::llm::GenerationParams;

/// LLM engine backed by the Gemini `generateContent` REST endpoint.
///
/// Every call is a fresh single-turn exchange: the prompt goes out as the
/// only user message and the text of the first candidate comes back.
pub struct GeminiEngine {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

// -- generateContent request/response types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl GeminiEngine {
    pub fn new(llm: &LlmConfig, api_key: String) -> Result<Self> {
        let mut builder = Client::builder();
        if llm.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(llm.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| EcofertilError::Config(format!("failed to create HTTP client: {e}")))?;

        let base_url = llm.base_url.trim_end_matches('/').to_string();

        info!(
            model = %llm.model,
            base_url = %base_url,
            timeout_secs = llm.timeout_secs,
            "Gemini engine initialized"
        );

        Ok(Self {
            client,
            api_key,
            base_url,
            model: llm.model.clone(),
        })
    }

    /// Send `prompt` to Gemini and return the generated text.
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_output_tokens,
                response_mime_type: &params.response_mime_type,
            },
        };

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            max_output_tokens = params.max_output_tokens,
            "invoking Gemini API"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EcofertilError::Llm(format!("Gemini request failed: {e}")))?;

        let status = resp.status();

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            let error_msg = match serde_json::from_str::<ErrorResponse>(&error_text) {
                Ok(ErrorResponse { error: Some(body) }) => body.message,
                _ => error_text,
            };

            warn!(status = %status, error = %error_msg, "Gemini API error");

            return Err(EcofertilError::Llm(format!(
                "Gemini API returned {status}: {error_msg}"
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| EcofertilError::Llm(format!("failed to parse Gemini response: {e}")))?;

        if let Some(ref usage) = parsed.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                candidate_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "Gemini usage"
            );
        }

        let response = extract_text(parsed)?;

        info!(
            response_len = response.len(),
            model = %self.model,
            "Gemini response received"
        );

        Ok(response)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(parsed: GenerateResponse) -> Result<String> {
    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(EcofertilError::Llm(format!("prompt blocked by Gemini: {reason}")));
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(EcofertilError::Llm("Gemini returned no candidates".into()));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(EcofertilError::Llm(match candidate.finish_reason {
            Some(reason) => format!("Gemini returned no text (finish reason: {reason})"),
            None => "Gemini returned empty response".into(),
        }));
    }

    Ok(text)
}
