use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::TranslateConfig;
use crate::error::{EcofertilError, Result};
use crate::translate::chunk_text;

/// Translator backed by the public Google Translate web endpoint
/// (`/translate_a/single?client=gtx`), which needs no API key.
///
/// Long texts are sent in line-aligned chunks of at most
/// `max_chunk_chars` characters and stitched back together in order.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    max_chunk_chars: usize,
}

impl GoogleTranslator {
    pub fn new(cfg: &TranslateConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if cfg.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(cfg.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| EcofertilError::Config(format!("failed to create HTTP client: {e}")))?;

        let base_url = cfg.base_url.trim_end_matches('/').to_string();

        info!(
            base_url = %base_url,
            max_chunk_chars = cfg.max_chunk_chars,
            "Google translator initialized"
        );

        Ok(Self {
            client,
            base_url,
            max_chunk_chars: cfg.max_chunk_chars,
        })
    }

    /// Translate `text` into `target`, auto-detecting the source language.
    pub async fn translate(&self, text: &str, target: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let chunks = chunk_text(text, self.max_chunk_chars);
        debug!(target, chunks = chunks.len(), text_len = text.len(), "translating");

        let mut out = String::with_capacity(text.len());
        for chunk in chunks {
            let body = chunk.trim();
            if body.is_empty() {
                out.push_str(chunk);
                continue;
            }
            // The service drops surrounding whitespace; keep the newlines
            // that separate chunks.
            let leading = &chunk[..chunk.len() - chunk.trim_start().len()];
            let trailing = &chunk[chunk.trim_end().len()..];

            let translated = self.translate_chunk(body, target).await?;
            out.push_str(leading);
            out.push_str(translated.trim());
            out.push_str(trailing);
        }

        info!(target, response_len = out.len(), "translation received");
        Ok(out)
    }

    async fn translate_chunk(&self, chunk: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| EcofertilError::Translation(format!("request failed: {e}")))?;

        let status = resp.status();

        // An unknown target language is rejected with 400.
        if status == StatusCode::BAD_REQUEST {
            warn!(target, "translation service rejected target language");
            return Err(EcofertilError::TranslationUnavailable(target.to_string()));
        }

        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "translation service error");
            return Err(EcofertilError::Translation(format!(
                "translation service returned {status}"
            )));
        }

        let body = resp.text().await?;
        let payload: Value = serde_json::from_str(&body)?;

        parse_segments(&payload).ok_or_else(|| {
            warn!(target, "translation service returned no text");
            EcofertilError::TranslationUnavailable(target.to_string())
        })
    }
}

/// Join the translated segments of a `dt=t` response.
///
/// The payload looks like `[[["translated", "source", ...], ...], null, "en", ...]`.
fn parse_segments(payload: &Value) -> Option<String> {
    let translated: String = payload
        .get(0)?
        .as_array()?
        .iter()
        .filter_map(|seg| seg.get(0).and_then(Value::as_str))
        .collect();

    if translated.trim().is_empty() {
        None
    } else {
        Some(translated)
    }
}
