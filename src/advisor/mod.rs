//! The recommendation form handler.
//!
//! A [`Submission`] carries a picklist value and a free-text override for
//! each of soil, crop and weather.  [`Advisor::recommend`] resolves them,
//! asks the generative backend once, strips markdown markers from the
//! reply and optionally translates it.  Every path ends in an [`Outcome`]
//! whose [`Outcome::message`] is what the page displays.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::config::Config;
use crate::error::EcofertilError;
use crate::llm::prompts::{self, PromptStyle};
use crate::llm::{GenerationParams, LlmBackend};
use crate::translate::Translator;

pub const INCOMPLETE_MESSAGE: &str = "Please provide input for all required fields.";
pub const TRANSLATION_UNAVAILABLE_MESSAGE: &str =
    "Translation service is unavailable for the selected language.";

/// One press of the submit button.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Submission {
    /// Number of times the submit button has been pressed.
    #[serde(default)]
    pub n_clicks: u64,
    #[serde(default)]
    pub soil_pick: Option<String>,
    #[serde(default)]
    pub soil_text: Option<String>,
    #[serde(default)]
    pub crop_pick: Option<String>,
    #[serde(default)]
    pub crop_text: Option<String>,
    #[serde(default)]
    pub weather_pick: Option<String>,
    #[serde(default)]
    pub weather_text: Option<String>,
    /// Target language name or code; `None` keeps the model's output.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Soil,
    Crop,
    Weather,
}

/// The three values that go into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInputs<'a> {
    pub soil: &'a str,
    pub crop: &'a str,
    pub weather: &'a str,
}

/// Free text wins when non-empty, otherwise the picklist value.
pub fn resolve_field<'a>(pick: Option<&'a str>, text: Option<&'a str>) -> Option<&'a str> {
    text.filter(|t| !t.is_empty())
        .or(pick)
        .filter(|v| !v.is_empty())
}

impl Submission {
    /// Resolve all three categories, or list the ones left empty.
    pub fn resolve(&self) -> Result<ResolvedInputs<'_>, Vec<Category>> {
        let soil = resolve_field(self.soil_pick.as_deref(), self.soil_text.as_deref());
        let crop = resolve_field(self.crop_pick.as_deref(), self.crop_text.as_deref());
        let weather = resolve_field(self.weather_pick.as_deref(), self.weather_text.as_deref());

        match (soil, crop, weather) {
            (Some(soil), Some(crop), Some(weather)) => Ok(ResolvedInputs { soil, crop, weather }),
            _ => {
                let missing = [
                    (Category::Soil, soil),
                    (Category::Crop, crop),
                    (Category::Weather, weather),
                ]
                .into_iter()
                .filter(|(_, v)| v.is_none())
                .map(|(c, _)| c)
                .collect();
                Err(missing)
            }
        }
    }
}

/// Turn `## ` headings into paragraph breaks and drop `**` bold markers.
pub fn clean_markdown(text: &str) -> String {
    text.replace("## ", "\n\n").replace("**", "")
}

/// Result of handling one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The button has not been pressed yet.
    Idle,
    Incomplete,
    Recommendation(String),
    GenerationFailed(String),
    TranslationUnavailable,
    TranslationFailed(String),
}

impl Outcome {
    /// Machine-readable tag for API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Idle => "idle",
            Outcome::Incomplete => "incomplete",
            Outcome::Recommendation(_) => "recommendation",
            Outcome::GenerationFailed(_) => "generation_failed",
            Outcome::TranslationUnavailable => "translation_unavailable",
            Outcome::TranslationFailed(_) => "translation_failed",
        }
    }

    /// The string shown in the output region.
    pub fn message(&self) -> String {
        match self {
            Outcome::Idle => String::new(),
            Outcome::Incomplete => INCOMPLETE_MESSAGE.to_string(),
            Outcome::Recommendation(text) => text.clone(),
            Outcome::GenerationFailed(e) => format!("Error generating recommendations: {e}"),
            Outcome::TranslationUnavailable => TRANSLATION_UNAVAILABLE_MESSAGE.to_string(),
            Outcome::TranslationFailed(e) => format!("Error during translation: {e}"),
        }
    }
}

/// Provider-side description of a failure, without the crate-level prefix.
fn describe(err: EcofertilError) -> String {
    match err {
        EcofertilError::Llm(msg) | EcofertilError::Translation(msg) => msg,
        other => other.to_string(),
    }
}

/// Handles form submissions against a generative backend and a translator.
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct Advisor {
    llm: Arc<dyn LlmBackend>,
    translator: Arc<dyn Translator>,
    params: GenerationParams,
    style: PromptStyle,
    default_language: String,
}

impl Advisor {
    pub fn new(
        config: &Config,
        llm: Arc<dyn LlmBackend>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            llm,
            translator,
            params: GenerationParams::from(&config.llm),
            style: config.form.prompt_style,
            default_language: config.translate.default_language.clone(),
        }
    }

    pub async fn recommend(&self, submission: &Submission) -> Outcome {
        if submission.n_clicks == 0 {
            return Outcome::Idle;
        }

        let inputs = match submission.resolve() {
            Ok(inputs) => inputs,
            Err(missing) => {
                info!(?missing, "incomplete submission");
                return Outcome::Incomplete;
            }
        };

        let prompt =
            prompts::recommendation_prompt(self.style, inputs.soil, inputs.crop, inputs.weather);
        debug!(backend = self.llm.name(), prompt_len = prompt.len(), "requesting recommendation");

        let raw = match self.llm.generate(&prompt, &self.params).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "generation failed");
                return Outcome::GenerationFailed(describe(e));
            }
        };

        let text = clean_markdown(&raw);
        self.localize(text, submission.language.as_deref()).await
    }

    /// Translate `text` unless `language` is absent or the default.
    async fn localize(&self, text: String, language: Option<&str>) -> Outcome {
        let Some(requested) = language.map(str::trim).filter(|l| !l.is_empty()) else {
            return Outcome::Recommendation(text);
        };

        if self.is_default_language(requested) {
            return Outcome::Recommendation(text);
        }

        let Some(target) = catalog::find_language(requested) else {
            warn!(language = requested, "unsupported target language");
            return Outcome::TranslationUnavailable;
        };

        match self.translator.translate(&text, target.code).await {
            Ok(translated) => Outcome::Recommendation(translated),
            Err(EcofertilError::TranslationUnavailable(lang)) => {
                warn!(language = %lang, "translation unavailable");
                Outcome::TranslationUnavailable
            }
            Err(e) => {
                warn!(error = %e, target = target.code, "translation failed");
                Outcome::TranslationFailed(describe(e))
            }
        }
    }

    fn is_default_language(&self, requested: &str) -> bool {
        if requested.eq_ignore_ascii_case(&self.default_language) {
            return true;
        }
        match (
            catalog::find_language(requested),
            catalog::find_language(&self.default_language),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}
