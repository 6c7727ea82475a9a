use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{EcofertilError, Result};
use crate::llm::prompts::PromptStyle;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Address the web form listens on.  Overridable with `ECOFERTIL_BIND`.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Page heading.
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub translate: TranslateConfig,

    #[serde(default)]
    pub form: FormConfig,
}

// -- LLM -----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Gemini model identifier.
    /// Can be overridden with the `GEMINI_MODEL` env var.
    #[serde(default = "default_model")]
    pub model: String,

    /// Generative Language API base URL (up to and including the version).
    /// Can be overridden with the `GEMINI_BASE_URL` env var.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: String,

    /// HTTP timeout in seconds (0 = no timeout).
    #[serde(default)]
    pub timeout_secs: u64,
}

// -- Translation ---------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateConfig {
    /// Can be overridden with the `TRANSLATE_BASE_URL` env var.
    #[serde(default = "default_translate_base_url")]
    pub base_url: String,

    /// Language whose selection skips the translation step.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Upper bound on characters sent per translation request.
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// HTTP timeout in seconds (0 = no timeout).
    #[serde(default)]
    pub timeout_secs: u64,
}

// -- Form ----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub prompt_style: PromptStyle,

    #[serde(default = "default_true")]
    pub show_carousel: bool,
}

// -- Defaults ------------------------------------------------------------

fn default_bind() -> String {
    "127.0.0.1:8050".into()
}
fn default_title() -> String {
    "🌿 Sustainable Farming & Fertilizer Optimizer".into()
}
fn default_model() -> String {
    "gemini-1.5-flash-8b-exp-0827".into()
}
fn default_llm_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    2048
}
fn default_response_mime_type() -> String {
    "text/plain".into()
}
fn default_translate_base_url() -> String {
    "https://translate.googleapis.com".into()
}
fn default_language() -> String {
    "english".into()
}
fn default_max_chunk_chars() -> usize {
    4500
}
fn default_true() -> bool {
    true
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_llm_base_url(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            response_mime_type: default_response_mime_type(),
            timeout_secs: 0,
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            base_url: default_translate_base_url(),
            default_language: default_language(),
            max_chunk_chars: default_max_chunk_chars(),
            timeout_secs: 0,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            prompt_style: PromptStyle::default(),
            show_carousel: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
            llm: LlmConfig::default(),
            translate: TranslateConfig::default(),
            form: FormConfig::default(),
        }
    }
}

// -- Config impl ---------------------------------------------------------

impl Config {
    /// Load config from the given path, or the default XDG config location,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        let mut config = if config_path.exists() {
            info!("loading config from {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)
                .map_err(|e| EcofertilError::Config(format!("parse error: {e}")))?
        } else {
            info!("no config file found, using defaults");
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEMINI_MODEL`, `GEMINI_BASE_URL`, `TRANSLATE_BASE_URL` and
    /// `ECOFERTIL_BIND` from `lookup`.  Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("ECOFERTIL_BIND") {
            self.bind = v;
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = get("GEMINI_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = get("TRANSLATE_BASE_URL") {
            self.translate.base_url = v;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.translate.max_chunk_chars == 0 {
            return Err(EcofertilError::Config(
                "translate.max_chunk_chars must be greater than zero".into(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(EcofertilError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }

    /// Returns the default config file path: `$XDG_CONFIG_HOME/ecofertil/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("ecofertil")
            .join("config.toml")
    }

    /// Get the Gemini API key from the environment.
    pub fn gemini_api_key() -> Result<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                EcofertilError::Config("GEMINI_API_KEY environment variable is not set".into())
            })
    }

    /// Generate the default config file contents.
    pub fn default_config_contents() -> &'static str {
        include_str!("../config.example.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_has_expected_values() {
        let c = Config::default();
        assert_eq!(c.bind, "127.0.0.1:8050");
        assert!(c.title.contains("Fertilizer Optimizer"));
        assert_eq!(c.form.prompt_style, PromptStyle::Detailed);
        assert!(c.form.show_carousel);
    }

    #[test]
    fn default_llm_config() {
        let llm = LlmConfig::default();
        assert_eq!(llm.model, "gemini-1.5-flash-8b-exp-0827");
        assert!((llm.temperature - 0.7).abs() < 0.001);
        assert!((llm.top_p - 0.9).abs() < 0.001);
        assert_eq!(llm.top_k, 40);
        assert_eq!(llm.max_output_tokens, 2048);
        assert_eq!(llm.response_mime_type, "text/plain");
        assert_eq!(llm.timeout_secs, 0);
    }

    #[test]
    fn default_translate_config() {
        let t = TranslateConfig::default();
        assert_eq!(t.base_url, "https://translate.googleapis.com");
        assert_eq!(t.default_language, "english");
        assert_eq!(t.max_chunk_chars, 4500);
    }

    #[test]
    fn parse_minimal_toml() {
        let c: Config = toml::from_str(r#"bind = "0.0.0.0:9000""#).unwrap();
        assert_eq!(c.bind, "0.0.0.0:9000");
        assert_eq!(c.llm.top_k, 40);
        assert_eq!(c.translate.default_language, "english");
    }

    #[test]
    fn parse_sections() {
        let toml_str = r#"
        [llm]
        model = "gemini-2.0-flash"
        temperature = 0.2

        [translate]
        max_chunk_chars = 1000

        [form]
        prompt_style = "concise"
        show_carousel = false
        "#;
        let c: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(c.llm.model, "gemini-2.0-flash");
        assert!((c.llm.temperature - 0.2).abs() < 0.001);
        assert!((c.llm.top_p - 0.9).abs() < 0.001);
        assert_eq!(c.translate.max_chunk_chars, 1000);
        assert_eq!(c.form.prompt_style, PromptStyle::Concise);
        assert!(!c.form.show_carousel);
    }

    #[test]
    fn example_config_parses_to_defaults() {
        let c: Config = toml::from_str(Config::default_config_contents()).unwrap();
        let d = Config::default();
        assert_eq!(c.bind, d.bind);
        assert_eq!(c.title, d.title);
        assert_eq!(c.llm.model, d.llm.model);
        assert_eq!(c.llm.base_url, d.llm.base_url);
        assert_eq!(c.translate.base_url, d.translate.base_url);
        assert_eq!(c.form.prompt_style, d.form.prompt_style);
    }

    #[test]
    fn overrides_replace_non_empty_values_only() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_MODEL", "gemini-pro"),
            ("GEMINI_BASE_URL", ""),
            ("TRANSLATE_BASE_URL", "http://127.0.0.1:9999"),
        ]
        .into_iter()
        .collect();

        let mut c = Config::default();
        c.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(c.llm.model, "gemini-pro");
        assert_eq!(c.llm.base_url, default_llm_base_url());
        assert_eq!(c.translate.base_url, "http://127.0.0.1:9999");
        assert_eq!(c.bind, "127.0.0.1:8050");
    }

    #[test]
    fn load_nonexistent_returns_defaults() {
        let c = Config::load(Some(Path::new("/tmp/nonexistent-ecofertil-test.toml"))).unwrap();
        assert_eq!(c.translate.max_chunk_chars, 4500);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[form]\nprompt_style = \"concise\"\n").unwrap();
        let c = Config::load(Some(&path)).unwrap();
        assert_eq!(c.form.prompt_style, PromptStyle::Concise);
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid %%% toml").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(EcofertilError::Config(_))
        ));
    }

    #[test]
    fn load_rejects_zero_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[translate]\nmax_chunk_chars = 0\n").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn default_config_path_has_ecofertil() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("ecofertil"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn gemini_api_key_missing_or_empty_errors() {
        unsafe { std::env::remove_var("GEMINI_API_KEY"); }
        assert!(matches!(Config::gemini_api_key(), Err(EcofertilError::Config(_))));

        unsafe { std::env::set_var("GEMINI_API_KEY", ""); }
        assert!(Config::gemini_api_key().is_err());

        unsafe { std::env::set_var("GEMINI_API_KEY", "k"); }
        assert_eq!(Config::gemini_api_key().unwrap(), "k");

        unsafe { std::env::remove_var("GEMINI_API_KEY"); }
    }
}
