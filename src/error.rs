use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcofertilError {
    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("translation error: {0}")]
    Translation(String),

    /// The translation service has nothing for the requested target language.
    #[error("translation unavailable for language: {0}")]
    TranslationUnavailable(String),
}

pub type Result<T> = std::result::Result<T, EcofertilError>;
