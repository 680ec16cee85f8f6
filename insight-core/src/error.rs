use thiserror::Error;

use crate::generation::GenerationError;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upstream generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Diagnostic parse error: {0}")]
    DiagnosticParse(String),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Lexicon pattern error: {0}")]
    Lexicon(#[from] regex::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, InsightError>;
