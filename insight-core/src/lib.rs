pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod lexicon;
pub mod memory;
pub mod models;
pub mod request;
pub mod store;

pub use config::InsightConfig;
pub use embeddings::{EmbeddingBackend, EmbeddingConfig, EmbeddingError, GeminiEmbeddingClient};
pub use error::{InsightError, Result};
pub use generation::{GeminiTextClient, GenerationConfig, GenerationError, TextGenerator};
pub use lexicon::Lexicon;
pub use memory::{PgSemanticMemory, SemanticMemory};
pub use request::{InsightRequest, InsightResponse};
pub use store::{InsightStore, PgInsightStore};
