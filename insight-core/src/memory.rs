//! Semantic memory collaborator
//!
//! Recalls short free-text excerpts a student produced about a topic. Used
//! only to enrich clusters; every failure here is recoverable by the caller.

use std::sync::Arc;

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use uuid::Uuid;

use crate::embeddings::EmbeddingBackend;

#[async_trait]
pub trait SemanticMemory: Send + Sync {
    /// Up to `limit` excerpts for this student most related to `topic`.
    async fn recall(&self, student_id: Uuid, topic: &str, limit: usize) -> anyhow::Result<Vec<String>>;
}

/// pgvector-backed recall over `student_memories`.
///
/// Expects `student_memories(student_id uuid, content text, embedding vector)`.
pub struct PgSemanticMemory {
    pool: PgPool,
    backend: Arc<dyn EmbeddingBackend>,
}

impl PgSemanticMemory {
    pub fn new(pool: PgPool, backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { pool, backend }
    }
}

#[async_trait]
impl SemanticMemory for PgSemanticMemory {
    async fn recall(&self, student_id: Uuid, topic: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let query_vector = Vector::from(self.backend.embed_query(topic).await?);

        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT content
            FROM student_memories
            WHERE student_id = $1
              AND embedding IS NOT NULL
            ORDER BY embedding <=> $2::vector
            LIMIT $3
            "#,
        )
        .bind(student_id)
        .bind(&query_vector)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(content,)| content).collect())
    }
}
