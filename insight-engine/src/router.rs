use std::sync::Arc;

use insight_core::config::{DiagnosticConfig, ScoringConfig, SnapshotConfig};
use insight_core::models::{
    ClassroomSnapshot, ConversationTurn, DiagnosticAudit, QuickCheck, StruggleDimensions,
};
use insight_core::{
    InsightConfig, InsightError, InsightRequest, InsightResponse, InsightStore, Lexicon, Result,
    SemanticMemory, TextGenerator,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::subsystems::{diagnostic, snapshot, struggle};

/// Shared handle over the collaborators every request needs.
pub struct Engine {
    store: Arc<dyn InsightStore>,
    pool: Option<PgPool>,
    memory: Option<Arc<dyn SemanticMemory>>,
    generator: Option<Arc<dyn TextGenerator>>,
    lexicon: Arc<Lexicon>,
    scoring: ScoringConfig,
    snapshot: SnapshotConfig,
    diagnostic: DiagnosticConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn InsightStore>, lexicon: Lexicon) -> Self {
        Self {
            store,
            pool: None,
            memory: None,
            generator: None,
            lexicon: Arc::new(lexicon),
            scoring: ScoringConfig::default(),
            snapshot: SnapshotConfig::default(),
            diagnostic: DiagnosticConfig::default(),
        }
    }

    /// Engine with the tuning sections of a loaded config file applied.
    pub fn from_config(store: Arc<dyn InsightStore>, lexicon: Lexicon, config: &InsightConfig) -> Self {
        Self::new(store, lexicon)
            .with_scoring(config.scoring.clone())
            .with_snapshot_config(config.snapshot.clone())
            .with_diagnostic_config(config.diagnostic.clone())
    }

    /// Pool used for `health` probes.
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_memory(mut self, memory: Arc<dyn SemanticMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_snapshot_config(mut self, snapshot: SnapshotConfig) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_diagnostic_config(mut self, diagnostic: DiagnosticConfig) -> Self {
        self.diagnostic = diagnostic;
        self
    }

    pub async fn score_session(&self, session_id: Uuid) -> Result<StruggleDimensions> {
        struggle::score_session(self.store.as_ref(), session_id, &self.lexicon).await
    }

    pub fn quick_check(
        &self,
        turns: &[ConversationTurn],
        age: Option<i32>,
        grade_level: Option<&str>,
    ) -> QuickCheck {
        struggle::quick_check(turns, age, grade_level, &self.lexicon, &self.scoring)
    }

    pub async fn snapshot(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<ClassroomSnapshot> {
        snapshot::build_snapshot(
            self.store.as_ref(),
            self.memory.as_deref(),
            classroom_id,
            owner_id,
            &self.snapshot,
        )
        .await
    }

    pub async fn audit(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<DiagnosticAudit> {
        let generator = self
            .generator
            .as_deref()
            .ok_or_else(|| InsightError::Other("No text generator configured".to_string()))?;

        let snapshot = self.snapshot(classroom_id, owner_id).await?;
        diagnostic::generate_audit(generator, &snapshot, &self.diagnostic).await
    }

    pub async fn handle_request(&self, request: InsightRequest) -> InsightResponse {
        match request {
            InsightRequest::Ping => InsightResponse::pong(),
            InsightRequest::Health => self.health().await,
            InsightRequest::ScoreSession { session_id } => {
                respond(self.score_session(session_id).await)
            }
            InsightRequest::QuickCheck { turns, age, grade_level } => {
                respond(Ok(self.quick_check(&turns, age, grade_level.as_deref())))
            }
            InsightRequest::Snapshot { classroom_id, owner_id } => {
                respond(self.snapshot(classroom_id, owner_id).await)
            }
            InsightRequest::Audit { classroom_id, owner_id } => {
                respond(self.audit(classroom_id, owner_id).await)
            }
        }
    }

    async fn health(&self) -> InsightResponse {
        let Some(pool) = &self.pool else {
            return InsightResponse::err("No database pool configured");
        };

        let pg_ver = match insight_core::db::health_check(pool).await {
            Ok(v) => v,
            Err(e) => return InsightResponse::err(format!("DB Health Check failed: {}", e)),
        };
        let vec_ver = match insight_core::db::check_pgvector(pool).await {
            Ok(v) => v,
            Err(e) => return InsightResponse::err(format!("pgvector Check failed: {}", e)),
        };

        InsightResponse::ok(serde_json::json!({
            "postgresql": pg_ver,
            "pgvector": vec_ver,
            "memory": self.memory.is_some(),
            "generator": self.generator.as_ref().map(|g| g.name().to_string()),
            "status": "healthy"
        }))
    }
}

fn respond<T: Serialize>(result: Result<T>) -> InsightResponse {
    match result.and_then(|value| Ok(serde_json::to_value(value)?)) {
        Ok(data) => InsightResponse::ok(data),
        Err(e) => {
            tracing::warn!(error = %e, "Request failed");
            InsightResponse::err(e.to_string())
        }
    }
}
