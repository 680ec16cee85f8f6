//! Typed requests accepted by the engine and the uniform response envelope.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ConversationTurn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InsightRequest {
    Ping,
    Health,
    /// Score a stored session and persist the result.
    ScoreSession {
        session_id: Uuid,
    },
    /// Score an in-flight transcript without persisting anything.
    QuickCheck {
        turns: Vec<ConversationTurn>,
        #[serde(default)]
        age: Option<i32>,
        #[serde(default)]
        grade_level: Option<String>,
    },
    Snapshot {
        classroom_id: Uuid,
        owner_id: Uuid,
    },
    Audit {
        classroom_id: Uuid,
        owner_id: Uuid,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InsightResponse {
    pub status: String,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub version: String,
}

impl InsightResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: "ok".to_string(),
            data: Some(data),
            error: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            error: Some(msg.into()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(serde_json::json!({"pong": true}))
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
