use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Student,
    Tutor,
}

impl TurnRole {
    /// Maps a stored role column to a turn role. Chat-style `user` rows are
    /// authored by the student; everything else came from the tutor side.
    pub fn from_stored(role: &str) -> Self {
        match role.to_ascii_lowercase().as_str() {
            "student" | "user" => TurnRole::Student,
            _ => TurnRole::Tutor,
        }
    }
}

/// One message in a tutoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn student(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Student, content)
    }

    pub fn tutor(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Tutor, content)
    }

    pub fn is_student(&self) -> bool {
        self.role == TurnRole::Student
    }
}

/// Age and grade bracket of the student a session belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearnerProfile {
    pub age: Option<i32>,
    pub grade_level: Option<String>,
}
