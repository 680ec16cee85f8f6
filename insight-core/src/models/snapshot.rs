use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::struggle::{Dimension, StruggleDimensions};

/// Classroom header, scoped to its owning teacher.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClassroomInfo {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentInfo {
    pub id: Uuid,
    pub name: String,
    pub grade_level: Option<String>,
    pub age: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LessonInfo {
    pub id: Uuid,
    pub title: String,
    pub topic: String,
    pub subject: String,
}

/// Externally computed rubric grade for a homework submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub accuracy: f64,
    pub reasoning: f64,
    pub effort: f64,
}

/// Activity the store found for one (student, lesson) pair. Pairs with no
/// activity may be absent entirely or present with every field `None`.
#[derive(Debug, Clone, Default)]
pub struct CellActivity {
    pub student_id: Uuid,
    pub lesson_id: Uuid,
    pub struggle_score: Option<f64>,
    pub struggle_dimensions: Option<StruggleDimensions>,
    pub comprehension_score: Option<f64>,
    pub exit_ticket_passed: Option<bool>,
    pub rubric_scores: Option<RubricScores>,
    pub submission_grade: Option<f64>,
}

/// One scored session, joined to the topic of the lesson it belongs to.
#[derive(Debug, Clone)]
pub struct TopicStruggleRecord {
    pub student_id: Uuid,
    pub topic: String,
    pub subject: String,
    pub dimensions: StruggleDimensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicCell {
    pub struggle_score: Option<f64>,
    pub struggle_dimensions: Option<StruggleDimensions>,
    pub comprehension_score: Option<f64>,
    pub exit_ticket_passed: Option<bool>,
    pub rubric_scores: Option<RubricScores>,
    pub submission_grade: Option<f64>,
    pub has_data: bool,
}

impl TopicCell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_activity(activity: &CellActivity) -> Self {
        let has_data = activity.struggle_score.is_some()
            || activity.struggle_dimensions.is_some()
            || activity.comprehension_score.is_some()
            || activity.exit_ticket_passed.is_some()
            || activity.rubric_scores.is_some()
            || activity.submission_grade.is_some();

        Self {
            struggle_score: activity.struggle_score,
            struggle_dimensions: activity.struggle_dimensions,
            comprehension_score: activity.comprehension_score,
            exit_ticket_passed: activity.exit_ticket_passed,
            rubric_scores: activity.rubric_scores,
            submission_grade: activity.submission_grade,
            has_data,
        }
    }
}

/// A student and their row of cells, keyed by lesson id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: Uuid,
    pub name: String,
    pub grade_level: Option<String>,
    pub age: Option<i32>,
    pub cells: BTreeMap<Uuid, TopicCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticCluster {
    pub topic: String,
    pub subject: String,
    pub avg_struggle_score: f64,
    pub student_count: usize,
    pub student_ids: Vec<Uuid>,
    pub dominant_dimension: Dimension,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_insight: Option<String>,
}

/// Point-in-time student x lesson matrix for one classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomSnapshot {
    pub classroom_id: Uuid,
    pub classroom_name: String,
    pub generated_at: DateTime<Utc>,
    pub lessons: Vec<LessonInfo>,
    pub students: Vec<StudentRow>,
    pub clusters: Vec<SemanticCluster>,
}

impl ClassroomSnapshot {
    pub fn cell_count(&self) -> usize {
        self.students.iter().map(|s| s.cells.len()).sum()
    }
}
