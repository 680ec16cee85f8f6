//! Storage collaborator
//!
//! `InsightStore` is the only path the engine uses to reach persisted data.
//! `PgInsightStore` implements it over the tutoring platform's Postgres schema:
//!
//! - `classrooms(id, name, teacher_id)`, `classroom_students(classroom_id, student_id)`
//! - `users(id, name, grade_level, age)`
//! - `lessons(id, classroom_id, title, topic, subject, created_at)`
//! - `personalized_lessons(id, lesson_id, student_id)`
//! - `tutoring_sessions(id, student_id, personalized_lesson_id, struggle_score,
//!   struggle_dimensions jsonb, comprehension_score, exit_ticket_passed, updated_at)`
//! - `session_messages(id, session_id, role, content, created_at)`
//! - `homework_submissions(id, student_id, topic, rubric_scores jsonb, grade, submitted_at)`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{InsightError, Result};
use crate::models::{
    CellActivity, ClassroomInfo, ConversationTurn, LearnerProfile, LessonInfo, RubricScores,
    StruggleDimensions, StudentInfo, TopicStruggleRecord, TurnRole,
};

#[async_trait]
pub trait InsightStore: Send + Sync {
    /// Turns of a session in conversational order.
    async fn session_turns(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>>;

    /// Age and grade of the student who owns the session.
    async fn session_learner(&self, session_id: Uuid) -> Result<Option<LearnerProfile>>;

    /// Overwrite the session's struggle record (structured + flat score).
    async fn write_struggle(&self, session_id: Uuid, dims: &StruggleDimensions) -> Result<()>;

    async fn read_struggle(&self, session_id: Uuid) -> Result<Option<StruggleDimensions>>;

    /// The classroom, only if `owner_id` owns it.
    async fn classroom(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<Option<ClassroomInfo>>;

    async fn students(&self, classroom_id: Uuid) -> Result<Vec<StudentInfo>>;

    async fn lessons(&self, classroom_id: Uuid) -> Result<Vec<LessonInfo>>;

    /// Latest session record and latest rubric-graded submission per (student, lesson).
    async fn cell_activity(&self, classroom_id: Uuid) -> Result<Vec<CellActivity>>;

    /// Every scored session in the classroom whose composite exceeds `min_composite`,
    /// ordered by topic, then session update time, then student.
    async fn topic_struggle(
        &self,
        classroom_id: Uuid,
        min_composite: f64,
    ) -> Result<Vec<TopicStruggleRecord>>;
}

// ============================================================================
// Postgres implementation
// ============================================================================

#[derive(Clone)]
pub struct PgInsightStore {
    pool: PgPool,
}

impl PgInsightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct TurnRow {
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CellRow {
    student_id: Uuid,
    lesson_id: Uuid,
    struggle_score: Option<f64>,
    struggle_dimensions: Option<Json<StruggleDimensions>>,
    comprehension_score: Option<f64>,
    exit_ticket_passed: Option<bool>,
    rubric_scores: Option<Json<RubricScores>>,
    submission_grade: Option<f64>,
}

#[derive(sqlx::FromRow)]
struct TopicRow {
    student_id: Uuid,
    topic: String,
    subject: String,
    struggle_dimensions: Json<StruggleDimensions>,
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn session_turns(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>> {
        let rows = sqlx::query_as::<_, TurnRow>(
            r#"
            SELECT role, content, created_at
            FROM session_messages
            WHERE session_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ConversationTurn {
                role: TurnRole::from_stored(&r.role),
                content: r.content,
                timestamp: r.created_at,
            })
            .collect())
    }

    async fn session_learner(&self, session_id: Uuid) -> Result<Option<LearnerProfile>> {
        let profile = sqlx::query_as::<_, LearnerProfile>(
            r#"
            SELECT u.age, u.grade_level
            FROM tutoring_sessions t
            JOIN users u ON u.id = t.student_id
            WHERE t.id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn write_struggle(&self, session_id: Uuid, dims: &StruggleDimensions) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE tutoring_sessions
            SET struggle_dimensions = $1,
                struggle_score = $2,
                updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(Json(dims))
        .bind(dims.composite)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InsightError::NotFound(format!("session {}", session_id)));
        }
        Ok(())
    }

    async fn read_struggle(&self, session_id: Uuid) -> Result<Option<StruggleDimensions>> {
        let row: Option<(Option<Json<StruggleDimensions>>,)> = sqlx::query_as(
            "SELECT struggle_dimensions FROM tutoring_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|(dims,)| dims).map(|Json(d)| d))
    }

    async fn classroom(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<Option<ClassroomInfo>> {
        let classroom = sqlx::query_as::<_, ClassroomInfo>(
            r#"
            SELECT id, name, teacher_id AS owner_id
            FROM classrooms
            WHERE id = $1 AND teacher_id = $2
            "#,
        )
        .bind(classroom_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(classroom)
    }

    async fn students(&self, classroom_id: Uuid) -> Result<Vec<StudentInfo>> {
        let rows = sqlx::query_as::<_, StudentInfo>(
            r#"
            SELECT u.id, u.name, u.grade_level, u.age
            FROM classroom_students cs
            JOIN users u ON u.id = cs.student_id
            WHERE cs.classroom_id = $1
            ORDER BY u.name, u.id
            "#,
        )
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn lessons(&self, classroom_id: Uuid) -> Result<Vec<LessonInfo>> {
        let rows = sqlx::query_as::<_, LessonInfo>(
            r#"
            SELECT id, title, topic, subject
            FROM lessons
            WHERE classroom_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn cell_activity(&self, classroom_id: Uuid) -> Result<Vec<CellActivity>> {
        // Full cross product: pairs with no activity come back with NULL columns.
        let rows = sqlx::query_as::<_, CellRow>(
            r#"
            SELECT
                cs.student_id,
                l.id AS lesson_id,
                ts.struggle_score,
                ts.struggle_dimensions,
                ts.comprehension_score,
                ts.exit_ticket_passed,
                hw.rubric_scores,
                hw.grade AS submission_grade
            FROM classroom_students cs
            CROSS JOIN lessons l
            LEFT JOIN LATERAL (
                SELECT t.struggle_score, t.struggle_dimensions,
                       t.comprehension_score, t.exit_ticket_passed
                FROM tutoring_sessions t
                JOIN personalized_lessons pl ON pl.id = t.personalized_lesson_id
                WHERE pl.lesson_id = l.id
                  AND pl.student_id = cs.student_id
                ORDER BY t.updated_at DESC
                LIMIT 1
            ) ts ON true
            LEFT JOIN LATERAL (
                SELECT h.rubric_scores, h.grade
                FROM homework_submissions h
                WHERE h.student_id = cs.student_id
                  AND h.topic = l.topic
                  AND h.rubric_scores IS NOT NULL
                ORDER BY h.submitted_at DESC
                LIMIT 1
            ) hw ON true
            WHERE cs.classroom_id = $1
              AND l.classroom_id = $1
            "#,
        )
        .bind(classroom_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CellActivity {
                student_id: r.student_id,
                lesson_id: r.lesson_id,
                struggle_score: r.struggle_score,
                struggle_dimensions: r.struggle_dimensions.map(|Json(d)| d),
                comprehension_score: r.comprehension_score,
                exit_ticket_passed: r.exit_ticket_passed,
                rubric_scores: r.rubric_scores.map(|Json(s)| s),
                submission_grade: r.submission_grade,
            })
            .collect())
    }

    async fn topic_struggle(
        &self,
        classroom_id: Uuid,
        min_composite: f64,
    ) -> Result<Vec<TopicStruggleRecord>> {
        let rows = sqlx::query_as::<_, TopicRow>(
            r#"
            SELECT pl.student_id, l.topic, l.subject, t.struggle_dimensions
            FROM tutoring_sessions t
            JOIN personalized_lessons pl ON pl.id = t.personalized_lesson_id
            JOIN lessons l ON l.id = pl.lesson_id
            WHERE l.classroom_id = $1
              AND t.struggle_score > $2
              AND t.struggle_dimensions IS NOT NULL
            ORDER BY l.topic, t.updated_at, pl.student_id
            "#,
        )
        .bind(classroom_id)
        .bind(min_composite)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopicStruggleRecord {
                student_id: r.student_id,
                topic: r.topic,
                subject: r.subject,
                dimensions: r.struggle_dimensions.0,
            })
            .collect())
    }
}
