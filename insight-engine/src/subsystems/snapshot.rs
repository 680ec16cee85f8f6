//! Classroom snapshot builder
//!
//! Builds the full student x lesson matrix for one classroom. Every pair gets
//! a cell, including pairs with no activity (`has_data = false`), so callers
//! can render a complete grid. Topic clusters are derived from stored struggle
//! scores and, when a memory collaborator is present, enriched best-effort.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use insight_core::config::SnapshotConfig;
use insight_core::models::{CellActivity, ClassroomSnapshot, StudentRow, TopicCell};
use insight_core::{InsightError, InsightStore, Result, SemanticMemory};
use uuid::Uuid;

use super::cluster::{enrich_clusters, form_clusters};

pub async fn build_snapshot(
    store: &dyn InsightStore,
    memory: Option<&dyn SemanticMemory>,
    classroom_id: Uuid,
    requester_id: Uuid,
    config: &SnapshotConfig,
) -> Result<ClassroomSnapshot> {
    let classroom = store
        .classroom(classroom_id, requester_id)
        .await?
        .ok_or_else(|| InsightError::NotFound(format!("classroom {}", classroom_id)))?;

    let (students, lessons, activity, struggle) = tokio::try_join!(
        store.students(classroom_id),
        store.lessons(classroom_id),
        store.cell_activity(classroom_id),
        store.topic_struggle(classroom_id, config.cluster_activation_threshold),
    )?;

    let activity: HashMap<(Uuid, Uuid), CellActivity> = activity
        .into_iter()
        .map(|a| ((a.student_id, a.lesson_id), a))
        .collect();

    let students: Vec<StudentRow> = students
        .into_iter()
        .map(|student| {
            let cells: BTreeMap<Uuid, TopicCell> = lessons
                .iter()
                .map(|lesson| {
                    let cell = activity
                        .get(&(student.id, lesson.id))
                        .map(TopicCell::from_activity)
                        .unwrap_or_else(TopicCell::empty);
                    (lesson.id, cell)
                })
                .collect();

            StudentRow {
                id: student.id,
                name: student.name,
                grade_level: student.grade_level,
                age: student.age,
                cells,
            }
        })
        .collect();

    let mut clusters = form_clusters(&struggle, config);
    match memory {
        Some(memory) if !clusters.is_empty() => enrich_clusters(&mut clusters, memory, config).await,
        _ => {}
    }

    let snapshot = ClassroomSnapshot {
        classroom_id,
        classroom_name: classroom.name,
        generated_at: Utc::now(),
        lessons,
        students,
        clusters,
    };

    tracing::info!(
        classroom_id = %classroom_id,
        students = snapshot.students.len(),
        lessons = snapshot.lessons.len(),
        cells = snapshot.cell_count(),
        clusters = snapshot.clusters.len(),
        "Classroom snapshot built"
    );

    Ok(snapshot)
}
