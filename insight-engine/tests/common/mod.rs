//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use insight_core::models::{
    CellActivity, ClassroomInfo, ConversationTurn, LearnerProfile, LessonInfo, StruggleDimensions,
    StudentInfo, TopicStruggleRecord,
};
use insight_core::{
    GenerationError, InsightError, InsightStore, Lexicon, Result, SemanticMemory, TextGenerator,
};
use uuid::Uuid;

pub fn lexicon() -> Lexicon {
    Lexicon::bundled().expect("bundled lexicon compiles")
}

pub fn dims(socratic: f64, persistence: f64, frustration: f64, composite: f64) -> StruggleDimensions {
    StruggleDimensions {
        socratic_depth: socratic,
        error_persistence: persistence,
        frustration_sentiment: frustration,
        composite,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub turns: HashMap<Uuid, Vec<ConversationTurn>>,
    pub learners: HashMap<Uuid, LearnerProfile>,
    pub struggle: Mutex<HashMap<Uuid, StruggleDimensions>>,
    pub classroom: Option<ClassroomInfo>,
    pub students: Vec<StudentInfo>,
    pub lessons: Vec<LessonInfo>,
    pub activity: Vec<CellActivity>,
    pub records: Vec<TopicStruggleRecord>,
}

impl MemoryStore {
    /// A classroom owned by `owner_id` with `students` x `lessons` roster.
    pub fn classroom(owner_id: Uuid, students: usize, lessons: usize) -> Self {
        let classroom_id = Uuid::new_v4();
        Self {
            classroom: Some(ClassroomInfo {
                id: classroom_id,
                name: "Period 3 Math".to_string(),
                owner_id,
            }),
            students: (0..students)
                .map(|i| StudentInfo {
                    id: Uuid::new_v4(),
                    name: format!("Student {}", i),
                    grade_level: Some("5".to_string()),
                    age: Some(10),
                })
                .collect(),
            lessons: (0..lessons)
                .map(|i| LessonInfo {
                    id: Uuid::new_v4(),
                    title: format!("Lesson {}", i),
                    topic: format!("topic-{}", i),
                    subject: "Math".to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn classroom_id(&self) -> Uuid {
        self.classroom.as_ref().map(|c| c.id).unwrap_or_default()
    }

    pub fn record(&mut self, student: usize, topic: &str, dims: StruggleDimensions) {
        self.records.push(TopicStruggleRecord {
            student_id: self.students[student].id,
            topic: topic.to_string(),
            subject: "Math".to_string(),
            dimensions: dims,
        });
    }
}

#[async_trait]
impl InsightStore for MemoryStore {
    async fn session_turns(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>> {
        self.turns
            .get(&session_id)
            .cloned()
            .ok_or_else(|| InsightError::NotFound(format!("session {}", session_id)))
    }

    async fn session_learner(&self, session_id: Uuid) -> Result<Option<LearnerProfile>> {
        Ok(self.learners.get(&session_id).cloned())
    }

    async fn write_struggle(&self, session_id: Uuid, dims: &StruggleDimensions) -> Result<()> {
        self.struggle.lock().unwrap().insert(session_id, *dims);
        Ok(())
    }

    async fn read_struggle(&self, session_id: Uuid) -> Result<Option<StruggleDimensions>> {
        Ok(self.struggle.lock().unwrap().get(&session_id).copied())
    }

    async fn classroom(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<Option<ClassroomInfo>> {
        Ok(self
            .classroom
            .clone()
            .filter(|c| c.id == classroom_id && c.owner_id == owner_id))
    }

    async fn students(&self, _classroom_id: Uuid) -> Result<Vec<StudentInfo>> {
        Ok(self.students.clone())
    }

    async fn lessons(&self, _classroom_id: Uuid) -> Result<Vec<LessonInfo>> {
        Ok(self.lessons.clone())
    }

    async fn cell_activity(&self, _classroom_id: Uuid) -> Result<Vec<CellActivity>> {
        Ok(self.activity.clone())
    }

    async fn topic_struggle(
        &self,
        _classroom_id: Uuid,
        min_composite: f64,
    ) -> Result<Vec<TopicStruggleRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.dimensions.composite > min_composite)
            .cloned()
            .collect())
    }
}

/// Serves turns but rejects every write.
pub struct FailingStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl InsightStore for FailingStore {
    async fn session_turns(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>> {
        self.inner.session_turns(session_id).await
    }

    async fn session_learner(&self, session_id: Uuid) -> Result<Option<LearnerProfile>> {
        self.inner.session_learner(session_id).await
    }

    async fn write_struggle(&self, session_id: Uuid, _dims: &StruggleDimensions) -> Result<()> {
        Err(InsightError::Other(format!("write rejected for {}", session_id)))
    }

    async fn read_struggle(&self, _session_id: Uuid) -> Result<Option<StruggleDimensions>> {
        Ok(None)
    }

    async fn classroom(&self, classroom_id: Uuid, owner_id: Uuid) -> Result<Option<ClassroomInfo>> {
        self.inner.classroom(classroom_id, owner_id).await
    }

    async fn students(&self, classroom_id: Uuid) -> Result<Vec<StudentInfo>> {
        self.inner.students(classroom_id).await
    }

    async fn lessons(&self, classroom_id: Uuid) -> Result<Vec<LessonInfo>> {
        self.inner.lessons(classroom_id).await
    }

    async fn cell_activity(&self, classroom_id: Uuid) -> Result<Vec<CellActivity>> {
        self.inner.cell_activity(classroom_id).await
    }

    async fn topic_struggle(
        &self,
        classroom_id: Uuid,
        min_composite: f64,
    ) -> Result<Vec<TopicStruggleRecord>> {
        self.inner.topic_struggle(classroom_id, min_composite).await
    }
}

/// Returns one excerpt per recall, naming the topic.
pub struct EchoMemory {
    pub calls: Mutex<Vec<(Uuid, String)>>,
}

impl EchoMemory {
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SemanticMemory for EchoMemory {
    async fn recall(&self, student_id: Uuid, topic: &str, _limit: usize) -> anyhow::Result<Vec<String>> {
        self.calls.lock().unwrap().push((student_id, topic.to_string()));
        Ok(vec![format!("  struggled with {}  ", topic)])
    }
}

pub struct FailingMemory;

#[async_trait]
impl SemanticMemory for FailingMemory {
    async fn recall(&self, _student_id: Uuid, _topic: &str, _limit: usize) -> anyhow::Result<Vec<String>> {
        Err(anyhow::anyhow!("memory backend unavailable"))
    }
}

/// Replies with a fixed response and records the prompt it was given.
pub struct StubGenerator {
    pub response: std::result::Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn replying(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> std::result::Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(GenerationError::Api {
                code: 503,
                message: message.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Ignores `limit` and returns ten excerpts per student.
pub struct FloodMemory {
    pub calls: Mutex<Vec<(Uuid, usize)>>,
}

impl FloodMemory {
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl SemanticMemory for FloodMemory {
    async fn recall(&self, student_id: Uuid, _topic: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        self.calls.lock().unwrap().push((student_id, limit));
        Ok((0..10).map(|i| format!("{} note {}", student_id, i)).collect())
    }
}
