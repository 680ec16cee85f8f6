pub mod audit;
pub mod snapshot;
pub mod struggle;
pub mod turn;

pub use audit::{DiagnosticAudit, FailureType, Severity};
pub use snapshot::{
    CellActivity, ClassroomInfo, ClassroomSnapshot, LessonInfo, RubricScores, SemanticCluster,
    StudentInfo, StudentRow, TopicCell, TopicStruggleRecord,
};
pub use struggle::{Dimension, QuickCheck, StruggleDimensions};
pub use turn::{ConversationTurn, LearnerProfile, TurnRole};
