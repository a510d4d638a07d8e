//! LearnSphere API data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::Question;

/// Bearer token issued in exchange for an API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// The bearer token string
    pub token: String,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,

    /// The user this token is scoped to
    pub user_id: String,
}

/// A per-user skill level, upserted on assessment completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSkill {
    /// Skill area name (e.g. "arrays")
    pub skill_name: String,

    /// Latest score for the area, 0-10
    pub skill_level: f64,

    /// When the level was last upserted (set by the platform)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Recent learning activity, used to seed question generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// What the user did (e.g. "completed-exercise")
    pub activity: String,

    /// Topic the activity touched
    pub topic: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Server-held assessment session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRecord {
    /// Session ID assigned by the platform
    pub id: String,

    /// Owning user
    pub user_id: String,

    /// The question currently awaiting an answer, grading fields included.
    /// This never leaves the server side of the engine.
    pub question_data: Question,

    /// Session lifecycle state
    pub status: AssessmentStatus,
}

/// Assessment lifecycle states. Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    InProgress,
    Completed,
}

/// One graded answer row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub assessment_id: String,

    pub user_id: String,

    /// Question text as asked
    pub question: String,

    /// The answer as submitted, ungraded and unnormalized
    pub user_answer: String,

    pub is_correct: bool,

    /// Skill area the question tested
    pub skill_area: String,
}
