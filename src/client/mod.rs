//! LearnSphere platform API client

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::assessment::scoring::SkillResult;
use crate::error::Result;
use crate::generation::Question;

#[cfg(test)]
pub mod mock;
pub mod models;
pub mod platform;
pub mod request;
pub mod retry;

#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockPlatform;
#[allow(unused_imports)]
pub use models::{
    AnswerRecord, AssessmentRecord, AssessmentStatus, AuthToken, HistoryEntry, UserSkill,
};
pub use platform::PlatformClient;
#[allow(unused_imports)]
pub use request::{ApiRequest, CachePolicy, RequestClient};
#[allow(unused_imports)]
pub use retry::RetryPolicy;

/// Platform operations the assessment engine depends on.
///
/// The platform owns all durable state; this trait is the full surface the
/// core needs from it.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Exchange an API key for a bearer token.
    async fn authenticate(&self, api_key: &str) -> Result<AuthToken>;

    /// Current skill levels for a user.
    async fn user_skills(&self, user_id: &str) -> Result<Vec<UserSkill>>;

    /// Most recent learning activity, newest first.
    async fn learning_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>>;

    /// Create an assessment session holding its first question.
    async fn create_assessment(&self, user_id: &str, question: &Question)
    -> Result<AssessmentRecord>;

    /// Load a session by ID, or `None` if the platform doesn't know it.
    async fn get_assessment(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>>;

    /// Replace the session's current question.
    async fn store_question(&self, assessment_id: &str, question: &Question) -> Result<()>;

    /// Mark a session completed, storing its final results.
    async fn complete_assessment(
        &self,
        assessment_id: &str,
        results: &BTreeMap<String, SkillResult>,
    ) -> Result<()>;

    /// Append a graded answer row.
    async fn record_answer(&self, answer: &AnswerRecord) -> Result<()>;

    /// All answers recorded for a session, oldest first.
    async fn list_answers(&self, assessment_id: &str) -> Result<Vec<AnswerRecord>>;

    /// Merge new skill levels into the user's long-lived record,
    /// keyed by (user, skill area).
    async fn upsert_skills(&self, user_id: &str, skills: &[UserSkill]) -> Result<()>;
}
