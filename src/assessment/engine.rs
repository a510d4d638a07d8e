//! Assessment session state machine
//!
//! A session moves through in_progress to completed, one answer at a time.
//! The platform holds the durable state; this engine owns the transitions:
//! grading, tallying, follow-up generation, and final score upserts.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use super::TOTAL_QUESTIONS;
use super::scoring::{SkillResult, aggregate_scores, tally_answers};
use crate::client::PlatformApi;
use crate::client::models::{AnswerRecord, AssessmentStatus, UserSkill};
use crate::error::{AssessmentError, Result};
use crate::generation::{FollowUp, Question, QuestionGenerator};

/// How many recent history entries seed the opening prompt.
const HISTORY_DEPTH: usize = 5;

/// A question as shown to the candidate. Grading fields are stripped;
/// `correct_answer` and `explanation` must never appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedQuestion {
    /// The assessment session this question belongs to
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub skill_area: String,
    pub difficulty: i32,
    pub total_questions: usize,
}

impl PresentedQuestion {
    fn from_question(assessment_id: &str, question: &Question) -> Self {
        Self {
            id: assessment_id.to_string(),
            question: question.question.clone(),
            options: question.options.clone(),
            skill_area: question.skill_area.clone(),
            difficulty: question.difficulty,
            total_questions: TOTAL_QUESTIONS,
        }
    }
}

/// Result of submitting one answer.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitOutcome {
    #[serde(rename_all = "camelCase")]
    Continue {
        is_complete: bool,
        next_question: PresentedQuestion,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        is_complete: bool,
        results: BTreeMap<String, SkillResult>,
    },
}

impl SubmitOutcome {
    fn next(next_question: PresentedQuestion) -> Self {
        SubmitOutcome::Continue {
            is_complete: false,
            next_question,
        }
    }

    fn complete(results: BTreeMap<String, SkillResult>) -> Self {
        SubmitOutcome::Complete {
            is_complete: true,
            results,
        }
    }

    #[allow(dead_code)]
    pub fn is_complete(&self) -> bool {
        matches!(self, SubmitOutcome::Complete { .. })
    }
}

/// Drives assessment sessions against the platform and the question
/// generator. Construct one per process and share it; both collaborators
/// are injected so tests can swap them out.
pub struct AssessmentEngine {
    platform: Arc<dyn PlatformApi>,
    generator: Arc<dyn QuestionGenerator>,
    /// One writer per session; concurrent submissions for the same session
    /// serialize here instead of racing on the tally.
    session_locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AssessmentEngine {
    pub fn new(platform: Arc<dyn PlatformApi>, generator: Arc<dyn QuestionGenerator>) -> Self {
        Self {
            platform,
            generator,
            session_locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Begin a session: gather the user's skill context, generate the
    /// opening question, and persist the new session.
    pub async fn start(&self, user_id: &str) -> Result<PresentedQuestion> {
        let (skills, history) = futures::try_join!(
            self.platform.user_skills(user_id),
            self.platform.learning_history(user_id, HISTORY_DEPTH),
        )?;

        let question = self.generator.opening_question(&skills, &history).await?;
        let record = self.platform.create_assessment(user_id, &question).await?;

        log::info!("assessment {} started for user {}", record.id, user_id);
        Ok(PresentedQuestion::from_question(&record.id, &question))
    }

    /// Grade one answer and advance the session.
    ///
    /// The tenth answer completes the session: scores are aggregated,
    /// skill levels upserted, and results returned. Earlier answers get a
    /// follow-up question seeded with the outcome so difficulty can adapt.
    pub async fn submit_answer(
        &self,
        assessment_id: &str,
        user_id: &str,
        answer: &str,
    ) -> Result<SubmitOutcome> {
        let lock = self.session_lock(assessment_id);
        let _guard = lock.lock().await;

        let record = self
            .platform
            .get_assessment(assessment_id)
            .await?
            .ok_or_else(|| AssessmentError::NotFound(assessment_id.to_string()))?;

        if record.status == AssessmentStatus::Completed {
            return Err(AssessmentError::AlreadyCompleted(assessment_id.to_string()).into());
        }

        let question = &record.question_data;
        // Exact string comparison is the grading contract; no trimming or
        // case folding.
        let is_correct = answer == question.correct_answer;

        self.platform
            .record_answer(&AnswerRecord {
                assessment_id: assessment_id.to_string(),
                user_id: user_id.to_string(),
                question: question.question.clone(),
                user_answer: answer.to_string(),
                is_correct,
                skill_area: question.skill_area.clone(),
            })
            .await?;

        let answers = self.platform.list_answers(assessment_id).await?;
        if answers.len() >= TOTAL_QUESTIONS {
            return self.finalize(assessment_id, user_id, &answers).await;
        }

        let next = self
            .generator
            .follow_up(&FollowUp {
                previous_correct: is_correct,
                skill_area: question.skill_area.clone(),
                difficulty: question.difficulty,
            })
            .await?;
        self.platform.store_question(assessment_id, &next).await?;

        Ok(SubmitOutcome::next(PresentedQuestion::from_question(
            assessment_id,
            &next,
        )))
    }

    /// Terminal transition: aggregate, upsert skill levels, mark completed.
    async fn finalize(
        &self,
        assessment_id: &str,
        user_id: &str,
        answers: &[AnswerRecord],
    ) -> Result<SubmitOutcome> {
        let results = aggregate_scores(&tally_answers(answers))?;

        let skills: Vec<UserSkill> = results
            .iter()
            .map(|(area, result)| UserSkill {
                skill_name: area.clone(),
                skill_level: result.score,
                updated_at: None,
            })
            .collect();
        self.platform.upsert_skills(user_id, &skills).await?;
        self.platform
            .complete_assessment(assessment_id, &results)
            .await?;

        log::info!(
            "assessment {} completed for user {} ({} skill areas)",
            assessment_id,
            user_id,
            results.len()
        );
        Ok(SubmitOutcome::complete(results))
    }

    fn session_lock(&self, assessment_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .session_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(assessment_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
