//! Mock platform for testing
//!
//! In-memory implementation of `PlatformApi` so engine tests run without a
//! network or a live platform.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::PlatformApi;
use super::models::{
    AnswerRecord, AssessmentRecord, AssessmentStatus, AuthToken, HistoryEntry, UserSkill,
};
use crate::assessment::scoring::SkillResult;
use crate::error::Result;
use crate::generation::Question;

/// In-memory platform stand-in.
///
/// Seed state via the builder methods, then inspect what the engine wrote.
#[derive(Default)]
pub struct MockPlatform {
    skills: Mutex<Vec<UserSkill>>,
    history: Mutex<Vec<HistoryEntry>>,
    assessments: Mutex<HashMap<String, AssessmentRecord>>,
    answers: Mutex<Vec<AnswerRecord>>,
    upserts: Mutex<Vec<(String, Vec<UserSkill>)>>,
    results: Mutex<HashMap<String, BTreeMap<String, SkillResult>>>,
    next_id: AtomicUsize,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skills(self, skills: Vec<UserSkill>) -> Self {
        if let Ok(mut stored) = self.skills.try_lock() {
            *stored = skills;
        }
        self
    }

    /// All answer rows recorded so far.
    pub async fn recorded_answers(&self) -> Vec<AnswerRecord> {
        self.answers.lock().await.clone()
    }

    /// Skill upserts in call order, as (user_id, skills) pairs.
    pub async fn recorded_upserts(&self) -> Vec<(String, Vec<UserSkill>)> {
        self.upserts.lock().await.clone()
    }

    /// Final results stored for a completed assessment.
    pub async fn stored_results(&self, assessment_id: &str) -> Option<BTreeMap<String, SkillResult>> {
        self.results.lock().await.get(assessment_id).cloned()
    }

    pub async fn assessment_status(&self, assessment_id: &str) -> Option<AssessmentStatus> {
        self.assessments
            .lock()
            .await
            .get(assessment_id)
            .map(|record| record.status)
    }
}

#[async_trait]
impl PlatformApi for MockPlatform {
    async fn authenticate(&self, _api_key: &str) -> Result<AuthToken> {
        Ok(AuthToken {
            token: "mock-token".to_string(),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            user_id: "mock-user".to_string(),
        })
    }

    async fn user_skills(&self, _user_id: &str) -> Result<Vec<UserSkill>> {
        Ok(self.skills.lock().await.clone())
    }

    async fn learning_history(&self, _user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        let history = self.history.lock().await;
        Ok(history.iter().take(limit).cloned().collect())
    }

    async fn create_assessment(
        &self,
        user_id: &str,
        question: &Question,
    ) -> Result<AssessmentRecord> {
        let id = format!("assessment-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = AssessmentRecord {
            id: id.clone(),
            user_id: user_id.to_string(),
            question_data: question.clone(),
            status: AssessmentStatus::InProgress,
        };
        self.assessments.lock().await.insert(id, record.clone());
        Ok(record)
    }

    async fn get_assessment(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>> {
        Ok(self.assessments.lock().await.get(assessment_id).cloned())
    }

    async fn store_question(&self, assessment_id: &str, question: &Question) -> Result<()> {
        if let Some(record) = self.assessments.lock().await.get_mut(assessment_id) {
            record.question_data = question.clone();
        }
        Ok(())
    }

    async fn complete_assessment(
        &self,
        assessment_id: &str,
        results: &BTreeMap<String, SkillResult>,
    ) -> Result<()> {
        if let Some(record) = self.assessments.lock().await.get_mut(assessment_id) {
            record.status = AssessmentStatus::Completed;
        }
        self.results
            .lock()
            .await
            .insert(assessment_id.to_string(), results.clone());
        Ok(())
    }

    async fn record_answer(&self, answer: &AnswerRecord) -> Result<()> {
        self.answers.lock().await.push(answer.clone());
        Ok(())
    }

    async fn list_answers(&self, assessment_id: &str) -> Result<Vec<AnswerRecord>> {
        let answers = self.answers.lock().await;
        Ok(answers
            .iter()
            .filter(|answer| answer.assessment_id == assessment_id)
            .cloned()
            .collect())
    }

    async fn upsert_skills(&self, user_id: &str, skills: &[UserSkill]) -> Result<()> {
        self.upserts
            .lock()
            .await
            .push((user_id.to_string(), skills.to_vec()));
        Ok(())
    }
}
