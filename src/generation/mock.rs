//! Scripted question generator for testing

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{FollowUp, Question, QuestionGenerator};
use crate::client::models::{HistoryEntry, UserSkill};
use crate::error::Result;

/// Generator that hands out a scripted sequence of questions.
///
/// When the script runs dry it emits a deterministic question for the seed's
/// skill area, so tests can run arbitrary session lengths.
#[derive(Default)]
pub struct MockGenerator {
    script: Mutex<VecDeque<Question>>,
    seeds: Mutex<Vec<FollowUp>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(questions: Vec<Question>) -> Self {
        Self {
            script: Mutex::new(questions.into()),
            seeds: Mutex::new(Vec::new()),
        }
    }

    /// Seeds passed to `follow_up`, in order.
    pub fn recorded_seeds(&self) -> Vec<FollowUp> {
        self.seeds.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn next_question(&self, skill_area: &str) -> Question {
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or_else(|| sample_question(skill_area, 5))
    }
}

#[async_trait]
impl QuestionGenerator for MockGenerator {
    async fn opening_question(
        &self,
        _skills: &[UserSkill],
        _history: &[HistoryEntry],
    ) -> Result<Question> {
        Ok(self.next_question("arrays"))
    }

    async fn follow_up(&self, seed: &FollowUp) -> Result<Question> {
        if let Ok(mut seeds) = self.seeds.lock() {
            seeds.push(seed.clone());
        }
        Ok(self.next_question(&seed.skill_area))
    }
}

/// Build a well-formed question for tests.
pub fn sample_question(skill_area: &str, difficulty: i32) -> Question {
    Question {
        question: format!("Sample question about {}", skill_area),
        options: vec![
            "Alpha".to_string(),
            "Bravo".to_string(),
            "Charlie".to_string(),
            "Delta".to_string(),
        ],
        correct_answer: "Alpha".to_string(),
        explanation: "Alpha is correct.".to_string(),
        skill_area: skill_area.to_string(),
        difficulty,
    }
}
