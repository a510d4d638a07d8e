//! Question generation backed by a chat-completion model
//!
//! Model output is untrusted free text. Decoding accepts a bare JSON object
//! or one embedded in surrounding prose or code fences, and substitutes a
//! fixed fallback question when nothing usable can be recovered, so a bad
//! reply never fails the session.

pub mod chat;
#[cfg(test)]
pub mod mock;

pub use chat::ChatGenerator;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockGenerator;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::client::models::{HistoryEntry, UserSkill};
use crate::error::Result;

/// Difficulty assumed when the model omits or mangles the field.
const DEFAULT_DIFFICULTY: i32 = 5;

/// A generated assessment question, including grading fields.
///
/// `correct_answer` and `explanation` are server-side only; candidates see
/// a stripped view built by the assessment engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    pub skill_area: String,
    #[serde(default = "default_difficulty", deserialize_with = "lenient_difficulty")]
    pub difficulty: i32,
}

/// Seed for an adaptive follow-up question. The generator owns the policy
/// for how difficulty reacts; the engine only forwards this context.
#[derive(Debug, Clone)]
pub struct FollowUp {
    pub previous_correct: bool,
    pub skill_area: String,
    pub difficulty: i32,
}

/// Question source the assessment engine draws from.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Generate the opening question from the user's skill context.
    async fn opening_question(
        &self,
        skills: &[UserSkill],
        history: &[HistoryEntry],
    ) -> Result<Question>;

    /// Generate a follow-up question, adapting difficulty to performance.
    async fn follow_up(&self, seed: &FollowUp) -> Result<Question>;
}

fn default_difficulty() -> i32 {
    DEFAULT_DIFFICULTY
}

/// Models emit difficulty as a number, a numeric string, or occasionally
/// prose like "1-10 scale"; anything unparseable becomes the default.
fn lenient_difficulty<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().map(|n| n as i32).unwrap_or(DEFAULT_DIFFICULTY),
        Value::String(s) => s.trim().parse().unwrap_or(DEFAULT_DIFFICULTY),
        _ => DEFAULT_DIFFICULTY,
    })
}

/// Decode a model reply into a question, or `None` if nothing usable can
/// be recovered.
pub(crate) fn decode_question(raw: &str) -> Option<Question> {
    let candidate = if let Ok(question) = serde_json::from_str::<Question>(raw) {
        Some(question)
    } else {
        extract_json(raw).and_then(|json| serde_json::from_str(json).ok())
    };

    candidate.filter(|q| {
        !q.question.trim().is_empty()
            && !q.options.is_empty()
            && !q.correct_answer.trim().is_empty()
            && !q.skill_area.trim().is_empty()
    })
}

/// Slice out the outermost `{...}` block, covering replies wrapped in prose
/// or markdown fences.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Stand-in used when the model reply cannot be decoded. Keeps the session
/// serviceable instead of surfacing a parse failure to the candidate.
pub(crate) fn fallback_question() -> Question {
    Question {
        question: "Which data structure offers average O(1) lookup by key?".to_string(),
        options: vec![
            "Hash map".to_string(),
            "Linked list".to_string(),
            "Binary search tree".to_string(),
            "Sorted array".to_string(),
        ],
        correct_answer: "Hash map".to_string(),
        explanation: "Hash maps index entries by hashed key, giving constant-time \
                      average lookups."
            .to_string(),
        skill_area: "fundamentals".to_string(),
        difficulty: 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_question() -> String {
        json!({
            "question": "What does a B-tree optimize for?",
            "options": ["Disk reads", "CPU cache", "Network hops", "Stack depth"],
            "correctAnswer": "Disk reads",
            "explanation": "Wide nodes reduce the number of disk accesses.",
            "skillArea": "databases",
            "difficulty": 6
        })
        .to_string()
    }

    #[test]
    fn test_decode_bare_json() {
        let question = decode_question(&raw_question()).unwrap();
        assert_eq!(question.skill_area, "databases");
        assert_eq!(question.difficulty, 6);
        assert_eq!(question.options.len(), 4);
    }

    #[test]
    fn test_decode_fenced_json() {
        let raw = format!("Here is your question:\n```json\n{}\n```\nGood luck!", raw_question());
        let question = decode_question(&raw).unwrap();
        assert_eq!(question.correct_answer, "Disk reads");
    }

    #[test]
    fn test_decode_rejects_prose() {
        assert!(decode_question("I could not generate a question today.").is_none());
    }

    #[test]
    fn test_decode_rejects_empty_fields() {
        let raw = json!({
            "question": "",
            "options": ["a"],
            "correctAnswer": "a",
            "skillArea": "x"
        })
        .to_string();
        assert!(decode_question(&raw).is_none());

        let raw = json!({
            "question": "q",
            "options": [],
            "correctAnswer": "a",
            "skillArea": "x"
        })
        .to_string();
        assert!(decode_question(&raw).is_none());
    }

    #[test]
    fn test_difficulty_accepts_numeric_string() {
        let raw = json!({
            "question": "q",
            "options": ["a", "b"],
            "correctAnswer": "a",
            "skillArea": "arrays",
            "difficulty": "7"
        })
        .to_string();
        assert_eq!(decode_question(&raw).unwrap().difficulty, 7);
    }

    #[test]
    fn test_difficulty_prose_becomes_default() {
        let raw = json!({
            "question": "q",
            "options": ["a", "b"],
            "correctAnswer": "a",
            "skillArea": "arrays",
            "difficulty": "1-10 scale"
        })
        .to_string();
        assert_eq!(decode_question(&raw).unwrap().difficulty, 5);
    }

    #[test]
    fn test_missing_difficulty_and_explanation_default() {
        let raw = json!({
            "question": "q",
            "options": ["a", "b"],
            "correctAnswer": "a",
            "skillArea": "arrays"
        })
        .to_string();
        let question = decode_question(&raw).unwrap();
        assert_eq!(question.difficulty, 5);
        assert!(question.explanation.is_empty());
    }

    #[test]
    fn test_fallback_question_is_usable() {
        let question = fallback_question();
        assert!(question.options.contains(&question.correct_answer));
        assert!(!question.skill_area.is_empty());
    }
}
