//! Chat-completion client for question generation

use serde::Deserialize;
use serde_json::json;

use super::{FollowUp, Question, QuestionGenerator, decode_question, fallback_question};
use crate::client::models::{HistoryEntry, UserSkill};
use crate::client::request::{ApiRequest, RequestClient};
use crate::config::GenerationConfig;
use crate::error::{ApiError, Result};

/// Default chat-completions host.
const GENERATION_BASE_URL: &str = "https://api.openai.com/v1";

/// Generation calls are slow and expensive; keep the limiter conservative.
const RATE_LIMIT_PER_SECOND: u32 = 2;

const SYSTEM_PROMPT: &str = "You are an expert technical interviewer and educator.";

/// Question generator backed by an OpenAI-compatible chat-completions API.
///
/// Requests run through [`RequestClient`] and so inherit its retry behavior
/// on rate limits and server errors. Responses are never cached.
pub struct ChatGenerator {
    client: RequestClient,
    model: String,
}

impl ChatGenerator {
    /// Build a generator from configuration. `LEARNOP_GENERATION_HOST`
    /// overrides the configured host.
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let host = std::env::var("LEARNOP_GENERATION_HOST")
            .ok()
            .or_else(|| config.host.clone())
            .unwrap_or_else(|| GENERATION_BASE_URL.to_string());

        let client = RequestClient::new(host, RATE_LIMIT_PER_SECOND, false)?;

        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    /// Attach the generation API key as a bearer token.
    pub async fn with_api_key(self, api_key: Option<&str>) -> Self {
        if let Some(key) = api_key {
            self.client.set_bearer(key.to_string()).await;
        }
        self
    }

    /// One chat-completion round trip, returning the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Completion {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }

        #[derive(Deserialize)]
        struct ChatMessage {
            content: Option<String>,
        }

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt }
            ]
        });

        let completion: Completion = self
            .client
            .request(ApiRequest::post("/chat/completions").json(body))
            .await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiError::InvalidResponse("completion had no content".to_string()).into())
    }

    fn decode_or_fallback(reply: &str) -> Question {
        decode_question(reply).unwrap_or_else(|| {
            log::warn!("unparseable generation reply, substituting fallback question");
            fallback_question()
        })
    }
}

#[async_trait::async_trait]
impl QuestionGenerator for ChatGenerator {
    async fn opening_question(
        &self,
        skills: &[UserSkill],
        history: &[HistoryEntry],
    ) -> Result<Question> {
        let prompt = format!(
            r#"Create a skill assessment question based on the following context:
User's Current Skills: {}
Recent Learning History: {}

Generate a JSON response with the following structure:
{{
  "question": "The question text",
  "options": ["option1", "option2", "option3", "option4"],
  "correctAnswer": "correct option",
  "explanation": "Detailed explanation",
  "skillArea": "The skill being tested",
  "difficulty": 5
}}
Difficulty is an integer on a 1-10 scale."#,
            serde_json::to_string(skills)?,
            serde_json::to_string(history)?,
        );

        let reply = self.complete(&prompt).await?;
        Ok(Self::decode_or_fallback(&reply))
    }

    async fn follow_up(&self, seed: &FollowUp) -> Result<Question> {
        let prompt = format!(
            r#"Generate the next assessment question based on:
Previous Answer Correct: {}
Skill Area: {}
Current Difficulty: {}

Adjust difficulty based on performance.
Return in JSON format with:
{{
  "question": "string",
  "options": ["array"],
  "correctAnswer": "string",
  "explanation": "string",
  "skillArea": "string",
  "difficulty": number
}}"#,
            seed.previous_correct, seed.skill_area, seed.difficulty,
        );

        let reply = self.complete(&prompt).await?;
        Ok(Self::decode_or_fallback(&reply))
    }
}
