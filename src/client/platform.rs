//! LearnSphere platform client implementation

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use super::models::{AnswerRecord, AssessmentRecord, AuthToken, HistoryEntry, UserSkill};
use super::request::{ApiRequest, RequestClient};
use super::retry::RetryPolicy;
use super::PlatformApi;
use crate::assessment::scoring::SkillResult;
use crate::error::{ApiError, Error, Result};
use crate::generation::Question;

/// LearnSphere API base URL
const API_BASE_URL: &str = "https://api.learnsphere.dev/api/v1";

/// Platform rate limit: 6 requests per second (360 per minute)
const RATE_LIMIT_PER_SECOND: u32 = 6;

/// Cache lifetimes per endpoint.
///
/// Skill and history reads seed question generation; short TTLs keep the
/// prompts reasonably fresh within one CLI session.
struct CacheTtl;

impl CacheTtl {
    const SKILLS: Duration = Duration::from_secs(5 * 60);
    const HISTORY: Duration = Duration::from_secs(5 * 60);
}

/// Internal authentication state
#[derive(Debug, Clone, Default)]
struct AuthState {
    api_key: Option<String>,
    token: Option<AuthToken>,
}

/// LearnSphere platform API client.
///
/// Reads that feed generation prompts are cached under explicit keys so the
/// matching mutation can invalidate them. Session reads and writes always
/// hit the platform.
pub struct PlatformClient {
    client: RequestClient,
    auth_state: RwLock<AuthState>,
}

fn skills_cache_key(user_id: &str) -> String {
    format!("user_skills:{}", user_id)
}

fn history_cache_key(user_id: &str) -> String {
    format!("learning_history:{}", user_id)
}

impl PlatformClient {
    /// Create a client for the default API host (or `LEARNOP_API_HOST`).
    pub fn new(api_key: Option<String>, cache_enabled: bool) -> Result<Self> {
        let host = std::env::var("LEARNOP_API_HOST").ok();
        Self::with_host(api_key, host, cache_enabled)
    }

    /// Create a client for a specific API host.
    pub fn with_host(
        api_key: Option<String>,
        host: Option<String>,
        cache_enabled: bool,
    ) -> Result<Self> {
        let base_url = host.unwrap_or_else(|| API_BASE_URL.to_string());
        let client = RequestClient::new(base_url, RATE_LIMIT_PER_SECOND, cache_enabled)?;

        Ok(Self {
            client,
            auth_state: RwLock::new(AuthState {
                api_key,
                token: None,
            }),
        })
    }

    /// Install a previously issued token (e.g. one cached in the config).
    pub async fn set_token(&self, token: AuthToken) {
        self.client.set_bearer(token.token.clone()).await;
        self.auth_state.write().await.token = Some(token);
    }

    /// Check if the token is missing, expired, or expiring within 5 minutes.
    async fn is_token_expired(&self) -> bool {
        let state = self.auth_state.read().await;
        match &state.token {
            None => true,
            Some(token) => {
                let buffer = chrono::Duration::minutes(5);
                token.expires_at - buffer < Utc::now()
            }
        }
    }

    /// Ensure a fresh bearer token is installed, re-authenticating with the
    /// stored API key when needed.
    async fn ensure_token(&self) -> Result<()> {
        if !self.is_token_expired().await {
            return Ok(());
        }

        let api_key = {
            let state = self.auth_state.read().await;
            state.api_key.clone().ok_or(ApiError::Unauthorized)?
        };

        let token = self.authenticate(&api_key).await?;
        self.set_token(token).await;
        Ok(())
    }

    /// Drop every cached platform response.
    #[allow(dead_code)]
    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}

#[async_trait]
impl PlatformApi for PlatformClient {
    /// Authenticate - never cached
    async fn authenticate(&self, api_key: &str) -> Result<AuthToken> {
        self.client
            .request(ApiRequest::get("/auth/login").header("X-ApiKey", api_key))
            .await
    }

    async fn user_skills(&self, user_id: &str) -> Result<Vec<UserSkill>> {
        #[derive(Deserialize)]
        struct SkillsResponse {
            skills: Vec<UserSkill>,
        }

        self.ensure_token().await?;

        let response: SkillsResponse = self
            .client
            .request(
                ApiRequest::get(format!("/users/{}/skills", user_id))
                    .cache_as(skills_cache_key(user_id), CacheTtl::SKILLS),
            )
            .await?;
        Ok(response.skills)
    }

    async fn learning_history(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>> {
        #[derive(Deserialize)]
        struct HistoryResponse {
            entries: Vec<HistoryEntry>,
        }

        self.ensure_token().await?;

        let response: HistoryResponse = self
            .client
            .request(
                ApiRequest::get(format!("/users/{}/history", user_id))
                    .query("limit", limit)
                    .cache_as(history_cache_key(user_id), CacheTtl::HISTORY),
            )
            .await?;
        Ok(response.entries)
    }

    async fn create_assessment(
        &self,
        user_id: &str,
        question: &Question,
    ) -> Result<AssessmentRecord> {
        self.ensure_token().await?;

        // Session creation is not idempotent; a retried POST could leave an
        // orphaned session behind.
        self.client
            .request(
                ApiRequest::post("/assessments")
                    .json(json!({
                        "userId": user_id,
                        "questionData": question,
                        "status": "in_progress",
                    }))
                    .retry(RetryPolicy::none()),
            )
            .await
    }

    async fn get_assessment(&self, assessment_id: &str) -> Result<Option<AssessmentRecord>> {
        self.ensure_token().await?;

        let request = ApiRequest::get(format!("/assessments/{}", assessment_id));
        match self.client.request(request).await {
            Ok(record) => Ok(Some(record)),
            Err(Error::Api(ApiError::NotFound(_))) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn store_question(&self, assessment_id: &str, question: &Question) -> Result<()> {
        self.ensure_token().await?;

        self.client
            .request(
                ApiRequest::put(format!("/assessments/{}/question", assessment_id))
                    .json(json!({ "questionData": question })),
            )
            .await
    }

    async fn complete_assessment(
        &self,
        assessment_id: &str,
        results: &BTreeMap<String, SkillResult>,
    ) -> Result<()> {
        self.ensure_token().await?;

        self.client
            .request(
                ApiRequest::post(format!("/assessments/{}/complete", assessment_id))
                    .json(json!({ "results": results }))
                    .retry(RetryPolicy::none()),
            )
            .await
    }

    async fn record_answer(&self, answer: &AnswerRecord) -> Result<()> {
        self.ensure_token().await?;

        // Answer rows feed the tally; a retried POST would double-count.
        self.client
            .request(
                ApiRequest::post(format!("/assessments/{}/answers", answer.assessment_id))
                    .json(serde_json::to_value(answer)?)
                    .retry(RetryPolicy::none()),
            )
            .await
    }

    async fn list_answers(&self, assessment_id: &str) -> Result<Vec<AnswerRecord>> {
        #[derive(Deserialize)]
        struct AnswersResponse {
            answers: Vec<AnswerRecord>,
        }

        self.ensure_token().await?;

        let response: AnswersResponse = self
            .client
            .request(ApiRequest::get(format!(
                "/assessments/{}/answers",
                assessment_id
            )))
            .await?;
        Ok(response.answers)
    }

    async fn upsert_skills(&self, user_id: &str, skills: &[UserSkill]) -> Result<()> {
        self.ensure_token().await?;

        // The upsert merges on (user, skill area), so replaying it is safe.
        self.client
            .request::<()>(
                ApiRequest::put(format!("/users/{}/skills", user_id))
                    .json(json!({ "skills": skills })),
            )
            .await?;

        // The cached read is now stale
        self.client.invalidate(&skills_cache_key(user_id));
        Ok(())
    }
}
