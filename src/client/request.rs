//! Generic HTTP request dispatch with caching and retry
//!
//! Every platform and generation call funnels through [`RequestClient`]:
//! cache lookup first, then rate-limited dispatch with exponential-backoff
//! retry, then cache population. A cache hit performs no network I/O and
//! therefore no retry or backoff activity.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::cache::{DEFAULT_TTL, ResponseCache, cache_key};
use crate::client::retry::RetryPolicy;
use crate::error::{ApiError, Result};

/// Transport timeout for a single attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Cache behavior for a single request.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    /// Entry lifetime; `None` falls back to [`DEFAULT_TTL`].
    pub ttl: Option<Duration>,
    /// Explicit key overriding the canonical request signature.
    pub key: Option<String>,
}

/// A single logical API request.
///
/// `get`/`post`/`put`/`delete` are sugar over [`ApiRequest::new`] fixing the
/// method field; they carry no behavior of their own.
pub struct ApiRequest {
    method: Method,
    path: String,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    retry: RetryPolicy,
    cache: Option<CachePolicy>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            headers: Vec::new(),
            body: None,
            retry: RetryPolicy::default(),
            cache: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[allow(dead_code)]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache = Some(policy);
        self
    }

    /// Enable caching under the canonical request key.
    pub fn cache_for(self, ttl: Duration) -> Self {
        self.cache(CachePolicy {
            ttl: Some(ttl),
            key: None,
        })
    }

    /// Enable caching under an explicit key, so mutations can invalidate it.
    pub fn cache_as(self, key: impl Into<String>, ttl: Duration) -> Self {
        self.cache(CachePolicy {
            ttl: Some(ttl),
            key: Some(key.into()),
        })
    }

    fn cache_key(&self) -> String {
        if let Some(policy) = &self.cache
            && let Some(key) = &policy.key
        {
            return key.clone();
        }
        cache_key(
            self.method.as_str(),
            &self.path,
            &self.params,
            self.body.as_ref(),
        )
    }
}

/// HTTP client for one API host, with response caching and retry.
pub struct RequestClient {
    http: HttpClient,
    base_url: String,
    cache: Option<ResponseCache>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    bearer: RwLock<Option<String>>,
}

impl RequestClient {
    /// Create a client for `base_url`, rate limited to `requests_per_second`.
    /// Pass `cache_enabled: false` to bypass the response cache entirely.
    pub fn new(
        base_url: impl Into<String>,
        requests_per_second: u32,
        cache_enabled: bool,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(requests_per_second.max(1)).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: base_url.into(),
            cache: cache_enabled.then(ResponseCache::new),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            bearer: RwLock::new(None),
        })
    }

    /// Set the bearer token applied to subsequent requests.
    pub async fn set_bearer(&self, token: String) {
        *self.bearer.write().await = Some(token);
    }

    /// Execute a request: serve from cache when fresh, otherwise dispatch
    /// with retry and store the response.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        if let Some(cache) = &self.cache
            && request.cache.is_some()
        {
            let key = request.cache_key();
            if let Some(value) = cache.get(&key) {
                log::debug!("cache hit: {} {}", request.method, request.path);
                return decode(value);
            }
        }

        let value = self.dispatch(&request).await?;

        if let Some(cache) = &self.cache
            && let Some(policy) = &request.cache
        {
            cache.put(
                &request.cache_key(),
                value.clone(),
                policy.ttl.unwrap_or(DEFAULT_TTL),
            );
        }

        decode(value)
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Drop a single cached response. Callers use this to force freshness
    /// after a mutation.
    pub fn invalidate(&self, cache_key: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(cache_key);
        }
    }

    /// Dispatch with retry. Backoff suspends the caller and is observed as
    /// added latency, never as a distinct error.
    async fn dispatch(&self, request: &ApiRequest) -> Result<Value> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(request).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !request.retry.should_retry(&err, attempt) {
                        return Err(err.into());
                    }
                    let delay = request.retry.backoff_delay(attempt);
                    log::debug!(
                        "attempt {} for {} {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        request.method,
                        request.path,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One network attempt, mapped onto the transport error taxonomy.
    async fn send_once(&self, request: &ApiRequest) -> std::result::Result<Value, ApiError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = self.bearer.read().await.as_deref() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            status if status.is_success() => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ApiError::Network(e.to_string()))?;
                if text.is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(&text).map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            StatusCode::NOT_FOUND => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(message))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(message))
            }
            status if status.is_server_error() => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::Server {
                    code: status.as_u16(),
                    message,
                })
            }
            status => Err(ApiError::InvalidResponse(format!(
                "Unexpected status code: {}",
                status
            ))),
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode response: {}", e)).into())
}
