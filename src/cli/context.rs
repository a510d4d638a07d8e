//! Command execution context
//!
//! Loads configuration, authenticates, and builds the platform client so
//! individual commands don't repeat the boilerplate.

use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::client::models::AuthToken;
use crate::client::{PlatformApi, PlatformClient};
use crate::config::{Config, SessionToken};
use crate::error::Result;

/// Context for command execution containing config, client, and runtime
/// options.
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Authenticated platform client (Arc-wrapped for sharing with the engine)
    pub platform: Arc<PlatformClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization:
    /// config loading, validation, client construction, and sign-in
    /// (reusing the cached token when it is still fresh).
    pub async fn new(
        format: OutputFormat,
        config_path: Option<&str>,
        no_cache: bool,
    ) -> Result<Self> {
        let mut config = Config::load_at(config_path)?;
        config.validate_auth()?;

        let host = std::env::var("LEARNOP_API_HOST")
            .ok()
            .or_else(|| config.api_host.clone());
        let platform = PlatformClient::with_host(config.api_key.clone(), host, !no_cache)?;

        if !config.is_token_expired()
            && let (Some(token), Some(user_id)) = (&config.token, &config.user_id)
        {
            platform
                .set_token(AuthToken {
                    token: token.token.clone(),
                    expires_at: token.expires_at,
                    user_id: user_id.clone(),
                })
                .await;
        } else {
            // Token is stale; sign in again and cache the fresh one
            let api_key = config.api_key.clone().unwrap_or_default();
            let token = platform.authenticate(&api_key).await?;

            config.token = Some(SessionToken {
                token: token.token.clone(),
                expires_at: token.expires_at,
            });
            config.user_id = Some(token.user_id.clone());
            config.save_at(config_path)?;

            platform.set_token(token).await;
        }

        Ok(Self {
            config,
            platform: Arc::new(platform),
            format,
        })
    }

    /// The signed-in user's ID, required by assessment commands.
    pub fn require_user_id(&self) -> Result<&str> {
        self.config.require_user_id()
    }
}
