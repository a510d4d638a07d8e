//! Configuration management for LearnOp

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LearnSphere API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// User the API key belongs to, learned at sign-in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Platform API host override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Cached bearer token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<SessionToken>,

    /// Question generation settings
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Bearer token with expiry, cached between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// The token string
    pub token: String,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,
}

/// Question generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Chat-completions host override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Model used for question generation
    #[serde(default = "default_model")]
    pub model: String,

    /// API key for the generation backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gpt-4".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            host: None,
            model: default_model(),
            api_key: None,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".learnop").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path_override: Option<&str>) -> Result<PathBuf> {
        match path_override {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, honoring a path override
    pub fn load_at(path_override: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path_override)?;
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration, honoring a path override
    pub fn save_at(&self, path_override: Option<&str>) -> Result<()> {
        let path = Self::resolve_path(path_override)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // The file holds API keys; keep it private on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Check if the cached token is expired or expires within 5 minutes
    pub fn is_token_expired(&self) -> bool {
        match &self.token {
            None => true,
            Some(token) => {
                let buffer = chrono::Duration::minutes(5);
                token.expires_at - buffer < Utc::now()
            }
        }
    }

    /// Validate that required configuration is present
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }

    /// The signed-in user, required for assessment commands
    pub fn require_user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| ConfigError::MissingUserId.into())
    }
}
