//! Application Configuration
//!
//! Upstream registry credentials and client settings, plus the service API
//! key guarding the REST surface.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TNS_API_URL: &str = "https://www.wis-tns.org/api/get";
pub const DEFAULT_BOT_ID: u64 = 140550;
pub const DEFAULT_BOT_NAME: &str = "snphot_bot";
pub const DEFAULT_API_KEY_FILE: &str = "TNS_API_KEY.SECRET";

/// Attempts per name before giving up on a rate limited upstream
pub const MAX_ATTEMPTS: u32 = 3;

/// Failure to obtain the registry API key
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Could not read API key file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API key not found in file: {0}")]
    Empty(PathBuf),

    #[error("Invalid bot id {0:?}")]
    InvalidBotId(String),
}

/// Bot identity presented to the registry
#[derive(Clone)]
pub struct TnsBot {
    pub id: u64,
    pub name: String,
    pub api_key: String,
}

impl fmt::Debug for TnsBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TnsBot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl TnsBot {
    pub fn new(id: u64, name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            api_key: api_key.into(),
        }
    }

    /// `User-Agent` marker identifying the bot
    pub fn user_agent(&self) -> String {
        format!(
            r#"tns_marker{{"tns_id":{},"type":"bot","name":"{}"}}"#,
            self.id, self.name
        )
    }

    /// Build from the process environment.
    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// `TNS_API_KEY` wins; otherwise the key is read from `TNS_API_KEY_FILE`
    /// (default `TNS_API_KEY.SECRET`).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let id = match lookup("TNS_BOT_ID") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| CredentialError::InvalidBotId(raw))?,
            None => DEFAULT_BOT_ID,
        };
        let name = lookup("TNS_BOT_NAME").unwrap_or_else(|| DEFAULT_BOT_NAME.to_string());

        let api_key = match lookup("TNS_API_KEY") {
            Some(key) => key,
            None => {
                let path = lookup("TNS_API_KEY_FILE")
                    .unwrap_or_else(|| DEFAULT_API_KEY_FILE.to_string());
                read_api_key_file(Path::new(&path))?
            }
        };

        Ok(Self { id, name, api_key })
    }
}

/// Read the API key from a secret file, trimming the trailing newline.
pub fn read_api_key_file(path: &Path) -> Result<String, CredentialError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let key = raw.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty(path.to_path_buf()));
    }
    Ok(key.to_string())
}

/// Registry client configuration
#[derive(Debug, Clone)]
pub struct TnsConfig {
    /// Base URL of the `get` API, without trailing slash
    pub api_url: String,
    pub bot: TnsBot,
    /// Attempts per name while rate limited
    pub max_attempts: u32,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl TnsConfig {
    pub fn new(bot: TnsBot) -> Self {
        Self {
            api_url: DEFAULT_TNS_API_URL.to_string(),
            bot,
            max_attempts: MAX_ATTEMPTS,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Read bot credentials and `TNS_API_URL` from the environment
    pub fn from_env() -> Result<Self, CredentialError> {
        let mut config = Self::new(TnsBot::from_env()?);
        if let Ok(url) = std::env::var("TNS_API_URL") {
            config = config.with_api_url(url);
        }
        Ok(config)
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Object lookup endpoint
    pub fn object_url(&self) -> String {
        format!("{}/object", self.api_url)
    }
}

/// REST API access configuration
#[derive(Clone)]
pub struct ApiConfig {
    /// Expected value of the `api_key` header or query parameter
    pub api_key: String,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
