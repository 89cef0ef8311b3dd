//! Configuration management for mccop
//!
//! Settings are layered: CLI flag > environment variable (including `.env`)
//! > config file > built-in default. The CLI/env layer arrives through
//! [`Overrides`]; everything else lives in the YAML file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::models::Session;
use crate::error::{ConfigError, Result};

/// Default IDMC login host
pub const DEFAULT_LOGIN_URL: &str = "https://dm-us.informaticacloud.com";

/// Default IDMC pod API host
pub const DEFAULT_POD_API_URL: &str = "https://usw1.dmp-us.informaticacloud.com";

/// Default CDGC API host
pub const DEFAULT_CDGC_API_URL: &str = "https://cdgc-api.dm-us.informaticacloud.com";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Informatica username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Informatica password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// IDMC login URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,

    /// IDMC pod API URL (JWT exchange)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_api_url: Option<String>,

    /// CDGC API URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cdgc_api_url: Option<String>,

    /// Cached session from the last successful login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<CachedSession>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Session state cached between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedSession {
    /// CDGC JWT
    pub token: String,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,

    /// Organization the session belongs to
    pub org_id: String,

    #[serde(default)]
    pub org_name: String,

    #[serde(default)]
    pub user_id: String,

    /// Username the session was created for
    #[serde(default)]
    pub username: String,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Page size for paginated list requests
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Seconds between scan job status checks
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Maximum seconds to wait for a scan job
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_page_size() -> usize {
    100
}

fn default_poll_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    3600
}

impl CachedSession {
    /// Cache an authenticated session for `username`
    pub fn new(session: &Session, username: &str) -> Self {
        Self {
            token: session.token.clone(),
            expires_at: session.expires_at,
            org_id: session.org_id.clone(),
            org_name: session.org_name.clone(),
            user_id: session.user_id.clone(),
            username: username.to_string(),
        }
    }

    pub fn to_session(&self) -> Session {
        Session {
            token: self.token.clone(),
            expires_at: self.expires_at,
            org_id: self.org_id.clone(),
            org_name: self.org_name.clone(),
            user_id: self.user_id.clone(),
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            poll_interval: default_poll_interval(),
            timeout: default_timeout(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub username: Option<String>,
    pub password: Option<String>,
    pub login_url: Option<String>,
    pub pod_api_url: Option<String>,
    pub cdgc_api_url: Option<String>,
}

/// Fully resolved connection settings
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub login_url: String,
    pub pod_api_url: String,
    pub cdgc_api_url: String,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".mccop").join("config.yaml"))
    }

    /// Resolve an explicit path or fall back to the default
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load configuration, treating a missing file as an empty config.
    ///
    /// Credentials may come entirely from the environment, so the file is optional.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match Self::load_from(Self::resolve_path(path)?) {
            Ok(config) => Ok(config),
            Err(crate::error::Error::Config(ConfigError::NotFound)) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Save configuration to a specific path or the default
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Holds a password; keep it private on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Merge CLI/env overrides over file values and built-in defaults.
    pub fn credentials(&self, overrides: &Overrides) -> Result<Credentials> {
        let username = overrides
            .username
            .clone()
            .or_else(|| self.username.clone())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingCredentials)?;
        let password = overrides
            .password
            .clone()
            .or_else(|| self.password.clone())
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingCredentials)?;

        Ok(Credentials {
            username,
            password,
            login_url: pick_url(&overrides.login_url, &self.login_url, DEFAULT_LOGIN_URL),
            pod_api_url: pick_url(&overrides.pod_api_url, &self.pod_api_url, DEFAULT_POD_API_URL),
            cdgc_api_url: pick_url(
                &overrides.cdgc_api_url,
                &self.cdgc_api_url,
                DEFAULT_CDGC_API_URL,
            ),
        })
    }

    /// Cached session usable for `username`, if it does not expire within 5 minutes.
    pub fn valid_session(&self, username: &str) -> Option<&CachedSession> {
        self.session
            .as_ref()
            .filter(|s| s.username == username && !is_expiring(s.expires_at))
    }
}

fn pick_url(flag: &Option<String>, file: &Option<String>, default: &str) -> String {
    flag.as_deref()
        .or(file.as_deref())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}

/// True when `expires_at` is in the past or less than 5 minutes away
pub fn is_expiring(expires_at: DateTime<Utc>) -> bool {
    expires_at - chrono::Duration::minutes(5) < Utc::now()
}
