//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, credential resolution, and client initialization.

use log::{debug, warn};

use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::MccClient;
use crate::client::models::Session;
use crate::config::{CachedSession, Config, Preferences};
use crate::error::Result;

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration (file values only; overrides are not written back)
    pub config: Config,
    /// Authenticated API client
    pub client: MccClient,
    /// Session the client is using
    pub session: Session,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// This handles:
    /// - Loading config from path (or default location); a missing file is fine
    /// - Resolving credentials from flags, environment and config
    /// - Reusing the cached session, or logging in and caching a new one
    ///
    /// # Errors
    /// Returns error if credentials are missing or login fails.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_or_default(opts.config_ref())?;
        let credentials = config.credentials(&opts.overrides())?;

        let (client, session) = match config.valid_session(&credentials.username) {
            Some(cached) => {
                debug!("Using cached session (expires {})", cached.expires_at);
                let session = cached.to_session();
                let client = MccClient::new(&credentials)?;
                client.set_session(session.clone()).await;
                (client, session)
            }
            None => {
                let client = MccClient::connect(&credentials).await?;
                let session = client.session().await.ok_or_else(|| {
                    crate::error::ApiError::InvalidResponse("no session after login".to_string())
                })?;

                config.session = Some(CachedSession::new(&session, &credentials.username));
                // Not fatal: the next run logs in again
                if let Err(e) = config.save_at(opts.config_ref()) {
                    warn!("Could not cache session: {}", e);
                }
                (client, session)
            }
        };

        Ok(Self {
            config,
            client,
            session,
            format: opts.format,
        })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.config.preferences
    }
}
