//! Global CLI options shared across all commands
//!
//! Consolidates the global flags so handlers take one parameter instead of
//! threading every option through.

use crate::cli::{Cli, OutputFormat};
use crate::config::Overrides;

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable (including `.env`) > config file > default.
/// This struct captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.mccop/config.yaml)
    pub config: Option<String>,

    /// Debug logging requested
    pub verbose: bool,

    pub username: Option<String>,
    pub password: Option<String>,
    pub login_url: Option<String>,
    pub pod_api_url: Option<String>,
    pub cdgc_api_url: Option<String>,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            verbose: cli.verbose,
            username: cli.username.clone(),
            password: cli.password.clone(),
            login_url: cli.login_url.clone(),
            pod_api_url: cli.pod_api_url.clone(),
            cdgc_api_url: cli.cdgc_api_url.clone(),
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Credential and endpoint overrides for config resolution.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            username: self.username.clone(),
            password: self.password.clone(),
            login_url: self.login_url.clone(),
            pod_api_url: self.pod_api_url.clone(),
            cdgc_api_url: self.cdgc_api_url.clone(),
        }
    }
}
