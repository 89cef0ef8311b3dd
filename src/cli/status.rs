//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::config::{Config, is_expiring};
use crate::error::{ConfigError, Error, Result};

/// Run the status command to display configuration status
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "MccOp Configuration Status".bold());

    let config_path = Config::resolve_path(opts.config_ref())?;

    match Config::load_from(config_path.clone()) {
        Ok(config) => {
            println!("Config file: {}", config_path.display().to_string().cyan());
            println!();

            let overrides = opts.overrides();

            // Credentials may come from flags/env instead of the file
            let username = overrides.username.as_ref().or(config.username.as_ref());
            match username {
                Some(user) => println!("{} Username: {}", "✓".green(), user),
                None => {
                    println!("{} Username not configured", "✗".red());
                    println!("  → Run 'mccop init' or set INFORMATICA_USERNAME");
                }
            }
            if overrides.password.is_some() || config.password.is_some() {
                println!("{} Password configured", "✓".green());
            } else {
                println!("{} Password not configured", "✗".red());
            }

            if let Some(ref session) = config.session {
                if is_expiring(session.expires_at) {
                    println!(
                        "{} Session expired (will refresh on next command)",
                        "⚠".yellow()
                    );
                } else {
                    let remaining = session.expires_at.signed_duration_since(chrono::Utc::now());
                    println!(
                        "{} Session valid (expires in {}h {}m)",
                        "✓".green(),
                        remaining.num_hours(),
                        remaining.num_minutes() % 60
                    );
                }
                println!(
                    "{} Organization: {} ({})",
                    "✓".green(),
                    session.org_name,
                    session.org_id
                );
            } else {
                println!(
                    "{} Session not cached (will log in on next command)",
                    "○".dimmed()
                );
            }

            // Endpoints, only when not the built-in defaults
            let endpoints = [
                ("Login URL", &overrides.login_url, &config.login_url),
                ("Pod API URL", &overrides.pod_api_url, &config.pod_api_url),
                ("CDGC API URL", &overrides.cdgc_api_url, &config.cdgc_api_url),
            ];
            for (label, flag, file) in endpoints {
                if let Some(url) = flag.as_ref().or(file.as_ref()) {
                    println!("{} {}: {}", "○".dimmed(), label, url.cyan());
                }
            }

            println!();
        }
        Err(Error::Config(ConfigError::NotFound)) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "mccop init".cyan()
            );
            println!();
        }
        Err(e) => {
            println!(
                "{} Could not read configuration {}: {}",
                "✗".red(),
                config_path.display(),
                e
            );
            println!();
        }
    }

    Ok(())
}
