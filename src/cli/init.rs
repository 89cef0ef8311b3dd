//! Init command implementation

use colored::Colorize;
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::client::MccClient;
use crate::config::{CachedSession, Config, Credentials, Overrides};
use crate::error::Result;

/// Run the init command
///
/// Prompts for credentials, verifies them with a login, and writes the
/// config file. Endpoint flags/env are honoured and saved when given.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to MccOp!".bold().green());
    println!("Let's set up your Informatica configuration.\n");

    let mut config = Config::load_or_default(opts.config_ref())?;
    let theme = ColorfulTheme::default();

    let mut username_prompt = Input::<String>::with_theme(&theme).with_prompt("Informatica username");
    if let Some(existing) = opts.username.clone().or_else(|| config.username.clone()) {
        username_prompt = username_prompt.default(existing);
    }
    let username = username_prompt.interact_text()?;

    let password = Password::with_theme(&theme)
        .with_prompt("Informatica password")
        .interact()?;

    let overrides = Overrides {
        username: Some(username.clone()),
        password: Some(password.clone()),
        ..opts.overrides()
    };
    let credentials: Credentials = config.credentials(&overrides)?;

    println!("\n{}", "Authenticating...".cyan());
    let client = MccClient::connect(&credentials).await?;
    println!("{}", "✓ Authentication successful!".green());

    if let Some(session) = client.session().await {
        println!("Organization: {}", session.org_name.bold());
        config.session = Some(CachedSession::new(&session, &username));
    }

    let store_password = Confirm::with_theme(&theme)
        .with_prompt("Store the password in the config file?")
        .default(true)
        .interact()?;

    config.username = Some(username);
    config.password = store_password.then_some(password);
    config.login_url = opts.login_url.clone().or(config.login_url);
    config.pod_api_url = opts.pod_api_url.clone().or(config.pod_api_url);
    config.cdgc_api_url = opts.cdgc_api_url.clone().or(config.cdgc_api_url);

    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );
    if config.password.is_none() {
        println!("  Set INFORMATICA_PASSWORD before running other commands.");
    }

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Show configuration status", "mccop status".cyan());
    println!("  {} - List classifications", "mccop classification list".cyan());

    Ok(())
}
