//! Scanner command handlers

use std::time::{Duration, Instant};

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat, ScannerRunArgs};
use crate::client::models::{JobStatus, ScanJob};
use crate::error::{Error, Result};
use crate::scanner::{self, PollSettings};

/// Run a catalog source and (unless `--no-wait`) wait for the job.
pub async fn run(opts: &GlobalOptions, args: &ScannerRunArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let as_json = args.json || ctx.format == OutputFormat::Json;
    let capabilities = args.capabilities.selected();

    let source = scanner::search_catalog_source(&ctx.client, &args.name).await?;
    let job = scanner::execute_catalog_source(&ctx.client, &source, &capabilities).await?;

    if args.no_wait {
        if as_json {
            println!("{}", serde_json::to_string_pretty(&json!({ "job": job }))?);
        } else {
            print_job(&job);
        }
        return Ok(());
    }

    let settings = PollSettings::from_secs(
        args.poll_interval.unwrap_or(ctx.preferences().poll_interval),
        args.timeout.unwrap_or(ctx.preferences().timeout),
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Job {} started", job.job_id));

    let started = Instant::now();
    let result = scanner::monitor_job(&ctx.client, &job, settings, |status: &JobStatus| {
        spinner.set_message(format!("Job {}: {}", job.job_id, status.status));
    })
    .await;
    spinner.finish_and_clear();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e @ Error::JobFailed { .. }) => {
            eprintln!("{} Job {} failed", "✗".red(), job.job_id);
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    if as_json {
        let output = json!({ "job": job, "status": outcome.status });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_job(&job);
    let elapsed = started.elapsed().as_secs();
    if outcome.partial {
        println!(
            "{} Job completed with some errors: {} ({}s)",
            "⚠".yellow(),
            outcome.status.status,
            elapsed
        );
    } else {
        println!(
            "{} Job completed successfully: {} ({}s)",
            "✓".green(),
            outcome.status.status,
            elapsed
        );
    }

    Ok(())
}

fn print_job(job: &ScanJob) {
    println!(
        "Catalog source: {} ({})",
        job.catalog_source_name.bold(),
        job.catalog_source_id
    );
    println!("Job ID: {}", job.job_id.cyan());
    if let Some(ref uri) = job.job_uri {
        println!("Job URI: {}", uri);
    }
}
