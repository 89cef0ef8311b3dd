//! Catalog source scanning: find a source by name, start a job, wait for it.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::Instant;

use crate::client::CatalogApi;
use crate::client::models::{
    Capability, CatalogSource, JobState, JobStatus, ScanJob, SearchRequest, same_name,
};
use crate::error::{ApiError, Error, Result};

/// How often and how long to poll a job
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_secs(interval: u64, timeout: u64) -> Self {
        Self {
            interval: Duration::from_secs(interval.max(1)),
            timeout: Duration::from_secs(timeout),
        }
    }
}

/// Final state of a monitored job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub status: JobStatus,
    /// Completed, but some objects failed (e.g. profiling errors on a table)
    pub partial: bool,
}

/// Find a catalog source by name.
///
/// Prefers a case-insensitive exact match; otherwise falls back to the first
/// hit. No hits is an invocation error.
pub async fn search_catalog_source<C>(client: &C, name: &str) -> Result<CatalogSource>
where
    C: CatalogApi + ?Sized,
{
    info!("Searching for catalog source: {}", name);

    let response = client
        .search_assets(&SearchRequest::catalog_source(name))
        .await?;

    if response.summary.total_hits == 0 || response.hits.is_empty() {
        return Err(Error::Invocation(format!(
            "Catalog source not found: {}. Verify the catalog source name and try again.",
            name
        )));
    }

    let asset = match response
        .hits
        .iter()
        .find(|hit| same_name(&hit.summary.name, name))
    {
        Some(hit) => hit,
        None => {
            let first = &response.hits[0];
            warn!(
                "No exact match found. Using first result: {}",
                first.summary.name
            );
            first
        }
    };

    let id = asset.system_attributes.origin.clone().ok_or_else(|| {
        Error::Invocation(format!(
            "Catalog source {} has no origin id and cannot be executed",
            asset.summary.name
        ))
    })?;

    Ok(CatalogSource {
        id,
        name: asset.summary.name.clone(),
    })
}

/// Start a scan job for a catalog source.
///
/// API rejections are reported as invocation errors naming the source.
pub async fn execute_catalog_source<C>(
    client: &C,
    source: &CatalogSource,
    capabilities: &[Capability],
) -> Result<ScanJob>
where
    C: CatalogApi + ?Sized,
{
    info!("Executing catalog source: {} ({})", source.name, source.id);
    let names: Vec<&str> = capabilities.iter().map(Capability::display_name).collect();
    info!("Running with capabilities: {}", names.join(", "));

    let started = client
        .run_catalog_source_job(&source.id, capabilities)
        .await
        .map_err(|e| match e {
            Error::Api(api @ (ApiError::Network(_) | ApiError::Unauthorized)) => Error::Api(api),
            other => Error::Invocation(format!(
                "Failed to execute catalog source {}: {}",
                source.name, other
            )),
        })?;

    let job_id = started.job_id.ok_or_else(|| {
        Error::Invocation(format!(
            "Failed to execute catalog source {}: job id not found in response",
            source.name
        ))
    })?;
    let job_uri = started.job_uri.or(started.tracking_uri);

    info!("Job ID: {}", job_id);
    if let Some(ref uri) = job_uri {
        info!("Job URI: {}", uri);
    }

    Ok(ScanJob {
        job_id,
        job_uri,
        catalog_source_name: source.name.clone(),
        catalog_source_id: source.id.clone(),
    })
}

/// Poll a job until it reaches a terminal state or `settings.timeout` elapses.
///
/// `on_poll` sees every status fetched, for progress display.
pub async fn monitor_job<C, F>(
    client: &C,
    job: &ScanJob,
    settings: PollSettings,
    mut on_poll: F,
) -> Result<JobOutcome>
where
    C: CatalogApi + ?Sized,
    F: FnMut(&JobStatus),
{
    info!(
        "Monitoring job {} (poll every {}s, timeout {}s)",
        job.job_id,
        settings.interval.as_secs(),
        settings.timeout.as_secs()
    );

    // A timeout too large to represent means no deadline
    let deadline = Instant::now().checked_add(settings.timeout);

    loop {
        let status = client.get_job_status(&job.job_id).await?;
        debug!("Current job state: {}", status.status);
        on_poll(&status);

        match status.job_state() {
            JobState::Succeeded => {
                info!("Job completed successfully");
                return Ok(JobOutcome {
                    status,
                    partial: false,
                });
            }
            JobState::CompletedWithErrors => {
                warn!("Job completed with some errors");
                return Ok(JobOutcome {
                    status,
                    partial: true,
                });
            }
            JobState::Failed => {
                let message = status
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("job ended with status {}", status.status));
                return Err(Error::JobFailed {
                    job_id: job.job_id.clone(),
                    message,
                });
            }
            JobState::Running => {}
        }

        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(Error::Timeout {
                        job_id: job.job_id.clone(),
                        waited: settings.timeout,
                    });
                }
                settings.interval.min(deadline - now)
            }
            None => settings.interval,
        };
        tokio::time::sleep(pause).await;
    }
}
