//! Classification export

use chrono::{DateTime, Utc};
use log::{debug, error, info};

use crate::client::models::{Classification, ClassificationSummary, same_name};
use crate::client::{ClassificationApi, fetch_all_classifications};
use crate::error::{Error, Result};

/// Who exported, and when; stamped onto every exported record
#[derive(Debug, Clone)]
pub struct ExportStamp {
    pub org_name: String,
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl ExportStamp {
    pub fn now(org_name: &str, user_id: &str) -> Self {
        Self {
            org_name: org_name.to_string(),
            user_id: user_id.to_string(),
            at: Utc::now(),
        }
    }

    fn apply(&self, record: &mut Classification) {
        let date = self.at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        record.stamp_export(&date, &self.org_name, &self.user_id);
    }
}

/// Result of exporting every classification
#[derive(Debug, Default)]
pub struct ExportBatch {
    pub records: Vec<Classification>,
    /// (name, error) for classifications whose details could not be fetched
    pub failures: Vec<(String, String)>,
}

impl ExportBatch {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Case-insensitive lookup by name
pub fn find_by_name<'a>(
    summaries: &'a [ClassificationSummary],
    name: &str,
) -> Option<&'a ClassificationSummary> {
    summaries.iter().find(|c| same_name(&c.name, name))
}

/// Fetch one classification by id and stamp it for export.
pub async fn export_by_id<C>(client: &C, id: &str, stamp: &ExportStamp) -> Result<Classification>
where
    C: ClassificationApi + ?Sized,
{
    info!("Fetching classification details for {}", id);
    let mut record = client.get_classification(id).await?;
    info!(
        "Retrieved classification: {}",
        record.name().unwrap_or("N/A")
    );
    stamp.apply(&mut record);
    Ok(record)
}

/// Find a classification by name, then export it.
pub async fn export_by_name<C>(
    client: &C,
    name: &str,
    page_size: usize,
    stamp: &ExportStamp,
) -> Result<Classification>
where
    C: ClassificationApi + ?Sized,
{
    let summaries = fetch_all_classifications(client, page_size).await?;
    info!("Retrieved {} classifications", summaries.len());

    let found = find_by_name(&summaries, name)
        .ok_or_else(|| Error::Invocation(format!("Classification not found: {}", name)))?;
    info!("Found classification: {} (ID: {})", found.name, found.id);

    export_by_id(client, &found.id, stamp).await
}

/// Export every classification, collecting per-item failures.
pub async fn export_all<C>(client: &C, page_size: usize, stamp: &ExportStamp) -> Result<ExportBatch>
where
    C: ClassificationApi + ?Sized,
{
    let summaries = fetch_all_classifications(client, page_size).await?;
    let total = summaries.len();
    info!("Starting export of {} classifications", total);

    let mut batch = ExportBatch::default();
    for (idx, summary) in summaries.iter().enumerate() {
        info!("[{}/{}] Exporting: {}", idx + 1, total, summary.name);
        debug!("Classification ID: {}", summary.id);

        match client.get_classification(&summary.id).await {
            Ok(mut record) => {
                stamp.apply(&mut record);
                batch.records.push(record);
            }
            Err(e) => {
                error!("Failed to export {}: {}", summary.name, e);
                batch.failures.push((summary.name.clone(), e.to_string()));
            }
        }
    }

    Ok(batch)
}
