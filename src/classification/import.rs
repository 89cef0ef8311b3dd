//! Classification import

use std::collections::HashMap;
use std::path::PathBuf;

use log::{error, info, warn};

use super::file::{list_json_files, read_classification_file};
use crate::client::models::{Classification, name_key, same_name};
use crate::client::{ClassificationApi, fetch_all_classifications};
use crate::error::{Error, Result};

/// What to do when a record fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OnError {
    /// Keep going and report every failure at the end
    #[default]
    Continue,
    /// Abort on the first failure
    Stop,
}

/// Where records come from
#[derive(Debug, Clone)]
pub enum ImportSource {
    File(PathBuf),
    Directory(PathBuf),
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Update classifications that already exist instead of skipping them
    pub update_existing: bool,
    pub on_error: OnError,
    /// Page size used to list existing classifications
    pub page_size: usize,
}

/// What happened to a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Updated,
    Skipped,
}

/// A record (or file) that could not be imported
#[derive(Debug, Clone)]
pub struct RecordFailure {
    /// File the record came from, with its position for array files
    pub source: String,
    pub name: Option<String>,
    pub error: String,
}

/// Tally of an import run
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<RecordFailure>,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.updated.len() + self.skipped.len() + self.failures.len()
    }

    fn record(&mut self, outcome: RecordOutcome, name: String) {
        match outcome {
            RecordOutcome::Created => self.created.push(name),
            RecordOutcome::Updated => self.updated.push(name),
            RecordOutcome::Skipped => self.skipped.push(name),
        }
    }
}

/// Imports classifications, creating or updating each by name.
pub struct Importer<'a, C: ?Sized> {
    client: &'a C,
    options: ImportOptions,
    /// Lowercased name -> id of classifications on the server; `None` for
    /// ones created in this run
    existing: HashMap<String, Option<String>>,
}

impl<'a, C> Importer<'a, C>
where
    C: ClassificationApi + ?Sized,
{
    /// Build an importer, loading the names of existing classifications once.
    pub async fn new(client: &'a C, options: ImportOptions) -> Result<Self> {
        let existing = fetch_all_classifications(client, options.page_size)
            .await?
            .into_iter()
            .map(|c| (name_key(&c.name), Some(c.id)))
            .collect::<HashMap<_, _>>();
        info!("Found {} existing classifications", existing.len());

        Ok(Self {
            client,
            options,
            existing,
        })
    }

    /// Create the record, or update/skip it if the name already exists.
    pub async fn import_record(&mut self, record: &Classification) -> Result<RecordOutcome> {
        let name = record.name().unwrap_or_default().to_string();
        let key = name_key(&name);
        let prepared = record.prepared_for_import();

        match self.existing.get(&key).cloned() {
            Some(_) if !self.options.update_existing => {
                info!("Skipped (already exists): {}", name);
                Ok(RecordOutcome::Skipped)
            }
            Some(id) => {
                let id = match id {
                    Some(id) => id,
                    None => self.lookup_id(&name).await?,
                };
                info!("Updating existing classification: {}", name);
                self.client.update_classification(&id, &prepared).await?;
                Ok(RecordOutcome::Updated)
            }
            None => {
                info!("Creating new classification: {}", name);
                self.client.create_classification(&prepared).await?;
                // Create returns no id; resolved on demand if the name shows up again
                self.existing.insert(key, None);
                Ok(RecordOutcome::Created)
            }
        }
    }

    async fn lookup_id(&mut self, name: &str) -> Result<String> {
        let id = fetch_all_classifications(self.client, self.options.page_size)
            .await?
            .into_iter()
            .find(|c| same_name(&c.name, name))
            .map(|c| c.id)
            .ok_or_else(|| {
                Error::Invocation(format!("Classification {} not found after creation", name))
            })?;
        self.existing.insert(name_key(name), Some(id.clone()));
        Ok(id)
    }

    /// Import every record from a file or directory.
    pub async fn run(&mut self, source: &ImportSource) -> Result<ImportReport> {
        let (files, is_directory) = match source {
            ImportSource::File(path) => (vec![path.clone()], false),
            ImportSource::Directory(dir) => (list_json_files(dir)?, true),
        };
        if is_directory && files.is_empty() {
            warn!("No JSON files found to import");
        }

        let mut report = ImportReport::default();
        let total_files = files.len();

        for (idx, path) in files.iter().enumerate() {
            info!("[{}/{}] Processing: {}", idx + 1, total_files, path.display());

            let records = match read_classification_file(path) {
                Ok(records) => records,
                Err(e) if is_directory && self.options.on_error == OnError::Continue => {
                    error!("Failed to read {}: {}", path.display(), e);
                    report.failures.push(RecordFailure {
                        source: path.display().to_string(),
                        name: None,
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let multiple = records.len() > 1;
            for (pos, record) in records.into_iter().enumerate() {
                let source = if multiple {
                    format!("{} [record {}]", path.display(), pos + 1)
                } else {
                    path.display().to_string()
                };

                let (name, result) = match record {
                    Ok(record) => {
                        let name = record.name().map(str::to_string);
                        (name, self.import_record(&record).await)
                    }
                    Err(e) => (None, Err(e)),
                };

                match result {
                    Ok(outcome) => report.record(outcome, name.unwrap_or_default()),
                    Err(e) => {
                        error!(
                            "Failed to import {}: {}",
                            name.as_deref().unwrap_or(&source),
                            e
                        );
                        if self.options.on_error == OnError::Stop {
                            return Err(e);
                        }
                        report.failures.push(RecordFailure {
                            source,
                            name,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        Ok(report)
    }
}

/// Turn a finished report into the command result
pub fn check_report(report: &ImportReport) -> Result<()> {
    if report.failures.is_empty() {
        Ok(())
    } else {
        Err(Error::ImportFailed {
            failed: report.failures.len(),
            total: report.total(),
        })
    }
}
