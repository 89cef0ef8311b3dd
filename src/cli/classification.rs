//! Classification command handlers

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Local;
use colored::Colorize;
use log::info;
use serde::Serialize;
use tabled::Tabled;

use crate::classification::file::{export_file_name, unique_path, write_json};
use crate::classification::{
    self, ExportStamp, ImportOptions, ImportReport, ImportSource, Importer,
};
use crate::cli::{CommandContext, ExportArgs, GlobalOptions, ImportArgs};
use crate::client::fetch_all_classifications;
use crate::client::models::{Classification, ClassificationSummary};
use crate::error::{Error, Result};
use crate::output;

/// Classification row for list output
#[derive(Debug, Tabled, Serialize)]
pub struct ClassificationRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<ClassificationSummary> for ClassificationRow {
    fn from(c: ClassificationSummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description.unwrap_or_default(),
        }
    }
}

/// List all classifications.
pub async fn list(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;

    let rows: Vec<ClassificationRow> =
        fetch_all_classifications(&ctx.client, ctx.preferences().page_size)
            .await?
            .into_iter()
            .map(ClassificationRow::from)
            .collect();

    output::print(&rows, ctx.format)
}

/// Export one or all classifications to JSON files.
pub async fn export(opts: &GlobalOptions, args: &ExportArgs) -> Result<()> {
    let ctx = CommandContext::new(opts).await?;
    let stamp = ExportStamp::now(&ctx.session.org_name, &ctx.session.user_id);
    let page_size = ctx.preferences().page_size;
    let target = &args.target;

    if target.all {
        let batch = classification::export_all(&ctx.client, page_size, &stamp).await?;

        match args.output {
            Some(ref file) => {
                let path = args.output_dir.join(file);
                write_json(&path, &batch.records)?;
                println!(
                    "{} Exported {} classifications to {}",
                    "✓".green(),
                    batch.records.len(),
                    path.display()
                );
            }
            None => {
                let now = Local::now();
                let mut taken = HashSet::new();
                for record in &batch.records {
                    write_record(&args.output_dir, record, now, &mut taken)?;
                }
                println!(
                    "{} Exported {} classifications to {}",
                    "✓".green(),
                    batch.records.len(),
                    args.output_dir.display()
                );
            }
        }

        if !batch.failures.is_empty() {
            eprintln!("{} Failed exports:", "✗".red());
            for (name, error) in &batch.failures {
                eprintln!("  - {}: {}", name, error);
            }
            return Err(Error::ExportFailed {
                failed: batch.failures.len(),
                total: batch.total(),
            });
        }
        return Ok(());
    }

    let record = match (&target.id, &target.name) {
        (Some(id), _) => classification::export_by_id(&ctx.client, id, &stamp).await?,
        (None, Some(name)) => {
            classification::export_by_name(&ctx.client, name, page_size, &stamp).await?
        }
        (None, None) => {
            return Err(Error::Invocation(
                "One of --all, --id or --name is required".to_string(),
            ));
        }
    };

    let path = match args.output {
        Some(ref file) => {
            let path = args.output_dir.join(file);
            write_json(&path, &record)?;
            path
        }
        None => write_record(&args.output_dir, &record, Local::now(), &mut HashSet::new())?,
    };
    println!(
        "{} Exported {} to {}",
        "✓".green(),
        record.name().unwrap_or("classification"),
        path.display()
    );
    Ok(())
}

/// Write one record under a generated, collision-free file name.
fn write_record(
    dir: &Path,
    record: &Classification,
    now: chrono::DateTime<Local>,
    taken: &mut HashSet<PathBuf>,
) -> Result<PathBuf> {
    let name = export_file_name(record.name().unwrap_or("classification"), now);
    let path = unique_path(dir, &name, taken);
    write_json(&path, record)?;
    info!("Saved classification to {}", path.display());
    Ok(path)
}

/// Import classifications from a file or directory.
pub async fn import(opts: &GlobalOptions, args: &ImportArgs) -> Result<()> {
    let source = match (&args.source.file, &args.source.directory) {
        (Some(file), _) => ImportSource::File(file.clone()),
        (None, Some(dir)) => ImportSource::Directory(dir.clone()),
        (None, None) => {
            return Err(Error::Invocation(
                "One of --file or --directory is required".to_string(),
            ));
        }
    };

    let ctx = CommandContext::new(opts).await?;
    let options = ImportOptions {
        update_existing: args.update,
        on_error: args.on_error,
        page_size: ctx.preferences().page_size,
    };

    let mut importer = Importer::new(&ctx.client, options).await?;
    let report = importer.run(&source).await?;

    print_summary(&report);
    classification::check_report(&report)
}

fn print_summary(report: &ImportReport) {
    println!("\n{}", "Import Summary".bold());
    println!("  Created: {}", report.created.len());
    println!("  Updated: {}", report.updated.len());
    println!("  Skipped: {}", report.skipped.len());
    let failed = report.failures.len();
    if failed == 0 {
        println!("  Failed:  {}", failed);
    } else {
        println!("  Failed:  {}", failed.to_string().red());
        println!("\n{}", "Failures:".bold());
        for failure in &report.failures {
            match failure.name {
                Some(ref name) => println!("  - {} ({}): {}", name, failure.source, failure.error),
                None => println!("  - {}: {}", failure.source, failure.error),
            }
        }
    }
}
