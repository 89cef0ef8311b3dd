//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

use crate::classification::OnError;

pub mod args;
pub mod classification;
pub mod context;
pub mod init;
pub mod scanner;
pub mod status;

pub use args::{CapabilityArgs, GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// MccOp CLI - companion for the Informatica Metadata Command Center
#[derive(Parser, Debug)]
#[command(name = "mccop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "MCCOP_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "MCCOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "MCCOP_VERBOSE", hide_env = true)]
    pub verbose: bool,

    /// Informatica username
    #[arg(long, global = true, env = "INFORMATICA_USERNAME", hide_env = true)]
    pub username: Option<String>,

    /// Informatica password
    #[arg(
        long,
        global = true,
        env = "INFORMATICA_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// IDMC login URL
    #[arg(long, global = true, env = "INFORMATICA_LOGIN_URL", hide_env = true)]
    pub login_url: Option<String>,

    /// IDMC pod API URL (JWT exchange)
    #[arg(long, global = true, env = "INFORMATICA_POD_API_URL", hide_env = true)]
    pub pod_api_url: Option<String>,

    /// CDGC API URL
    #[arg(long, global = true, env = "INFORMATICA_CDGC_API_URL", hide_env = true)]
    pub cdgc_api_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize MccOp configuration
    Init,

    /// Show authentication and configuration status
    Status,

    /// Display version information
    Version,

    /// Run catalog source scans
    #[command(subcommand)]
    Scanner(ScannerCommands),

    /// List, export and import classifications
    #[command(subcommand)]
    Classification(ClassificationCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   mccop completion bash > /etc/bash_completion.d/mccop
  zsh:    mccop completion zsh > \"${fpath[1]}/_mccop\"
  fish:   mccop completion fish > ~/.config/fish/completions/mccop.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Scanner subcommands
#[derive(Subcommand, Debug)]
pub enum ScannerCommands {
    /// Run a catalog source and wait for the job to finish
    #[command(after_help = "\
Examples:
  mccop scanner run --name \"Snowflake_Prod\" --metadata-extraction
  mccop scanner run --name \"Oracle_DW\" --metadata-extraction --data-profiling --data-quality")]
    Run(ScannerRunArgs),
}

/// Arguments for `scanner run`
#[derive(Args, Debug, Clone)]
pub struct ScannerRunArgs {
    /// Catalog source name
    #[arg(long, short = 'n')]
    pub name: String,

    #[command(flatten)]
    pub capabilities: CapabilityArgs,

    /// Seconds between status checks [default: preferences.poll_interval or 30]
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds to wait before giving up [default: preferences.timeout or 3600]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Start the job and exit without waiting
    #[arg(long)]
    pub no_wait: bool,

    /// Print job details and final status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Classification subcommands
#[derive(Subcommand, Debug)]
pub enum ClassificationCommands {
    /// List classifications (id, name, description)
    List,

    /// Export classifications to JSON files
    #[command(after_help = "\
Examples:
  mccop classification export --all
  mccop classification export --all --output all_classifications.json
  mccop classification export --name \"PII\" --output-dir ./exports")]
    Export(ExportArgs),

    /// Import classifications from JSON files
    #[command(after_help = "\
Examples:
  mccop classification import --file pii.json
  mccop classification import --directory ./classifications --update
  mccop classification import --directory ./classifications --on-error stop")]
    Import(ImportArgs),
}

/// Arguments for `classification export`
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub target: ExportTarget,

    /// Output file name, written inside the output directory
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Output directory for JSON files
    #[arg(long, short = 'd', default_value = "./output")]
    pub output_dir: PathBuf,
}

/// Which classifications to export; exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ExportTarget {
    /// Export every classification
    #[arg(long)]
    pub all: bool,

    /// Export one classification by id
    #[arg(long)]
    pub id: Option<String>,

    /// Export one classification by name (case-insensitive)
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for `classification import`
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: ImportSourceArgs,

    /// Update classifications that already exist (default: skip them)
    #[arg(long)]
    pub update: bool,

    /// What to do when a record fails
    #[arg(long, value_enum, default_value_t = OnError::Continue)]
    pub on_error: OnError,
}

/// Where to read classifications from; exactly one is required.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct ImportSourceArgs {
    /// JSON file with one classification or an array of them
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Directory of JSON files, imported in file name order
    #[arg(long, short = 'd')]
    pub directory: Option<PathBuf>,
}
