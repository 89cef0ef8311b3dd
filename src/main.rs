//! MccOp CLI - companion for the Informatica Metadata Command Center

use clap::{CommandFactory, Parser};

mod classification;
mod cli;
mod client;
mod config;
mod error;
mod output;
mod scanner;

use cli::{ClassificationCommands, Cli, Commands, GlobalOptions, ScannerCommands};
use error::Result;

#[tokio::main]
async fn main() {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOptions::from_cli(&cli);
    init_logging(opts.verbose);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("mccop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Scanner(ScannerCommands::Run(ref args)) => cli::scanner::run(&opts, args).await,
        Commands::Classification(ref cmd) => match cmd {
            ClassificationCommands::List => cli::classification::list(&opts).await,
            ClassificationCommands::Export(args) => cli::classification::export(&opts, args).await,
            ClassificationCommands::Import(args) => cli::classification::import(&opts, args).await,
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "mccop", &mut std::io::stdout());
            Ok(())
        }
    }
}
