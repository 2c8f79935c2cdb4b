#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    CollectInput, CollectStrategy, CommandStrategy, ExtractInput, ExtractStrategy, InfoStrategy,
    InitStrategy, InspectInput, InspectStrategy, PreprocessInput, PreprocessStrategy,
    VersionStrategy,
};

#[derive(Parser)]
#[command(name = "trialex")]
#[command(about = "Eligibility criteria extraction for clinical trials", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
    /// Search the registry and save trials with eligibility criteria
    Collect {
        /// Stop after this many trials
        #[arg(short = 'n', long)]
        max_total: Option<usize>,

        /// Where to write the raw trials
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Split and itemize the criteria of collected trials
    Preprocess {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Extract entities and summaries from preprocessed trials
    Extract {
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the extraction steps over one criteria text and print the result
    Inspect {
        /// Criteria text file; stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
        Commands::Collect { max_total, output } => {
            CollectStrategy
                .execute(CollectInput { max_total, output })
                .await
        }
        Commands::Preprocess { input, output } => {
            PreprocessStrategy
                .execute(PreprocessInput { input, output })
                .await
        }
        Commands::Extract { input, output } => {
            ExtractStrategy
                .execute(ExtractInput { input, output })
                .await
        }
        Commands::Inspect { file } => InspectStrategy.execute(InspectInput { file }).await,
    }
}
