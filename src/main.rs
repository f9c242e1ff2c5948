use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use hidmerge::io::output_header;
use hidmerge::{
    execute_stage2, handle, parse_csv_file, MergeError, ObjectStoreStorage, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "hidmerge")]
#[command(author, version, about = "Merge anxiety and demographics CSVs on a normalized homeless ID", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one merge invocation configured from the environment
    ///
    /// Reads INPUT_BUCKET, OUTPUT_BUCKET, ANXIETY_KEY, DEMOGRAPHICS_KEY and
    /// OUTPUT_KEY, then prints the outcome record as JSON.
    Run {
        /// Serve buckets from subdirectories of this directory instead of S3
        #[arg(long)]
        local_root: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Join two local CSV files and report the result without writing anything
    Analyze {
        /// Anxiety CSV file
        #[arg(short, long)]
        anxiety: PathBuf,

        /// Demographics CSV file
        #[arg(short, long)]
        demographics: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            local_root,
            verbose,
        } => {
            setup_logging(verbose);
            run(local_root).await
        }
        Commands::Analyze {
            anxiety,
            demographics,
            verbose,
        } => {
            setup_logging(verbose);
            analyze(anxiety, demographics)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr; stdout is reserved for the outcome record.
fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(local_root: Option<PathBuf>) -> Result<ExitCode> {
    let outcome = handle(PipelineConfig::from_env(), |config| {
        let buckets = [config.input_bucket.as_str(), config.output_bucket.as_str()];
        let storage = match &local_root {
            Some(root) => ObjectStoreStorage::local(root, buckets),
            None => ObjectStoreStorage::s3(buckets),
        };
        storage.map_err(MergeError::Connect)
    })
    .await;

    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?
    );

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn analyze(anxiety_path: PathBuf, demographics_path: PathBuf) -> Result<()> {
    info!("Analyzing {:?} against {:?}", anxiety_path, demographics_path);
    let anxiety = parse_csv_file(&anxiety_path).context("Failed to load anxiety dataset")?;
    let demographics =
        parse_csv_file(&demographics_path).context("Failed to load demographics dataset")?;

    let joined = execute_stage2(&anxiety, &demographics);
    let header = output_header(&joined.merged, &[&anxiety, &demographics]);

    println!("Merge Analysis");
    println!("==============");
    println!("Anxiety rows: {}", anxiety.len());
    println!("Demographics rows: {}", demographics.len());
    println!("Distinct demographics HIDs: {}", joined.lookup_size);
    println!();

    println!("Join");
    println!("----");
    println!("Merged rows: {}", joined.merged.len());
    println!("Skipped anxiety rows: {}", joined.skipped);
    println!("  without a demographics match: {}", joined.unmatched);
    println!(
        "  with a missing or invalid ID: {}",
        joined.skipped - joined.unmatched
    );
    println!();

    println!("Output header ({} columns)", header.len());
    println!("-------------");
    println!("{}", header.join(","));

    if !joined.warnings.is_empty() {
        println!();
        println!("Warnings ({})", joined.warnings.len());
        println!("--------");
        for warning in &joined.warnings {
            println!("{}", warning);
        }
    }

    Ok(())
}
