//! Character Recs - command-line entry point

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use character_recs::core::error::Result;
use character_recs::core::RecommenderConfig;
use character_recs::data::report::DatasetReport;
use character_recs::data::Dataset;
use character_recs::pipeline::Pipeline;

#[derive(Parser, Debug)]
#[command(name = "character-recs")]
#[command(about = "Recommend feats, weapons, armor and next classes for characters")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Common {
    /// Character records (JSON array or one JSON object per line)
    #[arg(long)]
    input: PathBuf,

    /// TOML configuration; defaults are used for anything left out
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize the dataset
    Report(Common),
    /// Evaluate popularity and item-neighbor baselines
    Baselines(Common),
    /// Tune (or load) blend weights, evaluate and export recommendations
    Hybrid {
        #[command(flatten)]
        common: Common,
        /// Ignore cached weights and tune again
        #[arg(long)]
        retune: bool,
        /// Directory for exported JSON files
        #[arg(long, default_value = "processed")]
        out: PathBuf,
    },
    /// Suggest next classes and export them
    NextClass {
        #[command(flatten)]
        common: Common,
        /// Directory for exported JSON files
        #[arg(long, default_value = "processed")]
        out: PathBuf,
    },
}

fn load(common: &Common) -> Result<(Dataset, RecommenderConfig)> {
    let config = RecommenderConfig::load(common.config.as_deref())?;
    let dataset = Dataset::load(&common.input)?;
    Ok((dataset, config))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("character_recs=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Report(common) => {
            let (dataset, _) = load(&common)?;
            println!("{}", DatasetReport::new(&dataset).summary());
        }
        Command::Baselines(common) => {
            let (dataset, config) = load(&common)?;
            let pipeline = Pipeline::new(dataset, config);
            for report in pipeline.baselines() {
                println!("{}", report.summary());
            }
        }
        Command::Hybrid { common, retune, out } => {
            let (dataset, config) = load(&common)?;
            let pipeline = Pipeline::new(dataset, config);
            let run = pipeline.run_hybrid(retune)?;
            println!("{}", run.summary());
            run.export(&out)?;
            println!("\nSaved per-character recommendations -> {}", out.display());
        }
        Command::NextClass { common, out } => {
            let (dataset, config) = load(&common)?;
            let pipeline = Pipeline::new(dataset, config);
            let run = pipeline.run_next_class();
            run.export(&out)?;
            println!("Saved next-class suggestions -> {}", out.display());
        }
    }

    Ok(())
}
