use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use worlddata::{
    happiness::{self, Summary, DEFAULT_OUTPUT_NAME},
    output,
};

/// Combine yearly World Happiness Report CSVs (2015.csv … 2022.csv) into one file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Folder holding the yearly CSV files
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Output path; defaults to `world_happiness_2015_2022.csv` inside `--dir`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    info!(dir = %args.dir.display(), "Running from");

    let rows = happiness::combine_dir(&args.dir)?;
    let batch = happiness::happiness_batch(&rows)?;

    let out_path = args
        .output
        .unwrap_or_else(|| args.dir.join(DEFAULT_OUTPUT_NAME));
    output::write_csv(&batch, &out_path)?;

    println!("\nSaved → {}", out_path.display());
    println!("{}", Summary::of(&rows));
    Ok(())
}
