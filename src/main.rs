use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Client;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use worlddata::{
    fetch,
    output::{self, PREVIEW_ROWS},
    process::{merge_indicators, YearWindow},
    PipelineConfig,
};

/// Build the digital-divide dataset (internet use, broadband, GDP per capita)
/// from World Bank bulk indicator downloads.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML file overriding indicators, year window, output path or timeout
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<String>,

    /// First year kept (inclusive)
    #[arg(long)]
    start_year: Option<i32>,

    /// Last year kept (inclusive)
    #[arg(long)]
    end_year: Option<i32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    // ─── 2) configuration ────────────────────────────────────────────
    let args = Args::parse();
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(output) = args.output {
        cfg.output = output;
    }
    if let Some(y) = args.start_year {
        cfg.start_year = y;
    }
    if let Some(y) = args.end_year {
        cfg.end_year = y;
    }
    cfg.validate()?;
    let window = YearWindow::new(cfg.start_year, cfg.end_year);
    info!(
        indicators = cfg.indicators.len(),
        start_year = window.start,
        end_year = window.end,
        output = %cfg.output,
        "startup"
    );

    // ─── 3) fetch, reshape + clean each indicator in turn ────────────
    let client = Client::builder()
        .timeout(cfg.timeout())
        .build()
        .context("building HTTP client")?;
    let base = cfg.base_url()?;
    let mut tables = Vec::with_capacity(cfg.indicators.len());
    for ind in &cfg.indicators {
        info!(code = %ind.code, label = %ind.label, "Downloading {} …", ind.code);
        let start = Instant::now();
        let table = fetch::fetch_indicator(&client, &base, ind, window).await?;
        info!(code = %ind.code, elapsed = ?start.elapsed(), "done");
        tables.push(table);
    }

    // ─── 4) merge on (country_code, year) ────────────────────────────
    let records = merge_indicators(&tables)?;

    // ─── 5) write + summary ──────────────────────────────────────────
    let batch = output::write_combined(records, &cfg.value_columns(), &cfg.output)?;
    println!("\n✅ Created {}", cfg.output);
    println!("Rows: {}", output::format_thousands(batch.num_rows()));
    println!("{}", output::preview(&batch, PREVIEW_ROWS)?);
    Ok(())
}
