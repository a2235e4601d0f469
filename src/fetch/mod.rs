// src/fetch/mod.rs
//! Download World Bank bulk indicator archives and turn them into cleaned
//! long tables.

pub mod urls;
pub mod zips;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{info, instrument};
use url::Url;

use crate::config::IndicatorSpec;
use crate::process::{indicator_table_from_csv, IndicatorTable, YearWindow};

/// Fetch one indicator: download the archive, pick the `API_*` data file,
/// reshape it to long form and clean it.
#[instrument(level = "info", skip(client, base, spec), fields(code = %spec.code))]
pub async fn fetch_indicator(
    client: &Client,
    base: &Url,
    spec: &IndicatorSpec,
    window: YearWindow,
) -> Result<IndicatorTable> {
    let url = urls::indicator_zip_url_in(base, &spec.code)?;
    let bytes = zips::download_zip(client, &url).await?;
    let table = indicator_table_from_zip(&bytes, spec, window)
        .with_context(|| format!("processing indicator {}", spec.code))?;
    info!(
        column = %table.column,
        rows = table.rows.len(),
        "indicator ready"
    );
    Ok(table)
}

/// Offline half of [`fetch_indicator`].
pub fn indicator_table_from_zip(
    zip_bytes: &[u8],
    spec: &IndicatorSpec,
    window: YearWindow,
) -> Result<IndicatorTable> {
    let (name, data) = zips::extract_entry(zip_bytes, &zips::API_DATA_FILE)?;
    indicator_table_from_csv(&data, &spec.column, window)
        .with_context(|| format!("in archive entry {}", name))
}
