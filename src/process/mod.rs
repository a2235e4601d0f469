// src/process/mod.rs
pub mod clean;
pub mod merge;
pub mod raw_table;
pub mod reshape;
pub mod utils;

use anyhow::{Context, Result};
use tracing::debug;

pub use clean::{clean, is_entity_code, YearWindow};
pub use merge::merge_indicators;
pub use raw_table::{parse_csv, RawTable};
pub use reshape::{melt, pivot, LongRow};

/// Number of metadata lines ahead of the header in a World Bank `API_*.csv`.
pub const WORLD_BANK_PREAMBLE_LINES: usize = 4;

/// A single typed (country, year) measurement of one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub value: f64,
}

/// Cleaned long table for one indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    /// Output column the values belong to.
    pub column: String,
    pub rows: Vec<Observation>,
}

/// One merged row: every indicator value for a (country_code, year) key,
/// in indicator order.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRecord {
    pub country: String,
    pub country_code: String,
    pub year: i32,
    pub values: Vec<f64>,
}

/// Parse a World Bank data CSV and run it through reshape + clean.
pub fn indicator_table_from_csv(
    data: &[u8],
    column: &str,
    window: YearWindow,
) -> Result<IndicatorTable> {
    let wide = parse_csv(data, WORLD_BANK_PREAMBLE_LINES).context("parsing indicator CSV")?;
    let long = melt(&wide)?;
    debug!(column, entities = wide.rows.len(), long_rows = long.len(), "reshaped to long");
    let (rows, _) = clean(long, window);
    Ok(IndicatorTable {
        column: column.to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_API_CSV: &str = "\u{feff}\"Data Source\",\"World Development Indicators\",\n\
\n\
\"Last Updated Date\",\"2025-01-28\",\n\
\n\
\"Country Name\",\"Country Code\",\"Indicator Name\",\"Indicator Code\",\"1999\",\"2000\",\"2024\",\"2025\",\n\
\"Aruba\",\"ABW\",\"Individuals using the Internet (% of population)\",\"IT.NET.USER.ZS\",\"4.3\",\"15.4\",\"97.2\",\"98\",\n\
\"Africa Eastern and Southern\",\"AFE\",\"Individuals using the Internet (% of population)\",\"IT.NET.USER.ZS\",\"\",\"0.9\",\"\",\"\",\n\
\"Not classified\",\"INX\",\"Individuals using the Internet (% of population)\",\"IT.NET.USER.ZS\",\"\",\"\",\"\",\"\",\n\
\"Bad code\",\"1A\",\"Individuals using the Internet (% of population)\",\"IT.NET.USER.ZS\",\"1\",\"2\",\"3\",\"4\",\n";

    #[test]
    fn csv_to_indicator_table() -> Result<()> {
        let table = indicator_table_from_csv(
            SAMPLE_API_CSV.as_bytes(),
            "internet_users_pct",
            YearWindow::new(2000, 2024),
        )?;
        assert_eq!(table.column, "internet_users_pct");
        let keys: Vec<(&str, i32, f64)> = table
            .rows
            .iter()
            .map(|o| (o.country_code.as_str(), o.year, o.value))
            .collect();
        assert_eq!(
            keys,
            vec![("ABW", 2000, 15.4), ("AFE", 2000, 0.9), ("ABW", 2024, 97.2)]
        );
        assert!(table.rows.iter().all(|o| is_entity_code(&o.country_code)));
        assert!(table.rows.iter().all(|o| (2000..=2024).contains(&o.year)));
        Ok(())
    }
}
