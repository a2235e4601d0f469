use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::io::Cursor;

use crate::process::utils::{offset_after_lines, strip_bom};

/// An untyped CSV table: header names plus every data row as text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Each row padded to `headers.len()`.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Position of the column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`RawTable::column_index`] but a missing column is an error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| anyhow!("column `{}` not found in {:?}", name, self.headers))
    }
}

/// Parse CSV bytes after skipping `skip_lines` physical lines of preamble.
/// The first line after the preamble is the header row.
pub fn parse_csv(data: &[u8], skip_lines: usize) -> Result<RawTable> {
    let data = strip_bom(data);
    let start = offset_after_lines(data, skip_lines).ok_or_else(|| {
        anyhow!(
            "expected at least {} preamble lines before the header",
            skip_lines
        )
    })?;

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // trailing commas give ragged rows
        .from_reader(Cursor::new(&data[start..]));

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(anyhow!("CSV header row is empty"));
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
