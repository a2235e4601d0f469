// src/output/mod.rs
//! Arrow record batches for the final tables, CSV serialization and the
//! stdout preview.

use anyhow::{bail, Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
    util::pretty::pretty_format_batches,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
    sync::Arc,
};
use tracing::{info, instrument};

use crate::process::CombinedRecord;

pub const PREVIEW_ROWS: usize = 8;

/// Sort merged rows by (country, year) for output.
pub fn sort_records(records: &mut [CombinedRecord]) {
    records.sort_by(|a, b| {
        a.country
            .cmp(&b.country)
            .then(a.year.cmp(&b.year))
            .then_with(|| a.country_code.cmp(&b.country_code))
    });
}

/// Build the `country, country_code, year, <value_columns..>` batch.
pub fn combined_batch(records: &[CombinedRecord], value_columns: &[String]) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("country_code", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
    ];
    fields.extend(
        value_columns
            .iter()
            .map(|c| Field::new(c, DataType::Float64, false)),
    );

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.country.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| r.country_code.as_str()),
        )),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year))),
    ];
    if let Some(r) = records.iter().find(|r| r.values.len() != value_columns.len()) {
        bail!(
            "record {}/{} has {} values, expected {}",
            r.country_code,
            r.year,
            r.values.len(),
            value_columns.len()
        );
    }
    for i in 0..value_columns.len() {
        let col = Float64Array::from_iter_values(records.iter().map(|r| r.values[i]));
        columns.push(Arc::new(col));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}

/// Write `batch` as CSV with a header row, creating parent directories.
#[instrument(level = "info", skip(batch, path), fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer
        .write(batch)
        .with_context(|| format!("writing CSV to {:?}", path))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing {:?}", path))?;
    info!(rows = batch.num_rows(), "wrote CSV");
    Ok(())
}

/// Sort, serialize and return the written batch.
pub fn write_combined<P: AsRef<Path>>(
    mut records: Vec<CombinedRecord>,
    value_columns: &[String],
    path: P,
) -> Result<RecordBatch> {
    sort_records(&mut records);
    let batch = combined_batch(&records, value_columns)?;
    write_csv(&batch, path)?;
    Ok(batch)
}

/// Pretty-printed table of the first `n` rows.
pub fn preview(batch: &RecordBatch, n: usize) -> Result<String> {
    let head = batch.slice(0, n.min(batch.num_rows()));
    Ok(pretty_format_batches(&[head])?.to_string())
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
