// src/happiness/mod.rs
//! Combine the yearly World Happiness Report CSVs into one tidy table.

pub mod canon;

use anyhow::{anyhow, bail, Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, Int32Array, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use glob::{glob, Pattern};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info, instrument};

use crate::process::{
    parse_csv,
    utils::{coerce_f64, coerce_i32},
};
use canon::{column_positions, TARGET_COLUMNS, TARGET_COUNT};

/// Files with this prefix are our own output and never inputs.
pub const OUTPUT_PREFIX: &str = "world_happiness_";
pub const DEFAULT_OUTPUT_NAME: &str = "world_happiness_2015_2022.csv";

const COUNTRY: usize = 0;
const REGION: usize = 1;
const YEAR: usize = 2;

/// A row projected onto [`TARGET_COLUMNS`], still untyped.
pub type RawRow = [Option<String>; TARGET_COUNT];

#[derive(Debug, Clone, PartialEq)]
pub struct HappinessRow {
    pub country: String,
    pub region: Option<String>,
    pub year: i32,
    pub happiness_score: Option<f64>,
    pub gdp_per_capita: Option<f64>,
    pub social_support: Option<f64>,
    pub healthy_life_expectancy: Option<f64>,
    pub freedom: Option<f64>,
    pub generosity: Option<f64>,
    pub corruption: Option<f64>,
}

impl HappinessRow {
    /// Numeric columns in [`TARGET_COLUMNS`] order.
    fn metrics(&self) -> [Option<f64>; 7] {
        [
            self.happiness_score,
            self.gdp_per_capita,
            self.social_support,
            self.healthy_life_expectancy,
            self.freedom,
            self.generosity,
            self.corruption,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub rows: usize,
    pub countries: usize,
    pub years: Option<(i32, i32)>,
}

impl Summary {
    pub fn of(rows: &[HappinessRow]) -> Self {
        let countries: HashSet<&str> = rows.iter().map(|r| r.country.as_str()).collect();
        let years = rows
            .iter()
            .map(|r| r.year)
            .min()
            .zip(rows.iter().map(|r| r.year).max());
        Self {
            rows: rows.len(),
            countries: countries.len(),
            years,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rows: {}  Countries: {}  Years: ", self.rows, self.countries)?;
        match self.years {
            Some((lo, hi)) => write!(f, "{}-{}", lo, hi),
            None => write!(f, "n/a"),
        }
    }
}

/// All `*.csv` inputs in `dir`, sorted by name, skipping our own outputs.
pub fn list_input_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let dir_str = dir
        .to_str()
        .ok_or_else(|| anyhow!("input directory {:?} is not valid UTF-8", dir))?;
    let pattern = format!("{}/*.csv", Pattern::escape(dir_str));

    let mut files = Vec::new();
    for entry in glob(&pattern)? {
        let path = entry?;
        let skip = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with(OUTPUT_PREFIX));
        if !skip && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Year implied by a file name like `2019.csv`.
fn year_from_stem(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.trim().parse::<i32>().ok().map(|y| y.to_string())
}

/// Cell texts read as missing, the same set common CSV readers default to.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn present(s: &str) -> Option<String> {
    if NA_VALUES.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Read one yearly file and project it onto the target columns.
#[instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawRow>> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {:?}", path))?;
    let table = parse_csv(&data, 0).with_context(|| format!("parsing {:?}", path))?;

    let positions = column_positions(&table.headers);
    let stem_year = if positions[YEAR].is_none() {
        let y = year_from_stem(path);
        debug!(year = ?y, "no year column; using file name");
        y
    } else {
        None
    };

    let rows: Vec<RawRow> = table
        .rows
        .iter()
        .map(|row| {
            let mut out: RawRow = Default::default();
            for (t, pos) in positions.iter().enumerate() {
                out[t] = pos.and_then(|i| present(&row[i]));
            }
            if positions[YEAR].is_none() {
                out[YEAR] = stem_year.clone();
            }
            out
        })
        .collect();

    let name = path.file_name().map(|n| n.to_string_lossy().to_string());
    info!(
        "Loaded {}: {} rows",
        name.as_deref().unwrap_or("?"),
        rows.len()
    );
    Ok(rows)
}

/// Coerce, drop rows without country or year, dedupe on (country, year)
/// keeping the first, and sort by (country, year).
pub fn combine(frames: Vec<Vec<RawRow>>) -> Vec<HappinessRow> {
    let mut seen: HashSet<(String, i32)> = HashSet::new();
    let mut out = Vec::new();
    let mut dropped = 0usize;
    let mut duplicates = 0usize;

    for row in frames.into_iter().flatten() {
        let num = |i: usize| row[i].as_deref().and_then(coerce_f64);
        let (Some(country), Some(year)) = (
            row[COUNTRY].clone(),
            row[YEAR].as_deref().and_then(coerce_i32),
        ) else {
            dropped += 1;
            continue;
        };
        if !seen.insert((country.clone(), year)) {
            duplicates += 1;
            continue;
        }
        out.push(HappinessRow {
            region: row[REGION].clone(),
            happiness_score: num(3),
            gdp_per_capita: num(4),
            social_support: num(5),
            healthy_life_expectancy: num(6),
            freedom: num(7),
            generosity: num(8),
            corruption: num(9),
            country,
            year,
        });
    }

    out.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
    debug!(kept = out.len(), dropped, duplicates, "combined happiness rows");
    out
}

/// Load and combine every input file in `dir`.
#[instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn combine_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<HappinessRow>> {
    let files = list_input_files(&dir)?;
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    info!(files = ?names, "found CSV files");
    if files.is_empty() {
        bail!(
            "No CSV files found in {}. Put the yearly files (2015.csv ...) there.",
            dir.as_ref().display()
        );
    }

    let frames = files.iter().map(load_file).collect::<Result<Vec<_>>>()?;
    Ok(combine(frames))
}

pub fn happiness_batch(rows: &[HappinessRow]) -> Result<RecordBatch> {
    let mut fields = vec![
        Field::new(TARGET_COLUMNS[COUNTRY], DataType::Utf8, false),
        Field::new(TARGET_COLUMNS[REGION], DataType::Utf8, true),
        Field::new(TARGET_COLUMNS[YEAR], DataType::Int32, false),
    ];
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.country.as_str()),
        )),
        Arc::new(rows.iter().map(|r| r.region.as_deref()).collect::<StringArray>()),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
    ];
    for (i, name) in TARGET_COLUMNS[YEAR + 1..].iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, true));
        let col: Float64Array = rows.iter().map(|r| r.metrics()[i]).collect();
        columns.push(Arc::new(col));
    }
    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).map_err(Into::into)
}
