// src/process/reshape.rs
//! Wide ⇄ long conversion for World Bank style tables
//! (one row per entity, one column per year).

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

use crate::process::raw_table::RawTable;

pub const ENTITY_NAME_COLUMN: &str = "Country Name";
pub const ENTITY_CODE_COLUMN: &str = "Country Code";

static YEAR_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// One (entity, year) cell of a wide table, still unparsed.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub entity_name: String,
    pub entity_code: String,
    pub year: String,
    pub value: String,
}

pub fn is_year_header(header: &str) -> bool {
    YEAR_HEADER.is_match(header)
}

/// Melt a wide table into long rows. Every year column yields one row per
/// entity, blanks included; emitted column by column.
pub fn melt(table: &RawTable) -> Result<Vec<LongRow>> {
    let name_idx = table.require_column(ENTITY_NAME_COLUMN)?;
    let code_idx = table.require_column(ENTITY_CODE_COLUMN)?;

    let year_cols: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_year_header(h))
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let mut out = Vec::with_capacity(year_cols.len() * table.rows.len());
    for (col, year) in &year_cols {
        for row in &table.rows {
            out.push(LongRow {
                entity_name: row[name_idx].clone(),
                entity_code: row[code_idx].clone(),
                year: year.to_string(),
                value: row[*col].clone(),
            });
        }
    }
    Ok(out)
}

/// Inverse of [`melt`]: entities in first-seen order, years ascending.
/// Cells with no long row are left blank.
pub fn pivot(rows: &[LongRow]) -> RawTable {
    let years: BTreeSet<&str> = rows.iter().map(|r| r.year.as_str()).collect();
    let year_pos: HashMap<&str, usize> = years
        .iter()
        .enumerate()
        .map(|(i, y)| (*y, i + 2))
        .collect();

    let mut headers = vec![
        ENTITY_NAME_COLUMN.to_string(),
        ENTITY_CODE_COLUMN.to_string(),
    ];
    headers.extend(years.iter().map(|y| y.to_string()));

    let mut entity_row: HashMap<(&str, &str), usize> = HashMap::new();
    let mut out_rows: Vec<Vec<String>> = Vec::new();
    for r in rows {
        let key = (r.entity_name.as_str(), r.entity_code.as_str());
        let idx = *entity_row.entry(key).or_insert_with(|| {
            let mut row = vec![String::new(); headers.len()];
            row[0] = r.entity_name.clone();
            row[1] = r.entity_code.clone();
            out_rows.push(row);
            out_rows.len() - 1
        });
        out_rows[idx][year_pos[r.year.as_str()]] = r.value.clone();
    }

    RawTable {
        headers,
        rows: out_rows,
    }
}
