// src/process/merge.rs

use anyhow::{bail, Result};
use std::collections::{hash_map::Entry, HashMap, HashSet};
use tracing::{debug, warn};

use crate::process::{CombinedRecord, IndicatorTable};

type Key<'a> = (&'a str, i32);

/// Inner-join `tables` on (country_code, year).
///
/// Keys keep the order they have in the first table. The display name is
/// looked up from the first table by country code, so name variants in later
/// tables never reach the output. A repeated key within one table keeps its
/// first value.
pub fn merge_indicators(tables: &[IndicatorTable]) -> Result<Vec<CombinedRecord>> {
    let Some((first, rest)) = tables.split_first() else {
        bail!("nothing to merge: no indicator tables");
    };

    let lookups: Vec<HashMap<Key<'_>, f64>> = rest
        .iter()
        .map(|t| {
            let mut map = HashMap::with_capacity(t.rows.len());
            for o in &t.rows {
                match map.entry((o.country_code.as_str(), o.year)) {
                    Entry::Vacant(e) => {
                        e.insert(o.value);
                    }
                    Entry::Occupied(_) => {
                        warn!(column = %t.column, code = %o.country_code, year = o.year, "duplicate key");
                    }
                }
            }
            map
        })
        .collect();

    let mut names: HashMap<&str, &str> = HashMap::new();
    for o in &first.rows {
        names
            .entry(o.country_code.as_str())
            .or_insert(o.country.as_str());
    }

    let mut seen: HashSet<Key<'_>> = HashSet::new();
    let mut out = Vec::new();
    for o in &first.rows {
        let key = (o.country_code.as_str(), o.year);
        if !seen.insert(key) {
            warn!(column = %first.column, code = %o.country_code, year = o.year, "duplicate key");
            continue;
        }

        let mut values: Vec<Option<f64>> = Vec::with_capacity(tables.len());
        values.push(Some(o.value));
        values.extend(lookups.iter().map(|m| m.get(&key).copied()));

        // inner join + final dropna in one step
        let Some(values) = values.into_iter().collect::<Option<Vec<f64>>>() else {
            continue;
        };
        let country = names
            .get(key.0)
            .map(|n| n.to_string())
            .unwrap_or_default();

        out.push(CombinedRecord {
            country,
            country_code: o.country_code.clone(),
            year: o.year,
            values,
        });
    }

    debug!(
        tables = tables.len(),
        first_rows = first.rows.len(),
        merged = out.len(),
        "merged indicator tables"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Observation;

    fn table(column: &str, rows: &[(&str, &str, i32, f64)]) -> IndicatorTable {
        IndicatorTable {
            column: column.to_string(),
            rows: rows
                .iter()
                .map(|(name, code, year, value)| Observation {
                    country: name.to_string(),
                    country_code: code.to_string(),
                    year: *year,
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn three_way_inner_join() -> Result<()> {
        let a = table("a", &[("United States", "USA", 2020, 60.0)]);
        let b = table(
            "b",
            &[
                ("United States", "USA", 2020, 70.0),
                ("France", "FRA", 2020, 80.0),
            ],
        );
        let c = table("c", &[("United States", "USA", 2020, 90.0)]);

        let merged = merge_indicators(&[a, b, c])?;
        assert_eq!(
            merged,
            vec![CombinedRecord {
                country: "United States".into(),
                country_code: "USA".into(),
                year: 2020,
                values: vec![60.0, 70.0, 90.0],
            }]
        );
        Ok(())
    }

    #[test]
    fn key_missing_from_any_table_is_dropped() -> Result<()> {
        let a = table(
            "a",
            &[("France", "FRA", 2020, 1.0), ("France", "FRA", 2021, 2.0)],
        );
        let b = table(
            "b",
            &[("France", "FRA", 2020, 3.0), ("France", "FRA", 2021, 4.0)],
        );
        let c = table("c", &[("France", "FRA", 2021, 5.0)]);
        let merged = merge_indicators(&[a, b, c])?;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].year, 2021);
        assert_eq!(merged[0].values, vec![2.0, 4.0, 5.0]);
        Ok(())
    }

    #[test]
    fn display_name_comes_from_first_table() -> Result<()> {
        let a = table("a", &[("Egypt, Arab Rep.", "EGY", 2010, 1.0)]);
        let b = table("b", &[("Egypt", "EGY", 2010, 2.0)]);
        let merged = merge_indicators(&[a, b])?;
        assert_eq!(merged[0].country, "Egypt, Arab Rep.");
        Ok(())
    }

    #[test]
    fn duplicate_keys_keep_first() -> Result<()> {
        let a = table(
            "a",
            &[("X", "XXX", 2010, 1.0), ("X", "XXX", 2010, 9.0)],
        );
        let b = table(
            "b",
            &[("X", "XXX", 2010, 2.0), ("X", "XXX", 2010, 8.0)],
        );
        let merged = merge_indicators(&[a, b])?;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].values, vec![1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(merge_indicators(&[]).is_err());
    }

    #[test]
    fn single_table_passes_through() -> Result<()> {
        let a = table("a", &[("Chile", "CHL", 2015, 4.5)]);
        let merged = merge_indicators(&[a])?;
        assert_eq!(merged[0].values, vec![4.5]);
        Ok(())
    }
}
