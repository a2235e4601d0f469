use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::process::{
    reshape::LongRow,
    utils::{coerce_f64, coerce_i32},
    Observation,
};

/// ISO3-shaped codes. Aggregates like `WLD` or `EUU` also match.
static ENTITY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

pub fn is_entity_code(code: &str) -> bool {
    ENTITY_CODE.is_match(code)
}

/// Inclusive year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub start: i32,
    pub end: i32,
}

impl YearWindow {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanStats {
    pub input: usize,
    pub bad_code: usize,
    pub out_of_window: usize,
    pub missing_value: usize,
}

/// Coerce, filter and type long rows. Filtering is silent; nothing here fails.
pub fn clean(rows: Vec<LongRow>, window: YearWindow) -> (Vec<Observation>, CleanStats) {
    let mut stats = CleanStats {
        input: rows.len(),
        ..CleanStats::default()
    };

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let year = coerce_i32(&row.year);
        let value = coerce_f64(&row.value);

        if !is_entity_code(&row.entity_code) {
            stats.bad_code += 1;
            continue;
        }
        let year = match year {
            Some(y) if window.contains(y) => y,
            _ => {
                stats.out_of_window += 1;
                continue;
            }
        };
        let Some(value) = value else {
            stats.missing_value += 1;
            continue;
        };

        out.push(Observation {
            country: row.entity_name,
            country_code: row.entity_code,
            year,
            value,
        });
    }

    debug!(
        input = stats.input,
        kept = out.len(),
        bad_code = stats.bad_code,
        out_of_window = stats.out_of_window,
        missing_value = stats.missing_value,
        "cleaned long rows"
    );
    (out, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, year: &str, value: &str) -> LongRow {
        LongRow {
            entity_name: format!("name-{}", code),
            entity_code: code.to_string(),
            year: year.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn code_pattern_is_strict() {
        assert!(is_entity_code("USA"));
        assert!(is_entity_code("EUU"));
        assert!(is_entity_code("WLD"));
        assert!(!is_entity_code("1A"));
        assert!(!is_entity_code("usa"));
        assert!(!is_entity_code("USAA"));
        assert!(!is_entity_code(""));
    }

    #[test]
    fn filters_in_order() {
        let rows = vec![
            row("USA", "2020", "60"),
            row("EUU", "2020", "55.5"),
            row("1A", "2020", "10"),
            row("FRA", "2025", "70"),
            row("FRA", "1999", "70"),
            row("DEU", "2020", ""),
            row("DEU", "2021", ".."),
            row("GBR", "2000", "1"),
            row("GBR", "2024", "2"),
        ];
        let (out, stats) = clean(rows, YearWindow::new(2000, 2024));
        let codes: Vec<(&str, i32)> = out
            .iter()
            .map(|o| (o.country_code.as_str(), o.year))
            .collect();
        assert_eq!(
            codes,
            vec![("USA", 2020), ("EUU", 2020), ("GBR", 2000), ("GBR", 2024)]
        );
        assert_eq!(out[0].value, 60.0);
        assert_eq!(out[0].country, "name-USA");
        assert_eq!(stats.bad_code, 1);
        assert_eq!(stats.out_of_window, 2);
        assert_eq!(stats.missing_value, 2);
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = YearWindow::new(2000, 2024);
        assert!(w.contains(2000));
        assert!(w.contains(2024));
        assert!(!w.contains(1999));
        assert!(!w.contains(2025));
    }
}
