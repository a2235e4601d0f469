// src/happiness/canon.rs
//! Header canonicalization for the yearly happiness report CSVs, whose
//! column names drift from year to year.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const TARGET_COUNT: usize = 10;

/// Output column order of the combined table.
pub const TARGET_COLUMNS: [&str; TARGET_COUNT] = [
    "country",
    "region",
    "year",
    "happiness_score",
    "gdp_per_capita",
    "social_support",
    "healthy_life_expectancy",
    "freedom",
    "generosity",
    "corruption",
];

/// Normalized header text → canonical column.
static CANON: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("country", "country"),
        ("country name", "country"),
        ("region", "region"),
        ("year", "year"),
        ("happiness score", "happiness_score"),
        ("ladder score", "happiness_score"),
        ("score", "happiness_score"),
        ("economy (gdp per capita)", "gdp_per_capita"),
        ("logged gdp per capita", "gdp_per_capita"),
        ("gdp per capita", "gdp_per_capita"),
        ("social support", "social_support"),
        ("family", "social_support"),
        ("health (life expectancy)", "healthy_life_expectancy"),
        ("healthy life expectancy", "healthy_life_expectancy"),
        ("freedom to make life choices", "freedom"),
        ("freedom", "freedom"),
        ("generosity", "generosity"),
        ("perceptions of corruption", "corruption"),
        ("perception of corruption", "corruption"),
    ])
});

/// Trim, lowercase, and treat `_` / `-` as spaces.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(&['_', '-'][..], " ")
}

/// Canonical column for a raw header, if it is one we keep.
pub fn canonical_column(raw: &str) -> Option<&'static str> {
    CANON.get(normalize_header(raw).as_str()).copied()
}

/// For each target column, the index of the first header mapping to it.
pub fn column_positions(headers: &[String]) -> [Option<usize>; TARGET_COUNT] {
    let mut pos = [None; TARGET_COUNT];
    for (i, h) in headers.iter().enumerate() {
        let Some(canon) = canonical_column(h) else {
            continue;
        };
        if let Some(t) = TARGET_COLUMNS.iter().position(|c| *c == canon) {
            pos[t].get_or_insert(i);
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("  Country_Name "), "country name");
        assert_eq!(normalize_header("Healthy-Life-Expectancy"), "healthy life expectancy");
    }

    #[test]
    fn maps_year_variants() {
        assert_eq!(canonical_column("Country"), Some("country"));
        assert_eq!(canonical_column("country_name"), Some("country"));
        assert_eq!(canonical_column("Ladder score"), Some("happiness_score"));
        assert_eq!(canonical_column("Happiness Score"), Some("happiness_score"));
        assert_eq!(canonical_column("Economy (GDP per Capita)"), Some("gdp_per_capita"));
        assert_eq!(canonical_column("Family"), Some("social_support"));
        assert_eq!(canonical_column("Perceptions of corruption"), Some("corruption"));
        assert_eq!(canonical_column("Happiness Rank"), None);
        assert_eq!(canonical_column("Explained by: GDP per capita"), None);
    }

    #[test]
    fn every_canonical_name_is_a_target() {
        for canon in CANON.values() {
            assert!(TARGET_COLUMNS.contains(canon), "{} not a target", canon);
        }
    }

    #[test]
    fn first_matching_header_wins() {
        let headers: Vec<String> = ["Country name", "Country", "Ladder score", "Region"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let pos = column_positions(&headers);
        assert_eq!(pos[0], Some(0));
        assert_eq!(pos[1], Some(3));
        assert_eq!(pos[2], None);
        assert_eq!(pos[3], Some(2));
    }
}
