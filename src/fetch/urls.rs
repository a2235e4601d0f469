// src/fetch/urls.rs
use anyhow::{bail, Context, Result};
use url::Url;

pub static WORLD_BANK_INDICATOR_BASE: &str = "https://api.worldbank.org/v2/en/indicator/";

/// Parse an indicator base URL, adding the trailing slash `Url::join` needs.
pub fn parse_base_url(base: &str) -> Result<Url> {
    let base = base.trim();
    let with_slash = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&with_slash).with_context(|| format!("invalid base URL `{}`", base))
}

/// Bulk-download URL for one World Bank indicator, e.g.
/// `https://api.worldbank.org/v2/en/indicator/NY.GDP.PCAP.CD?downloadformat=csv`.
pub fn indicator_zip_url(code: &str) -> Result<Url> {
    indicator_zip_url_in(&parse_base_url(WORLD_BANK_INDICATOR_BASE)?, code)
}

/// Same as [`indicator_zip_url`] against another host or mirror.
pub fn indicator_zip_url_in(base: &Url, code: &str) -> Result<Url> {
    let code = code.trim();
    if code.is_empty() || code.contains(&['/', '?', '#'][..]) {
        bail!("invalid indicator code `{}`", code);
    }
    let mut url = base
        .join(code)
        .with_context(|| format!("building URL for indicator {}", code))?;
    url.query_pairs_mut().append_pair("downloadformat", "csv");
    Ok(url)
}
