use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::io::{Cursor, Read};
use tracing::{debug, instrument};
use url::Url;
use zip::ZipArchive;

/// The data file inside a World Bank bulk download. The archive also carries
/// `Metadata_Country_*` and `Metadata_Indicator_*` files which never match.
pub static API_DATA_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^API_.*_DS2_en_csv_v2_.*\.csv$").unwrap());

/// Upper bound on the buffer reserved up front for one entry.
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Download the given ZIP URL into memory.
#[instrument(level = "debug", skip(client, url), fields(url = %url))]
pub async fn download_zip(client: &Client, url: &Url) -> Result<Vec<u8>> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    debug!(size_bytes = bytes.len(), "downloaded");
    Ok(bytes.to_vec())
}

/// Buffer size to reserve for an entry whose header declares `declared` bytes.
/// The declared size is not trusted beyond [`MAX_PREALLOC`].
fn prealloc_len(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

/// Return the name and contents of the first archive entry (in archive order)
/// whose name matches `pattern`.
pub fn extract_entry(zip_bytes: &[u8], pattern: &Regex) -> Result<(String, Vec<u8>)> {
    let mut archive =
        ZipArchive::new(Cursor::new(zip_bytes)).context("Failed to read ZIP archive")?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{}", i))?;
        let name = entry.name().to_string();
        if !entry.is_file() || !pattern.is_match(&name) {
            continue;
        }
        let mut buf = Vec::with_capacity(prealloc_len(entry.size()));
        entry
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read {} into memory", name))?;
        debug!(entry = %name, size_bytes = buf.len(), "extracted");
        return Ok((name, buf));
    }

    Err(anyhow!(
        "no entry matching `{}` in archive ({} entries)",
        pattern.as_str(),
        archive.len()
    ))
}

/// Build an in-memory ZIP from (name, contents) pairs.
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Result<Vec<u8>> {
    use std::io::Write;
    use zip::{write::FileOptions, CompressionMethod};

    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        for (name, data) in entries {
            let options: FileOptions<'_, ()> =
                FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file(*name, options)?;
            zip.write_all(data.as_bytes())?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_api_data_file() -> Result<()> {
        let zip = build_zip(&[
            (
                "Metadata_Indicator_API_IT.NET.USER.ZS_DS2_en_csv_v2_1234.csv",
                "meta",
            ),
            (
                "Metadata_Country_API_IT.NET.USER.ZS_DS2_en_csv_v2_1234.csv",
                "meta",
            ),
            ("API_IT.NET.USER.ZS_DS2_en_csv_v2_1234.csv", "data"),
        ])?;
        let (name, data) = extract_entry(&zip, &API_DATA_FILE)?;
        assert_eq!(name, "API_IT.NET.USER.ZS_DS2_en_csv_v2_1234.csv");
        assert_eq!(data, b"data");
        Ok(())
    }

    #[test]
    fn missing_data_file_is_an_error() -> Result<()> {
        let zip = build_zip(&[("README.txt", "hello")])?;
        let err = extract_entry(&zip, &API_DATA_FILE).unwrap_err();
        assert!(err.to_string().contains("no entry matching"));
        Ok(())
    }

    #[test]
    fn declared_size_is_capped() {
        assert_eq!(prealloc_len(4), 4);
        assert_eq!(prealloc_len(u64::MAX), MAX_PREALLOC as usize);
    }

    #[test]
    fn inflated_size_header_does_not_abort() -> Result<()> {
        let mut zip = build_zip(&[("API_X_DS2_en_csv_v2_1.csv", "data")])?;
        // uncompressed size field of the central directory header
        let cd = zip
            .windows(4)
            .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
            .ok_or_else(|| anyhow!("no central directory"))?;
        zip[cd + 24..cd + 28].copy_from_slice(&0xFFFF_FF00u32.to_le_bytes());
        if let Ok((_, data)) = extract_entry(&zip, &API_DATA_FILE) {
            assert_eq!(data, b"data");
        }
        Ok(())
    }

    #[test]
    fn garbage_is_not_a_zip() {
        assert!(extract_entry(b"<html>rate limited</html>", &API_DATA_FILE).is_err());
    }
}
