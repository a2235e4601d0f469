/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Drop a leading UTF-8 byte-order mark.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data)
}

/// Lenient float parse: blanks, junk and NaN all become `None`.
pub fn coerce_f64(raw: &str) -> Option<f64> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Lenient integer parse. Accepts `2020` and `2020.0`, rejects `2020.5`.
pub fn coerce_i32(raw: &str) -> Option<i32> {
    let cleaned = clean_str(raw);
    if let Ok(v) = cleaned.parse::<i32>() {
        return Some(v);
    }
    let v = coerce_f64(&cleaned)?;
    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}

/// Byte offset just past the `n`th newline, or `None` if `data` has fewer lines.
pub fn offset_after_lines(data: &[u8], n: usize) -> Option<usize> {
    if n == 0 {
        return Some(0);
    }
    data.iter()
        .enumerate()
        .filter(|(_, b)| **b == b'\n')
        .nth(n - 1)
        .map(|(i, _)| i + 1)
}
