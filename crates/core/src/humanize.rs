const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];

/// Formats a byte count with base-1024 units and two decimals. Anything that is not a positive
/// finite number renders as `0 B`; values past the last unit stay in TB.
pub fn humanize(bytes: f64) -> String {
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let mut size = bytes;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

pub fn humanize_bytes(bytes: u64) -> String {
    humanize(bytes as f64)
}
