use chrono::{DateTime, Utc};

/// Human-readable byte size, base 1024.
/// Examples: "0 B", "512 B", "2.00 KB", "1.50 MB"
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 B".to_string();
    }
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

/// Creation date from a microsecond timestamp, e.g. "Nov 14, 2023".
pub fn format_date(micros: Option<i64>) -> String {
    micros
        .filter(|m| *m != 0)
        .and_then(|m| DateTime::<Utc>::from_timestamp_micros(m))
        .map(|dt| dt.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "Unknown date".to_string())
}

/// Expiration shown in the upload form, e.g. "Nov 21, 2023 14:05 UTC".
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y %H:%M UTC").to_string()
}

/// `first8...last6`; short hashes are returned as-is.
pub fn short_hash(hash: &str) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= 14 {
        return hash.to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 6..].iter().collect();
    format!("{head}...{tail}")
}

/// Truncate to `max` characters with a trailing ellipsis.
pub fn ellipsize(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    let kept: String = s.chars().take(max - 1).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(1536 * 1024), "1.50 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn dates() {
        assert_eq!(format_date(None), "Unknown date");
        assert_eq!(format_date(Some(0)), "Unknown date");
        assert_eq!(format_date(Some(1_700_000_000_000_000)), "Nov 14, 2023");
    }

    #[test]
    fn hashes() {
        assert_eq!(
            short_hash("0x1234567890abcdef1234567890abcdef"),
            "0x123456...abcdef"
        );
        assert_eq!(short_hash("0xabc"), "0xabc");
    }

    #[test]
    fn truncation() {
        assert_eq!(ellipsize("abc", 5), "abc");
        assert_eq!(ellipsize("abcdefgh", 5), "abcd…");
    }
}
