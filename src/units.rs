//! Human-readable rendering of byte counts and durations.
//!
//! These helpers back every user-facing message that mentions a ceiling or a
//! measured value, so the same formatting appears in captions, error texts
//! and the `/status` reply.

/// Formats a byte count as `B`/`KB`/`MB`/`GB` with up to two decimals.
///
/// Trailing zeros are trimmed (`1.50 MB` renders as `1.5 MB`).
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[unit])
}

/// Formats a duration in seconds as `m:ss`.
#[must_use]
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_small_values_stay_in_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_trims_trailing_zeros() {
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1 MB");
    }

    #[test]
    fn test_format_size_default_ceiling_renders_as_50_mb() {
        assert_eq!(format_size(50 * 1024 * 1024), "50 MB");
    }

    #[test]
    fn test_format_size_gb_range() {
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn test_format_duration_pads_seconds() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(65), "1:05");
        assert_eq!(format_duration(300), "5:00");
        assert_eq!(format_duration(3599), "59:59");
    }
}
