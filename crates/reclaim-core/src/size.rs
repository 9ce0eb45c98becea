//! Human-readable byte counts.
//!
//! Sizes are `u64` bytes everywhere; floating point only appears at the
//! formatting and parsing boundary. Units are binary multiples labelled with
//! the short forms users expect from a disk tool (KB = 1024 bytes).

use serde::{Deserialize, Serialize};

use crate::error::ParseSizeError;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// One kibibyte.
pub const KB: u64 = 1024;
/// One mebibyte.
pub const MB: u64 = KB * 1024;
/// One gibibyte.
pub const GB: u64 = MB * 1024;

/// Format a byte count, e.g. `1536 -> "1.50 KB"`.
///
/// Plain bytes are printed as integers; every larger unit gets two decimals.
pub fn format_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes / scale >= KB {
        scale *= KB;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{:.2} {}", bytes as f64 / scale as f64, UNITS[unit])
    }
}

/// Parse a size such as `"1 MB"`, `"1.5GB"`, `"100mb"` or `"4096"`.
///
/// Units are case-insensitive, whitespace between number and unit is
/// optional and single-letter units (`K`, `M`, ...) are accepted. A bare
/// number is a byte count. Fractional bytes are truncated.
pub fn parse_size(input: &str) -> Result<u64, ParseSizeError> {
    let text = input.trim().to_uppercase();
    if text.is_empty() {
        return Err(ParseSizeError::Empty);
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let unit = unit.trim_start();

    if number.is_empty() {
        return Err(ParseSizeError::InvalidFormat(input.trim().to_string()));
    }
    let value: f64 = number
        .parse()
        .map_err(|_| ParseSizeError::InvalidFormat(input.trim().to_string()))?;

    let multiplier = match unit {
        "" | "B" => 1,
        "K" | "KB" => KB,
        "M" | "MB" => MB,
        "G" | "GB" => GB,
        "T" | "TB" => GB * KB,
        "P" | "PB" => GB * MB,
        other => return Err(ParseSizeError::UnknownUnit(other.to_string())),
    };

    Ok((value * multiplier as f64) as u64)
}

/// Count of files per size range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub under_1kb: u64,
    pub kb_to_1mb: u64,
    pub mb_to_10mb: u64,
    pub mb10_to_100mb: u64,
    pub mb100_to_1gb: u64,
    pub over_1gb: u64,
}

impl SizeDistribution {
    /// Bucket a list of sizes.
    pub fn from_sizes(sizes: impl IntoIterator<Item = u64>) -> Self {
        let mut dist = Self::default();
        for size in sizes {
            dist.record(size);
        }
        dist
    }

    /// Count one more file.
    pub fn record(&mut self, size: u64) {
        match size {
            s if s < KB => self.under_1kb += 1,
            s if s < MB => self.kb_to_1mb += 1,
            s if s < 10 * MB => self.mb_to_10mb += 1,
            s if s < 100 * MB => self.mb10_to_100mb += 1,
            s if s < GB => self.mb100_to_1gb += 1,
            _ => self.over_1gb += 1,
        }
    }

    /// Labelled counts in ascending size order.
    pub fn ranges(&self) -> [(&'static str, u64); 6] {
        [
            ("< 1 KB", self.under_1kb),
            ("1 KB - 1 MB", self.kb_to_1mb),
            ("1 MB - 10 MB", self.mb_to_10mb),
            ("10 MB - 100 MB", self.mb10_to_100mb),
            ("100 MB - 1 GB", self.mb100_to_1gb),
            ("> 1 GB", self.over_1gb),
        ]
    }

    /// Total number of files counted.
    pub fn total(&self) -> u64 {
        self.ranges().iter().map(|(_, n)| n).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(MB), "1.00 MB");
        assert_eq!(format_size(GB), "1.00 GB");
        assert_eq!(format_size(GB * KB), "1.00 TB");
        assert_eq!(format_size(GB * MB), "1.00 PB");
    }

    #[test]
    fn test_format_size_caps_at_petabytes() {
        assert_eq!(format_size(GB * MB * KB), "1024.00 PB");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1 MB"), Ok(1_048_576));
        assert_eq!(parse_size("1.5gb"), Ok(1_610_612_736));
        assert_eq!(parse_size("100MB"), Ok(100 * MB));
        assert_eq!(parse_size("  2 k "), Ok(2048));
        assert_eq!(parse_size("512 B"), Ok(512));
        assert_eq!(parse_size("4096"), Ok(4096));
    }

    #[test]
    fn test_parse_size_errors() {
        assert_eq!(parse_size(""), Err(ParseSizeError::Empty));
        assert_eq!(parse_size("   "), Err(ParseSizeError::Empty));
        assert!(matches!(parse_size("MB"), Err(ParseSizeError::InvalidFormat(_))));
        assert!(matches!(parse_size("1.2.3 MB"), Err(ParseSizeError::InvalidFormat(_))));
        assert_eq!(
            parse_size("10 XB"),
            Err(ParseSizeError::UnknownUnit("XB".to_string()))
        );
        assert!(matches!(parse_size("-5 MB"), Err(ParseSizeError::InvalidFormat(_))));
    }

    #[test]
    fn test_format_parse_roundtrip_within_rounding() {
        for bytes in [0, 1, 999, 1536, 10 * MB + 12345, 3 * GB + 7, 5 * GB * KB] {
            let parsed = parse_size(&format_size(bytes)).unwrap();
            let tolerance = (bytes / 200).max(1);
            assert!(
                parsed.abs_diff(bytes) <= tolerance,
                "{bytes} -> {} -> {parsed}",
                format_size(bytes)
            );
        }
    }

    #[test]
    fn test_size_distribution() {
        let dist = SizeDistribution::from_sizes([10, 2048, 5 * MB, 50 * MB, 500 * MB, 2 * GB, 0]);
        assert_eq!(dist.under_1kb, 2);
        assert_eq!(dist.kb_to_1mb, 1);
        assert_eq!(dist.mb_to_10mb, 1);
        assert_eq!(dist.mb10_to_100mb, 1);
        assert_eq!(dist.mb100_to_1gb, 1);
        assert_eq!(dist.over_1gb, 1);
        assert_eq!(dist.total(), 7);
    }
}
