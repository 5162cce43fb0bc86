//! Human-readable durations for config values like "6s", "24h" or "500ms".

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};

/// Units accepted by [`parse_duration`], longest suffix first so "ms" wins over "s".
const UNITS: &[(&str, u64)] = &[
    ("ms", 1),
    ("d", 24 * 60 * 60 * 1000),
    ("h", 60 * 60 * 1000),
    ("m", 60 * 1000),
    ("s", 1000),
];

/// Parse a duration string such as "6s", "1s", "24h", "30m", "7d" or "250ms".
///
/// The input is case-insensitive and surrounding whitespace is ignored.
///
/// ```
/// use simplifi::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("6s").unwrap(), Duration::from_secs(6));
/// assert_eq!(parse_duration("24h").unwrap(), Duration::from_secs(24 * 60 * 60));
/// assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let (num, millis_per_unit) = UNITS
        .iter()
        .find_map(|(suffix, millis)| s.strip_suffix(suffix).map(|num| (num, *millis)))
        .context("Duration must end with ms, s, m, h, or d")?;

    let num: u64 = num
        .trim()
        .parse()
        .with_context(|| format!("Invalid number in duration {s:?}"))?;
    let millis = num
        .checked_mul(millis_per_unit)
        .context("Duration is too large")?;

    Ok(Duration::from_millis(millis))
}

/// Format a duration using the largest unit that divides it exactly.
///
/// ```
/// use simplifi::duration::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(24 * 60 * 60)), "1d");
/// assert_eq!(format_duration(Duration::from_secs(6)), "6s");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
/// ```
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis() as u64;
    if millis == 0 {
        return "0s".to_string();
    }
    for (suffix, unit) in [("d", 86_400_000), ("h", 3_600_000), ("m", 60_000), ("s", 1000)] {
        if millis % unit == 0 {
            return format!("{}{}", millis / unit, suffix);
        }
    }
    format!("{millis}ms")
}

/// Serde helper for config fields written as duration strings.
pub fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_duration(&raw).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_every_unit() {
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(7 * 86_400));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("6s").unwrap(), Duration::from_secs(6));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_trims_and_ignores_case() {
        assert_eq!(parse_duration("  24H ").unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("abcs").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration(&format!("{}d", u64::MAX)).is_err());
    }

    #[test]
    fn test_format_round_trips_config_defaults() {
        for raw in ["6s", "1s", "24h", "500ms", "7d"] {
            let parsed = parse_duration(raw).unwrap();
            assert_eq!(parse_duration(&format_duration(parsed)).unwrap(), parsed, "{raw}");
        }
    }

    #[test]
    fn test_format_prefers_largest_exact_unit() {
        assert_eq!(format_duration(Duration::from_secs(24 * 60 * 60)), "1d");
        assert_eq!(format_duration(Duration::from_secs(90)), "90s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
