//! Human-readable value formatting and delta classification.

use std::time::Duration;

const UNITS: [char; 7] = [' ', 'K', 'M', 'G', 'T', 'P', 'E'];

/// Formats a signed byte count with a binary unit, e.g. `1.000 MiB`.
///
/// Magnitudes below 1024 are printed verbatim with a `B` suffix.
pub fn human_bytes(bytes: i64) -> String {
    let abs = bytes.unsigned_abs();
    if abs < 1024 {
        return format!("{bytes} B");
    }

    let tier = ((u64::BITS - abs.leading_zeros()) / 10) as usize;
    let scaled = bytes as f64 / (1u64 << (tier * 10)) as f64;
    format!("{scaled:.3} {}iB", UNITS[tier])
}

/// Formats signed nanoseconds using [`Duration`]'s unit decomposition, e.g. `1.5s`, `-250ms`.
pub fn format_duration(nanos: i64) -> String {
    let duration = Duration::from_nanos(nanos.unsigned_abs());
    if nanos < 0 {
        format!("-{duration:?}")
    } else {
        format!("{duration:?}")
    }
}

/// Direction of change between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Positive,
    Negative,
    Neutral,
}

impl Trend {
    pub fn of(delta: i64) -> Self {
        match delta.signum() {
            1 => Trend::Positive,
            -1 => Trend::Negative,
            _ => Trend::Neutral,
        }
    }

    /// Inline style of a delta cell.
    pub fn style(self) -> &'static str {
        match self {
            Trend::Positive => "color: green;",
            Trend::Negative => "color: red;",
            Trend::Neutral => "color: gray;",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_small() {
        assert_eq!(human_bytes(0), "0 B");
        assert_eq!(human_bytes(1023), "1023 B");
        assert_eq!(human_bytes(-1023), "-1023 B");
    }

    #[test]
    fn test_human_bytes_tiers() {
        assert_eq!(human_bytes(1024), "1.000 KiB");
        assert_eq!(human_bytes(1536), "1.500 KiB");
        assert_eq!(human_bytes(1_048_576), "1.000 MiB");
        assert_eq!(human_bytes(-2048), "-2.000 KiB");
        assert_eq!(human_bytes(3 << 30), "3.000 GiB");
        assert_eq!(human_bytes(1 << 60), "1.000 EiB");
    }

    #[test]
    fn test_human_bytes_extremes() {
        assert_eq!(human_bytes(i64::MAX), "8.000 EiB");
        assert_eq!(human_bytes(i64::MIN), "-8.000 EiB");
    }

    #[test]
    fn test_human_bytes_magnitude_matches_tier() {
        for bytes in [1024i64, 5000, 1 << 20, 123_456_789, 1 << 40] {
            let formatted = human_bytes(bytes);
            let (number, unit) = formatted.split_once(' ').unwrap();
            let tier = UNITS.iter().position(|u| unit.starts_with(*u)).unwrap();
            let expected = bytes as f64 / (1u64 << (tier * 10)) as f64;
            let parsed: f64 = number.parse().unwrap();
            assert!((parsed - expected).abs() <= 0.001, "{formatted} vs {expected}");
            assert!((1.0..1024.0).contains(&parsed), "{formatted}");
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0ns");
        assert_eq!(format_duration(1_500_000_000), "1.5s");
        assert_eq!(format_duration(-250_000_000), "-250ms");
        assert_eq!(format_duration(1_000), "1µs");
    }

    #[test]
    fn test_trend() {
        assert_eq!(Trend::of(5), Trend::Positive);
        assert_eq!(Trend::of(-1), Trend::Negative);
        assert_eq!(Trend::of(0), Trend::Neutral);
        assert_eq!(Trend::of(i64::MIN), Trend::Negative);
        assert_eq!(Trend::Positive.style(), "color: green;");
        assert_eq!(Trend::Negative.style(), "color: red;");
        assert_eq!(Trend::Neutral.style(), "color: gray;");
    }
}
