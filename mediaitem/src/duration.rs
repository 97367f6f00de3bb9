//! Duration helpers for DIDL-Lite `res@duration` values.
//!
//! ContentDirectory servers write durations as `H+:MM:SS[.F+]` or
//! `H+:MM:SS[.F0/F1]`. Lax servers also send `MM:SS` or a bare second count,
//! so parsing accepts those shapes too. Fractions of a second are dropped.

use crate::error::{MediaItemError, Result};

/// Formats a number of seconds as `H:MM:SS`.
///
/// # Examples
/// ```
/// # use mediaitem::format_duration;
/// assert_eq!(format_duration(0), "0:00:00");
/// assert_eq!(format_duration(3661), "1:01:01");
/// ```
pub fn format_duration(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}

/// Parses a DIDL-Lite duration to whole seconds.
///
/// Accepted forms:
/// - `H+:MM:SS[.F+]` and `H+:MM:SS.F0/F1`, minutes and seconds below 60
/// - `MM:SS`
/// - `SS`
///
/// # Examples
/// ```
/// # use mediaitem::parse_duration;
/// assert_eq!(parse_duration("0:03:25.000").unwrap(), 205);
/// assert_eq!(parse_duration("01:02:03").unwrap(), 3723);
/// assert_eq!(parse_duration("02:03").unwrap(), 123);
/// assert!(parse_duration("0:61:00").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(MediaItemError::InvalidDuration(
            "empty duration string".to_string(),
        ));
    }

    // Fraction is either ".F+" or ".F0/F1"; both are dropped.
    let whole = match trimmed.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty()
                || !fraction.chars().all(|c| c.is_ascii_digit() || c == '/')
            {
                return Err(MediaItemError::InvalidDuration(format!(
                    "invalid fractional part in '{}'",
                    input
                )));
            }
            whole
        }
        None => trimmed,
    };

    let parts: Vec<&str> = whole.split(':').collect();
    if parts.len() > 3 {
        return Err(MediaItemError::InvalidDuration(format!(
            "'{}': expected H:MM:SS, MM:SS or SS",
            input
        )));
    }

    let mut values = Vec::with_capacity(parts.len());
    for part in &parts {
        let value = part.parse::<u32>().map_err(|_| {
            MediaItemError::InvalidDuration(format!(
                "invalid numeric value '{}' in '{}'",
                part, input
            ))
        })?;
        values.push(value);
    }

    if values.len() == 3 && (values[1] >= 60 || values[2] >= 60) {
        return Err(MediaItemError::InvalidDuration(format!(
            "minutes and seconds must be below 60 in '{}'",
            input
        )));
    }

    values
        .iter()
        .try_fold(0u32, |total, value| {
            total.checked_mul(60).and_then(|t| t.checked_add(*value))
        })
        .ok_or_else(|| MediaItemError::InvalidDuration(format!("'{}' overflows", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hms_with_fraction() {
        assert_eq!(parse_duration("0:04:12.500").unwrap(), 252);
        assert_eq!(parse_duration("1:00:00.1/3").unwrap(), 3600);
    }

    #[test]
    fn test_parse_long_hours() {
        assert_eq!(parse_duration("100:00:00").unwrap(), 360_000);
    }

    #[test]
    fn test_parse_short_forms() {
        assert_eq!(parse_duration("42").unwrap(), 42);
        assert_eq!(parse_duration("3:05").unwrap(), 185);
        assert_eq!(parse_duration(" 0:00:07 ").unwrap(), 7);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("1:2:3:4").is_err());
        assert!(parse_duration("0:00:75").is_err());
        assert!(parse_duration("0:01:00.").is_err());
        assert!(parse_duration("0:01:00.x").is_err());
    }

    #[test]
    fn test_format_then_parse() {
        for secs in [0, 59, 60, 3599, 3600, 86_399] {
            assert_eq!(parse_duration(&format_duration(secs)).unwrap(), secs);
        }
    }
}
