//! Value conversion helpers for the typed lookup API.
//!
//! Leaf values are opaque strings; the duration and byte-size getters parse
//! them here. The grammars follow the store-side conventions the documents
//! were written with: unit-suffixed durations (`"150ms"`, `"1m30s"`) with
//! bare integers counted as nanoseconds, and 1024-based sizes with optional
//! `k`/`m`/`g` suffixes (`"1kb"`, `"512"`, `"2m"`).

use std::time::Duration;

use crate::ConvertError;
use crate::Error;
use crate::Result;

/// Parse a duration string.
///
/// Accepts a sequence of `<number><unit>` groups where unit is one of
/// `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`; fractional numbers are allowed
/// (`"1.5s"`). A bare integer is taken as nanoseconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let s = value.trim();
    if s.is_empty() {
        return Err(invalid_duration(value));
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        let nanos: u64 = s.parse().map_err(|_| invalid_duration(value))?;
        return Ok(Duration::from_nanos(nanos));
    }

    let mut total_secs = 0.0_f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| invalid_duration(value))?;
        if number_end == 0 {
            return Err(invalid_duration(value));
        }
        let (number, tail) = rest.split_at(number_end);
        let number: f64 = number.parse().map_err(|_| invalid_duration(value))?;

        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let unit_secs = match unit {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(invalid_duration(value)),
        };

        total_secs += number * unit_secs;
        rest = next;
    }

    Ok(Duration::from_secs_f64(total_secs))
}

/// Parse a byte-size string.
///
/// Multipliers are 1024-based; suffixes are case-insensitive with an
/// optional trailing `b` (`"1k"`, `"1kb"`, `"2MB"`, `"512"`). Malformed
/// input is an error, never silently zero.
pub fn parse_size_in_bytes(value: &str) -> Result<u64> {
    let trimmed = value.trim().to_ascii_lowercase();
    let without_b = trimmed.strip_suffix('b').unwrap_or(trimmed.as_str());

    let (digits, multiplier): (&str, u64) = match without_b.chars().last() {
        Some('k') => (&without_b[..without_b.len() - 1], 1024),
        Some('m') => (&without_b[..without_b.len() - 1], 1024 * 1024),
        Some('g') => (&without_b[..without_b.len() - 1], 1024 * 1024 * 1024),
        _ => (without_b, 1),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_size(value));
    }
    let count: u64 = digits.parse().map_err(|_| invalid_size(value))?;
    count.checked_mul(multiplier).ok_or_else(|| invalid_size(value))
}

fn invalid_duration(value: &str) -> Error {
    ConvertError::InvalidDuration {
        value: value.to_string(),
    }
    .into()
}

fn invalid_size(value: &str) -> Error {
    ConvertError::InvalidSize {
        value: value.to_string(),
    }
    .into()
}
