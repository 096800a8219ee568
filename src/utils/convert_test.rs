use std::time::Duration;

use super::convert::parse_duration;
use super::convert::parse_size_in_bytes;
use crate::ConvertError;
use crate::Error;

#[test]
fn parse_duration_should_accept_unit_suffixes() {
    assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
    assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
    assert_eq!(parse_duration("3m").unwrap(), Duration::from_secs(180));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
    assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
    assert_eq!(parse_duration("25ns").unwrap(), Duration::from_nanos(25));
}

#[test]
fn parse_duration_should_accept_composite_and_fractional_values() {
    assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
    assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
    assert_eq!(parse_duration("1h2m3s").unwrap(), Duration::from_secs(3723));
}

#[test]
fn parse_duration_should_treat_bare_integers_as_nanoseconds() {
    assert_eq!(parse_duration("1000").unwrap(), Duration::from_micros(1));
    assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
}

#[test]
fn parse_duration_should_reject_malformed_input() {
    for input in ["", "   ", "abc", "10x", "s10", "-5s", "5ss"] {
        let err = parse_duration(input).unwrap_err();
        assert!(
            matches!(err, Error::Convert(ConvertError::InvalidDuration { .. })),
            "expected InvalidDuration for {input:?}, got {err:?}"
        );
    }
}

#[test]
fn parse_size_should_scale_by_1024() {
    assert_eq!(parse_size_in_bytes("512").unwrap(), 512);
    assert_eq!(parse_size_in_bytes("10b").unwrap(), 10);
    assert_eq!(parse_size_in_bytes("1k").unwrap(), 1024);
    assert_eq!(parse_size_in_bytes("1kb").unwrap(), 1024);
    assert_eq!(parse_size_in_bytes("2MB").unwrap(), 2 * 1024 * 1024);
    assert_eq!(parse_size_in_bytes("3g").unwrap(), 3 * 1024 * 1024 * 1024);
}

#[test]
fn parse_size_should_reject_malformed_input() {
    for input in ["", "kb", "b", "12q", "1.5k", "one"] {
        let err = parse_size_in_bytes(input).unwrap_err();
        assert!(
            matches!(err, Error::Convert(ConvertError::InvalidSize { .. })),
            "expected InvalidSize for {input:?}, got {err:?}"
        );
    }
}

#[test]
fn parse_size_should_reject_overflow() {
    let err = parse_size_in_bytes("999999999999999999g").unwrap_err();
    assert!(matches!(err, Error::Convert(ConvertError::InvalidSize { .. })));
}
