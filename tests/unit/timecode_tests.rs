/*!
 * Tests for SRT timestamp formatting and parsing
 */

use regex::Regex;
use text2video::captions::timecode::{format_millis, format_timestamp, parse_timestamp, parse_timestamp_millis, seconds_to_millis};

/// Test that formatting produces HH:MM:SS,mmm with zero padding
#[test]
fn test_format_timestamp_withVariousInputs_shouldFormatCorrectly() {
    assert_eq!(format_timestamp(0.0), "00:00:00,000");
    assert_eq!(format_timestamp(1.5), "00:00:01,500");
    assert_eq!(format_timestamp(61.25), "00:01:01,250");
    assert_eq!(format_timestamp(3723.004), "01:02:03,004");
    assert_eq!(format_timestamp(10.0), "00:00:10,000");
}

/// Test that sub-millisecond parts are truncated, never rounded up
#[test]
fn test_format_timestamp_withSubMillisecond_shouldTruncate() {
    assert_eq!(format_timestamp(1.9999), "00:00:01,999");
    assert_eq!(format_timestamp(59.9999), "00:00:59,999");
    assert_eq!(format_timestamp(4.6153846), "00:00:04,615");
}

/// Test that negative input clamps to zero
#[test]
fn test_format_timestamp_withNegativeInput_shouldClampToZero() {
    assert_eq!(format_timestamp(-3.2), "00:00:00,000");
    assert_eq!(seconds_to_millis(-0.001), 0);
}

/// Test that hours beyond two digits still render
#[test]
fn test_format_millis_withLargeValue_shouldKeepAllHourDigits() {
    assert_eq!(format_millis(100 * 3_600_000 + 1), "100:00:00,001");
}

/// Test the output shape and parse-back property over a range of values
#[test]
fn test_format_timestamp_withRange_shouldMatchPatternAndParseBack() {
    let pattern = Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3}$").unwrap();

    let mut seconds = 0.0;
    while seconds < 360_000.0 {
        let formatted = format_timestamp(seconds);
        assert!(pattern.is_match(&formatted), "{} -> {}", seconds, formatted);

        let parsed_ms = parse_timestamp_millis(&formatted).unwrap();
        assert_eq!(parsed_ms, seconds_to_millis(seconds), "round trip of {}", seconds);

        seconds = seconds * 1.7 + 0.0137;
    }
}

/// Test that parsing accepts both comma and dot separators
#[test]
fn test_parse_timestamp_withDotSeparator_shouldParse() {
    assert_eq!(parse_timestamp_millis("00:01:02,345").unwrap(), 62_345);
    assert_eq!(parse_timestamp_millis("00:01:02.345").unwrap(), 62_345);
    assert!((parse_timestamp("00:00:10,000").unwrap() - 10.0).abs() < f64::EPSILON);
}

/// Test that malformed timestamps are rejected
#[test]
fn test_parse_timestamp_withInvalidInput_shouldFail() {
    assert!(parse_timestamp_millis("").is_err());
    assert!(parse_timestamp_millis("00:00:10").is_err());
    assert!(parse_timestamp_millis("00:61:00,000").is_err());
    assert!(parse_timestamp_millis("00:00:60,000").is_err());
    assert!(parse_timestamp_millis("00:00:01,1000").is_err());
    assert!(parse_timestamp_millis("aa:bb:cc,ddd").is_err());
}
