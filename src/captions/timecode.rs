use anyhow::{anyhow, Context, Result};

// @module: SRT timestamp formatting and parsing

// Absorbs binary representation error, e.g. 1.001 * 1000 = 1000.9999999999999
const TRUNCATION_TOLERANCE_MS: f64 = 1e-6;

/// Convert seconds to whole milliseconds, truncating any sub-millisecond part.
///
/// Negative, NaN and infinite values clamp to zero.
pub fn seconds_to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0 + TRUNCATION_TOLERANCE_MS).floor() as u64
}

/// Format a seconds offset as an SRT timestamp (HH:MM:SS,mmm).
///
/// Milliseconds are truncated, never rounded: `1.9999` renders as `00:00:01,999`.
pub fn format_timestamp(seconds: f64) -> String {
    format_millis(seconds_to_millis(seconds))
}

/// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
pub fn format_millis(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse an SRT timestamp to milliseconds
pub fn parse_timestamp_millis(timestamp: &str) -> Result<u64> {
    // Parse HH:MM:SS,mmm format
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

/// Parse an SRT timestamp back to seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
    parse_timestamp_millis(timestamp).map(|ms| ms as f64 / 1000.0)
}
