//! Timecode parsing and formatting utilities.
//!
//! The engine works in milliseconds on the music timeline. Edit decision
//! lists are easier to read as timecodes, so this module converts between
//! the two, supporting `HH:MM:SS.mmm`, `HH:MM:SS`, `MM:SS(.mmm)` and `SS(.mmm)`.

use thiserror::Error;

/// Maximum timeline length accepted when parsing (24 hours in milliseconds).
pub const MAX_TIMELINE_MS: f64 = 86_400_000.0;

/// Parse a timecode string to milliseconds.
///
/// # Examples
/// ```
/// use beatcut_models::timecode::parse_timecode;
/// assert_eq!(parse_timecode("00:01:30.250").unwrap(), 90_250.0);
/// assert_eq!(parse_timecode("05:30").unwrap(), 330_000.0);
/// assert_eq!(parse_timecode("12.5").unwrap(), 12_500.0);
/// ```
pub fn parse_timecode(tc: &str) -> Result<f64, TimecodeError> {
    let tc = tc.trim();
    if tc.is_empty() {
        return Err(TimecodeError::Empty);
    }

    let parts: Vec<&str> = tc.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => (0.0, 0.0, parse_component("seconds", s)?),
        [m, s] => (0.0, parse_component("minutes", m)?, parse_component("seconds", s)?),
        [h, m, s] => (
            parse_component("hours", h)?,
            parse_component("minutes", m)?,
            parse_component("seconds", s)?,
        ),
        _ => return Err(TimecodeError::InvalidFormat(tc.to_string())),
    };

    let total_ms = ((hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0).round();
    if total_ms > MAX_TIMELINE_MS {
        return Err(TimecodeError::ExceedsMaximum(MAX_TIMELINE_MS));
    }
    Ok(total_ms)
}

fn parse_component(name: &'static str, raw: &str) -> Result<f64, TimecodeError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| TimecodeError::InvalidValue(name, raw.to_string()))?;
    if value < 0.0 {
        return Err(TimecodeError::Negative);
    }
    Ok(value)
}

/// Format milliseconds as `HH:MM:SS.mmm`.
///
/// Negative inputs are clamped to zero; fractional milliseconds are rounded.
pub fn format_ms(ms: f64) -> String {
    let total_ms = ms.max(0.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Snap a millisecond time to the nearest frame boundary at `fps`.
pub fn snap_to_frame(ms: f64, fps: f64) -> f64 {
    if fps <= 0.0 || !fps.is_finite() {
        return ms;
    }
    let frame_ms = 1000.0 / fps;
    (ms / frame_ms).round() * frame_ms
}

/// Timecode parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimecodeError {
    #[error("Timecode cannot be empty")]
    Empty,

    #[error("Timecode cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timecode format '{0}'. Use HH:MM:SS.mmm, MM:SS or SS")]
    InvalidFormat(String),

    #[error("Timecode exceeds maximum timeline length ({0} ms)")]
    ExceedsMaximum(f64),
}
