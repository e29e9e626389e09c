//! Timestamp formatting for subtitle files

use crate::error::{KaraokeError, Result};

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_units(seconds: f64, per_second: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * per_second).round() as u64
    } else {
        0
    }
}

/// Format seconds as an ASS timestamp `H:MM:SS.cc`
///
/// Rounded to the nearest centisecond; negative or non-finite input formats
/// as zero.
#[must_use]
pub fn format_ass_time(seconds: f64) -> String {
    let centiseconds = whole_units(seconds, 100.0);
    let hours = centiseconds / 360_000;
    let remainder = centiseconds % 360_000;
    let minutes = remainder / 6000;
    let remainder = remainder % 6000;
    let secs = remainder / 100;
    let cs = remainder % 100;

    format!("{hours}:{minutes:02}:{secs:02}.{cs:02}")
}

/// Format seconds as an SRT timestamp `HH:MM:SS,mmm`
#[must_use]
pub fn format_srt_time(seconds: f64) -> String {
    let millis = whole_units(seconds, 1000.0);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let secs = (millis % 60_000) / 1000;
    let ms = millis % 1000;

    format!("{hours:02}:{minutes:02}:{secs:02},{ms:03}")
}

/// Parse an SRT timestamp `HH:MM:SS,mmm` into seconds
///
/// A `.` is accepted in place of the `,`, and the fraction may have one to
/// three digits.
///
/// # Errors
///
/// Returns [`KaraokeError::InvalidFormat`] if the timestamp is malformed.
pub fn parse_srt_time(time: &str) -> Result<f64> {
    let invalid = || KaraokeError::InvalidFormat(format!("Invalid SRT time: {}", time.trim()));
    let trimmed = time.trim();

    let (clock, fraction) = trimmed
        .split_once(',')
        .or_else(|| trimmed.split_once('.'))
        .ok_or_else(invalid)?;

    let parts: Vec<&str> = clock.split(':').collect();
    if parts.len() != 3 || fraction.is_empty() || fraction.len() > 3 {
        return Err(invalid());
    }

    let hours: u32 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u32 = parts[1].parse().map_err(|_| invalid())?;
    let secs: u32 = parts[2].parse().map_err(|_| invalid())?;
    let fraction_value: u32 = fraction.parse().map_err(|_| invalid())?;
    if minutes >= 60 || secs >= 60 {
        return Err(invalid());
    }

    let scale = match fraction.len() {
        1 => 100,
        2 => 10,
        _ => 1,
    };
    let millis = fraction_value * scale;

    Ok(f64::from(hours) * 3600.0
        + f64::from(minutes) * 60.0
        + f64::from(secs)
        + f64::from(millis) / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ass_time_rounds_to_centiseconds() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(1.234), "0:00:01.23");
        assert_eq!(format_ass_time(1.235_1), "0:00:01.24");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
        assert_eq!(format_ass_time(-2.0), "0:00:00.00");
        assert_eq!(format_ass_time(f64::NAN), "0:00:00.00");
    }

    #[test]
    fn srt_time_uses_milliseconds() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(1.5), "00:00:01,500");
        assert_eq!(format_srt_time(3725.042), "01:02:05,042");
    }

    #[test]
    fn srt_time_parsing() {
        assert!((parse_srt_time("00:00:01,500").unwrap() - 1.5).abs() < 1e-9);
        assert!((parse_srt_time(" 01:02:05.042 ").unwrap() - 3725.042).abs() < 1e-9);
        assert!((parse_srt_time("00:00:02,5").unwrap() - 2.5).abs() < 1e-9);
        assert!(parse_srt_time("00:61:00,000").is_err());
        assert!(parse_srt_time("1:02").is_err());
        assert!(parse_srt_time("aa:bb:cc,ddd").is_err());
    }
}
