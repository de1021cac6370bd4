//! SRT timecode formatting.

/// Format seconds as an SRT timecode: `HH:MM:SS,mmm`.
///
/// Hours, minutes and seconds are zero-padded to two digits, the fraction is
/// exactly three digits, and the decimal separator is a comma.
pub fn format_timecode(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let total_ms = (total_secs * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(0.0), "00:00:00,000");
        assert_eq!(format_timecode(1.5), "00:00:01,500");
        assert_eq!(format_timecode(61.042), "00:01:01,042");
        assert_eq!(format_timecode(3661.0), "01:01:01,000");
    }

    #[test]
    fn test_format_timecode_rounds_to_millisecond() {
        assert_eq!(format_timecode(0.0005), "00:00:00,001");
        assert_eq!(format_timecode(0.9999), "00:00:01,000");
    }

    #[test]
    fn test_format_timecode_clamps_negative() {
        assert_eq!(format_timecode(-1.0), "00:00:00,000");
    }
}
