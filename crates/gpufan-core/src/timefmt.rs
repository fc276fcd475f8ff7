//! Human-readable elapsed-time formatting

const SECOND_MS: u64 = 1000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;

/// Format a millisecond count as `H:MM:SS.mmm`. Hours are unpadded.
pub fn format_elapsed_ms(ms: u64) -> String {
    let hours = ms / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;
    let seconds = (ms % MINUTE_MS) / SECOND_MS;
    let millis = ms % SECOND_MS;
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(format_elapsed_ms(0), "0:00:00.000");
    }

    #[test]
    fn test_hour_minute_second_milli() {
        assert_eq!(format_elapsed_ms(3_661_023), "1:01:01.023");
    }

    #[test]
    fn test_just_under_a_minute() {
        assert_eq!(format_elapsed_ms(59_999), "0:00:59.999");
    }

    #[test]
    fn test_hours_are_unpadded() {
        assert_eq!(format_elapsed_ms(100 * HOUR_MS), "100:00:00.000");
    }
}
