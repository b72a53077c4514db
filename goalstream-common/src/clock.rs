//! Game-clock string parsing
//!
//! The event source reports in-period times as `"MM:SS"` strings
//! (e.g. `timeInPeriod: "12:34"`, `timeRemaining: "07:26"`). The
//! importance scorer and tag generator both need those as seconds.

/// Parse a `"MM:SS"` game-clock string into total seconds.
///
/// Returns `None` for malformed input rather than guessing; callers
/// treat a missing clock as "no timing signal".
///
/// # Examples
///
/// ```
/// use goalstream_common::clock::parse_clock;
///
/// assert_eq!(parse_clock("12:34"), Some(754));
/// assert_eq!(parse_clock("00:30"), Some(30));
/// assert_eq!(parse_clock("0:05"), Some(5));
/// assert_eq!(parse_clock(""), None);
/// assert_eq!(parse_clock("12"), None);
/// assert_eq!(parse_clock("ab:cd"), None);
/// ```
pub fn parse_clock(clock: &str) -> Option<u32> {
    let (minutes, seconds) = clock.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: u32 = seconds.trim().parse().ok()?;
    Some(minutes * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_clock() {
        assert_eq!(parse_clock("20:00"), Some(1200));
        assert_eq!(parse_clock("01:30"), Some(90));
        assert_eq!(parse_clock("00:00"), Some(0));
    }

    #[test]
    fn rejects_malformed_clock() {
        assert_eq!(parse_clock("1234"), None);
        assert_eq!(parse_clock(":30"), None);
        assert_eq!(parse_clock("12:"), None);
        assert_eq!(parse_clock("twelve:ten"), None);
    }

    #[test]
    fn tolerates_padded_fields() {
        assert_eq!(parse_clock("12: 34"), Some(754));
    }
}
