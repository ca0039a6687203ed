//! Clock-time parsing for attendance punches.
//!
//! Terminals and spreadsheet exports disagree on how a time of day is written:
//! `"17:00"`, `"17.00"` and the spreadsheet serial fraction `"0.7083333333"`
//! all mean five in the afternoon. Everything is reduced to minutes since
//! midnight.

pub const MINUTES_PER_DAY: u32 = 1440;

/// Minutes reported for a value that cannot be read as a time of day.
/// A garbled punch must not abort a whole report.
pub const UNPARSEABLE_MINUTES: u32 = 0;

/// Which encoding a raw time value was recognised as, with its minutes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParsedTime {
    /// Spreadsheet serial time, e.g. `"0.7083333333"`
    FractionalDay(u32),
    /// `"HH:MM"`, optionally followed by seconds
    Clock(u32),
    /// `"HH.MM"`, the dot used as a separator
    DotClock(u32),
    Unparseable,
}

impl ParsedTime {
    pub fn minutes(self) -> u32 {
        match self {
            ParsedTime::FractionalDay(m) | ParsedTime::Clock(m) | ParsedTime::DotClock(m) => m,
            ParsedTime::Unparseable => UNPARSEABLE_MINUTES,
        }
    }
}

pub fn parse_time(raw: &str) -> ParsedTime {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ParsedTime::Unparseable;
    }

    if let Some(minutes) = fractional_day(trimmed) {
        return ParsedTime::FractionalDay(minutes);
    }

    // A dot at index 1 or 2 is a separator ("8.15", "17.00"); anything else
    // starting with "0." was already handled as a fraction above.
    match trimmed.find('.') {
        Some(dot @ 1..=2) => {
            let normalized = format!("{}:{}", &trimmed[..dot], &trimmed[dot + 1..]);
            clock(&normalized).map_or(ParsedTime::Unparseable, ParsedTime::DotClock)
        }
        _ => clock(trimmed).map_or(ParsedTime::Unparseable, ParsedTime::Clock),
    }
}

/// Never fails: unreadable input yields [`UNPARSEABLE_MINUTES`].
pub fn parse_time_to_minutes(raw: &str) -> u32 {
    parse_time(raw).minutes()
}

/// Renders minutes since midnight as `HH:MM`.
pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn fractional_day(value: &str) -> Option<u32> {
    let rest = value.strip_prefix("0.")?;
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let fraction: f64 = value[..2 + digits].parse().ok()?;

    if fraction < 1.0 {
        Some((fraction * f64::from(MINUTES_PER_DAY)).round() as u32)
    } else {
        None
    }
}

fn clock(value: &str) -> Option<u32> {
    let mut parts = value.split(':');
    let hours = leading_number(parts.next()?)?;
    let minutes = leading_number(parts.next()?)?;
    hours.checked_mul(60)?.checked_add(minutes)
}

// Reads the run of digits at the start of `part`, ignoring leading
// whitespace and whatever follows the digits ("15abc" -> 15).
fn leading_number(part: &str) -> Option<u32> {
    let part = part.trim_start();
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let cases = [
            ("08:00", 480),
            ("17:00", 1020),
            ("17.00", 1020),
            ("0.7083333333", 1020),
            ("0.3409722222", 491),
            ("", 0),
            ("garbage", 0),
        ];

        for (input, expected) in cases {
            assert_eq!(
                parse_time_to_minutes(input),
                expected,
                "parsing {input:?}"
            );
        }
    }

    #[test]
    fn test_detects_encoding() {
        assert_eq!(parse_time("08:15"), ParsedTime::Clock(495));
        assert_eq!(parse_time("8.15"), ParsedTime::DotClock(495));
        assert_eq!(parse_time("17.30"), ParsedTime::DotClock(1050));
        assert_eq!(parse_time("0.5"), ParsedTime::FractionalDay(720));
        assert_eq!(parse_time("garbage"), ParsedTime::Unparseable);
        assert_eq!(parse_time("   "), ParsedTime::Unparseable);
    }

    #[test]
    fn test_fraction_takes_precedence_over_dot_separator() {
        // "0.30" is half past midnight as HH.MM, but a serial fraction wins
        assert_eq!(parse_time("0.30"), ParsedTime::FractionalDay(432));
        assert_eq!(parse_time("0.0"), ParsedTime::FractionalDay(0));
    }

    #[test]
    fn test_fraction_with_trailing_garbage_uses_numeric_prefix() {
        assert_eq!(parse_time("0.25xyz"), ParsedTime::FractionalDay(360));
        assert_eq!(parse_time("0.abc"), ParsedTime::FractionalDay(0));
    }

    #[test]
    fn test_single_digit_hour_with_dot() {
        assert_eq!(parse_time_to_minutes("1.5"), 65);
        assert_eq!(parse_time_to_minutes("9.05"), 545);
    }

    #[test]
    fn test_dot_beyond_index_two_is_not_a_separator() {
        assert_eq!(parse_time("123.45"), ParsedTime::Unparseable);
        assert_eq!(parse_time(".30"), ParsedTime::Unparseable);
    }

    #[test]
    fn test_only_first_dot_is_rewritten() {
        // "12:30.45" -> minutes part reads as 30
        assert_eq!(parse_time("12.30.45"), ParsedTime::DotClock(750));
    }

    #[test]
    fn test_seconds_and_suffixes_are_ignored() {
        assert_eq!(parse_time_to_minutes("08:15:59"), 495);
        assert_eq!(parse_time_to_minutes("08:5x"), 485);
        assert_eq!(parse_time_to_minutes(" 17:00 "), 1020);
    }

    #[test]
    fn test_missing_or_non_numeric_parts() {
        assert_eq!(parse_time_to_minutes("17"), 0);
        assert_eq!(parse_time_to_minutes(":30"), 0);
        assert_eq!(parse_time_to_minutes("ab:cd"), 0);
        assert_eq!(parse_time_to_minutes("08:"), 0);
        assert_eq!(parse_time_to_minutes("-1:00"), 0);
    }

    #[test]
    fn test_overflowing_hours_fall_back() {
        assert_eq!(parse_time("99999999999:00"), ParsedTime::Unparseable);
        assert_eq!(parse_time("71582789:00"), ParsedTime::Unparseable);
    }

    #[test]
    fn test_hours_past_midnight_are_not_wrapped() {
        assert_eq!(parse_time_to_minutes("25:00"), 1500);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(480), "08:00");
        assert_eq!(format_minutes(1020), "17:00");
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(545), "09:05");
    }
}
