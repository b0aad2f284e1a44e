//! HTTP-date rendering.
//!
//! Converts text, epoch seconds or structured date/time values into the
//! IMF-fixdate form used by `Date`, `Expires` and `Last-Modified` headers:
//! `Sun, 06 Nov 1994 08:49:37 GMT`.

use crate::error::HelperError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// strftime pattern of the IMF-fixdate grammar
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Naive layouts accepted for textual input, read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%A, %d-%b-%y %H:%M:%S GMT", // RFC 850
    "%a %b %e %H:%M:%S %Y",      // asctime
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// An instant handed to [`format_date`].
#[derive(Debug, Clone, PartialEq)]
pub enum Timestamp {
    /// Textual date, parsed on conversion
    Text(String),
    /// Seconds since the Unix epoch
    Seconds(i64),
    /// Already structured, normalized to UTC
    DateTime(DateTime<Utc>),
    /// Wall-clock time from the standard library
    System(SystemTime),
}

impl Timestamp {
    /// Normalize the value into a UTC date/time
    pub fn to_utc(&self) -> Result<DateTime<Utc>, HelperError> {
        match self {
            Timestamp::Text(text) => parse_text(text),
            Timestamp::Seconds(secs) => from_epoch_seconds(*secs),
            Timestamp::DateTime(dt) => Ok(*dt),
            Timestamp::System(time) => from_system_time(*time),
        }
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Timestamp::Text(value)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::Seconds(value)
    }
}

impl From<i32> for Timestamp {
    fn from(value: i32) -> Self {
        Timestamp::Seconds(i64::from(value))
    }
}

impl From<u32> for Timestamp {
    fn from(value: u32) -> Self {
        Timestamp::Seconds(i64::from(value))
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Timestamp::DateTime(value.and_utc())
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        Timestamp::System(value)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(value: DateTime<Tz>) -> Self {
        Timestamp::DateTime(value.with_timezone(&Utc))
    }
}

/// Format a timestamp as an HTTP date in GMT
///
/// Zoned inputs are converted to GMT first, so the same instant always
/// renders identically. Fails with [`HelperError::InvalidTimestamp`] when the
/// input cannot be understood or its year does not fit in four digits.
///
/// ```
/// use http_helpers::format_date;
///
/// assert_eq!(format_date(784111777).unwrap(), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
pub fn format_date(time: impl Into<Timestamp>) -> Result<String, HelperError> {
    let time = time.into();
    let utc = time.to_utc()?;

    if !(0..=9999).contains(&utc.year()) {
        return Err(HelperError::invalid_timestamp(format!(
            "year {} is outside the HTTP-date range",
            utc.year()
        )));
    }

    Ok(utc.format(HTTP_DATE_FORMAT).to_string())
}

fn parse_text(text: &str) -> Result<DateTime<Utc>, HelperError> {
    let trimmed = text.trim();

    if let Ok(secs) = trimmed.parse::<i64>() {
        return from_epoch_seconds(secs);
    }

    if let Some(result) = parse_fractional_seconds(trimmed) {
        return result;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Also covers IMF-fixdate, since GMT is a valid RFC 2822 zone
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| HelperError::invalid_timestamp(text))
}

/// `[-]SECS.FRACTION` epoch seconds; `None` when the text has another shape
fn parse_fractional_seconds(text: &str) -> Option<Result<DateTime<Utc>, HelperError>> {
    let (whole, fraction) = text.split_once('.')?;
    let digits = whole.strip_prefix(['-', '+']).unwrap_or(whole);
    let well_formed = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (digits.is_empty() && fraction.is_empty()) || !well_formed(digits) || !well_formed(fraction)
    {
        return None;
    }

    let invalid = || HelperError::invalid_timestamp(text);
    let secs = match digits {
        "" => 0,
        digits => match digits.parse::<i64>() {
            Ok(secs) => secs,
            Err(_) => return Some(Err(invalid())),
        },
    };
    // Digits past nanosecond precision are dropped
    let nanos = fraction
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(9)
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'));

    let result = if whole.starts_with('-') {
        DateTime::from_timestamp(-secs, 0).and_then(|start| {
            start.checked_sub_signed(chrono::Duration::nanoseconds(i64::from(nanos)))
        })
    } else {
        DateTime::from_timestamp(secs, nanos)
    };

    Some(result.ok_or_else(invalid))
}

fn from_epoch_seconds(secs: i64) -> Result<DateTime<Utc>, HelperError> {
    DateTime::from_timestamp(secs, 0).ok_or_else(|| HelperError::invalid_timestamp(secs))
}

fn from_system_time(time: SystemTime) -> Result<DateTime<Utc>, HelperError> {
    let invalid = || HelperError::invalid_timestamp(format!("{time:?}"));

    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => {
            let secs = i64::try_from(after.as_secs()).map_err(|_| invalid())?;
            DateTime::from_timestamp(secs, after.subsec_nanos()).ok_or_else(invalid)
        }
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).map_err(|_| invalid())?;
            let start = DateTime::from_timestamp(-secs, 0).ok_or_else(invalid)?;
            start
                .checked_sub_signed(chrono::Duration::nanoseconds(i64::from(
                    before.subsec_nanos(),
                )))
                .ok_or_else(invalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Local};
    use regex::Regex;
    use std::time::Duration;

    const EXPECTED: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

    #[test]
    fn test_formats_epoch_seconds() {
        assert_eq!(format_date(784111777).unwrap(), EXPECTED);
        assert_eq!(format_date(0).unwrap(), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_formats_numeric_text_as_epoch_seconds() {
        assert_eq!(format_date("784111777").unwrap(), EXPECTED);
        assert_eq!(format_date(" 784111777 ").unwrap(), EXPECTED);
    }

    #[test]
    fn test_formats_fractional_epoch_seconds() {
        assert_eq!(format_date("784111777.5").unwrap(), EXPECTED);
        assert_eq!(format_date("784111777.").unwrap(), EXPECTED);
        assert_eq!(format_date("784111777.999999999999").unwrap(), EXPECTED);
        assert_eq!(format_date(".25").unwrap(), "Thu, 01 Jan 1970 00:00:00 GMT");
        assert_eq!(format_date("-0.5").unwrap(), "Wed, 31 Dec 1969 23:59:59 GMT");
        assert_eq!(format_date("-1.5").unwrap(), "Wed, 31 Dec 1969 23:59:58 GMT");

        assert!(format_date(".").is_err());
        assert!(format_date("1.2.3").is_err());
        assert!(format_date("12a.5").is_err());
        assert!(format_date("99999999999999999999.5").is_err());
    }

    #[test]
    fn test_parses_common_text_layouts() {
        assert_eq!(format_date("1994-11-06T08:49:37Z").unwrap(), EXPECTED);
        assert_eq!(format_date("1994-11-06T10:49:37+02:00").unwrap(), EXPECTED);
        assert_eq!(format_date(EXPECTED).unwrap(), EXPECTED);
        assert_eq!(format_date("1994-11-06 08:49:37").unwrap(), EXPECTED);
        assert_eq!(
            format_date("1994-11-06").unwrap(),
            "Sun, 06 Nov 1994 00:00:00 GMT"
        );
    }

    #[test]
    fn test_same_instant_in_different_zones_is_identical() {
        let utc = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(1994, 11, 6, 17, 49, 37)
            .unwrap();
        let new_york = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(1994, 11, 6, 3, 49, 37)
            .unwrap();

        assert_eq!(format_date(utc).unwrap(), EXPECTED);
        assert_eq!(format_date(tokyo).unwrap(), EXPECTED);
        assert_eq!(format_date(new_york).unwrap(), EXPECTED);
        assert_eq!(format_date(utc.with_timezone(&Local)).unwrap(), EXPECTED);
    }

    #[test]
    fn test_formats_system_time() {
        let time = UNIX_EPOCH + Duration::from_secs(784111777);
        assert_eq!(format_date(time).unwrap(), EXPECTED);

        let before = UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(format_date(before).unwrap(), "Wed, 31 Dec 1969 23:59:59 GMT");
    }

    #[test]
    fn test_output_matches_http_date_grammar() {
        let grammar =
            Regex::new(r"^[A-Z][a-z]{2}, \d{2} [A-Z][a-z]{2} \d{4} \d{2}:\d{2}:\d{2} GMT$")
                .unwrap();

        for secs in [0i64, 1, 951782400, 1_700_000_000, 4_102_444_799, -86_400] {
            let formatted = format_date(secs).unwrap();
            assert!(grammar.is_match(&formatted), "bad date: {formatted}");
            assert!(formatted.ends_with(" GMT"));
        }

        let now = format_date(SystemTime::now()).unwrap();
        assert!(grammar.is_match(&now), "bad date: {now}");
    }

    #[test]
    fn test_rejects_unparseable_input() {
        assert_eq!(
            format_date("not a date"),
            Err(HelperError::InvalidTimestamp("not a date".to_string()))
        );
        assert!(format_date("").is_err());
        assert!(format_date("1994-13-45").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            format_date(i64::MAX),
            Err(HelperError::InvalidTimestamp(_))
        ));

        let far_future = Utc.with_ymd_and_hms(10000, 1, 1, 0, 0, 0).unwrap();
        assert!(format_date(far_future).is_err());
    }
}
