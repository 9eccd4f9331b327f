use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Named zones seen in feed dates, with their UTC offsets.
const ZONES: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("BST", "+0100"),
    ("MSK", "+0300"),
    ("JST", "+0900"),
    ("AEST", "+1000"),
];

/// Formats carrying an explicit numeric offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%a %b %d %H:%M:%S %z %Y",
    "%A, %d-%b-%y %H:%M:%S %z",
];

/// Formats without an offset, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
];

/// Date-only formats, read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %b %Y", "%a, %d %b %Y", "%d.%m.%Y"];

/// Parses a feed timestamp.
///
/// Accepts RFC 3339, RFC 2822 (including named zones such as `GMT`, `EST`
/// or `CEST`), ISO 8601 without an offset (UTC assumed), date-only forms
/// and bare Unix timestamps. Returns `None` for anything else.
///
/// # Examples
///
/// ```
/// use feednorm::feed::parse_date;
///
/// let a = parse_date("Tue, 10 Jun 2003 04:00:00 GMT").unwrap();
/// let b = parse_date("2003-06-10T06:00:00+02:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_date("next tuesday").is_none());
/// ```
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Named zones go first: the RFC 2822 parser reads unknown ones as UTC
    with_named_zone(value)
        .and_then(|v| parse_with_offset(&v))
        .or_else(|| parse_with_offset(value))
        .or_else(|| parse_naive(value.strip_suffix('Z').unwrap_or(value)))
        .or_else(|| parse_timestamp(value))
}

fn parse_with_offset(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Replaces a trailing named zone with its numeric offset.
fn with_named_zone(value: &str) -> Option<String> {
    let (rest, zone) = value.rsplit_once(' ')?;
    let offset = ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(zone))
        .map(|(_, offset)| *offset)?;
    Some(format!("{} {}", rest.trim_end(), offset))
}

fn parse_naive(value: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    // Shorter digit runs are more likely years or counters than epochs
    if value.len() < 9 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    DateTime::from_timestamp(value.parse().ok()?, 0)
}

/// Returns the latest of `dates`, if any.
pub fn most_recent(dates: impl IntoIterator<Item = DateTime<Utc>>) -> Option<DateTime<Utc>> {
    dates.into_iter().max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_date("2003-12-13T18:30:02Z"),
            Some(utc(2003, 12, 13, 18, 30, 2))
        );
        assert_eq!(
            parse_date("2003-12-13T18:30:02.25+01:00"),
            Some(utc(2003, 12, 13, 17, 30, 2) + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            parse_date("Sat, 07 Sep 2002 09:42:31 GMT"),
            Some(utc(2002, 9, 7, 9, 42, 31))
        );
        assert_eq!(
            parse_date("Sat, 07 Sep 2002 09:42:31 -0500"),
            Some(utc(2002, 9, 7, 14, 42, 31))
        );
        // Day of week is optional
        assert_eq!(
            parse_date("7 Sep 2002 09:42:31 +0000"),
            Some(utc(2002, 9, 7, 9, 42, 31))
        );
    }

    #[test]
    fn test_named_zones() {
        assert_eq!(
            parse_date("Mon, 02 Jun 2014 12:00:00 CEST"),
            Some(utc(2014, 6, 2, 10, 0, 0))
        );
        assert_eq!(
            parse_date("Mon, 02 Jun 2014 12:00:00 UTC"),
            Some(utc(2014, 6, 2, 12, 0, 0))
        );
        assert_eq!(
            parse_date("Mon, 02 Jun 2014 12:00:00 EST"),
            Some(utc(2014, 6, 2, 17, 0, 0))
        );
    }

    #[test]
    fn test_without_offset_is_utc() {
        assert_eq!(
            parse_date("2014-06-02T12:00:00"),
            Some(utc(2014, 6, 2, 12, 0, 0))
        );
        assert_eq!(
            parse_date("2014-06-02 12:00:00"),
            Some(utc(2014, 6, 2, 12, 0, 0))
        );
        assert_eq!(parse_date("2014-06-02T12:00Z"), Some(utc(2014, 6, 2, 12, 0, 0)));
    }

    #[test]
    fn test_date_only() {
        assert_eq!(parse_date("2014-06-02"), Some(utc(2014, 6, 2, 0, 0, 0)));
        assert_eq!(parse_date("02 Jun 2014"), Some(utc(2014, 6, 2, 0, 0, 0)));
    }

    #[test]
    fn test_unix_timestamp() {
        assert_eq!(parse_date("1401710400"), Some(utc(2014, 6, 2, 12, 0, 0)));
        assert_eq!(parse_date("2014"), None);
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2014-13-45"), None);
    }

    #[test]
    fn test_most_recent() {
        let early = utc(2001, 1, 1, 0, 0, 0);
        let late = utc(2020, 1, 1, 0, 0, 0);
        assert_eq!(most_recent([early, late, early]), Some(late));
        assert_eq!(most_recent(Vec::new()), None);
    }
}
