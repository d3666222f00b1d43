// Date utilities - server timestamp parsing and API-numeric conversions

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::error::{GraphError, GraphResult};

/// Beginning-of-time sentinel: the default lower bound of every selection,
/// so that an unranged query accepts any item.
pub static COMMON_ERA: Lazy<DateTime<Utc>> = Lazy::new(|| {
    Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0)
        .single()
        .expect("common era instant is representable")
});

/// Parse a server timestamp. The API emits offset-suffixed timestamps of the
/// form `2015-03-05T10:00:00+0000`; RFC 3339 is accepted as well.
pub fn parse(raw: &str) -> GraphResult<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    Err(GraphError::InvalidDate(raw.to_string()))
}

/// Parse a caller-supplied date or datetime into a UTC instant. Bare dates
/// resolve to midnight; naive datetimes are taken as UTC.
pub fn parse_utc(raw: &str) -> GraphResult<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&datetime));
    }
    parse(raw)
}

/// API-compatible numeric timestamp (seconds since the Unix epoch) for a
/// caller-supplied date.
pub fn timestamp(raw: &str) -> GraphResult<i64> {
    Ok(parse_utc(raw)?.timestamp())
}
