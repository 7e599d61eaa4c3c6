use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 with offset, or a naive date-time which is taken as UTC.
pub fn parse_instant(raw: &str) -> DashResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(DashError::MalformedSeries(format!(
        "unparseable timestamp `{trimmed}`"
    )))
}

/// Serde adapter for timestamps given either as strings or epoch millis.
pub fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    struct InstantVisitor;

    impl Visitor<'_> for InstantVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a date-time string or epoch milliseconds")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            parse_instant(value).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            DateTime::<Utc>::from_timestamp_millis(value)
                .ok_or_else(|| E::custom(format!("epoch millis out of range: {value}")))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            let millis = i64::try_from(value)
                .map_err(|_| E::custom(format!("epoch millis out of range: {value}")))?;
            self.visit_i64(millis)
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if !value.is_finite() {
                return Err(E::custom("epoch millis must be finite"));
            }
            self.visit_i64(value.round() as i64)
        }
    }

    deserializer.deserialize_any(InstantVisitor)
}

/// Timestamp newtype that deserializes through [`deserialize_instant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireInstant(pub DateTime<Utc>);

impl<'de> Deserialize<'de> for WireInstant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_instant(deserializer).map(Self)
    }
}

/// ISO-8601 with millisecond precision and an explicit `+00:00` offset,
/// the form the measurement backend expects in range requests.
#[must_use]
pub fn format_request_instant(instant: DateTime<Utc>) -> String {
    instant
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace('Z', "+00:00")
}

/// Closed time window requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> DashResult<Self> {
        if start > end {
            return Err(DashError::InvalidConfig(format!(
                "time range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `span` ending at `end`.
    pub fn trailing(end: DateTime<Utc>, span: chrono::Duration) -> DashResult<Self> {
        Self::new(end - span, end)
    }

    #[must_use]
    pub fn start(self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub fn end(self) -> DateTime<Utc> {
        self.end
    }

    #[must_use]
    pub fn to_request(self) -> RangeRequest {
        RangeRequest {
            dt_begin: format_request_instant(self.start),
            dt_end: format_request_instant(self.end),
        }
    }
}

/// Request body of the backend's range endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub dt_begin: String,
    pub dt_end: String,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{TimeRange, format_request_instant, parse_instant};

    #[test]
    fn parses_naive_and_offset_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().expect("valid");
        assert_eq!(parse_instant("2024-03-01 12:30:00").expect("naive"), expected);
        assert_eq!(parse_instant("2024-03-01T12:30:00").expect("naive t"), expected);
        assert_eq!(
            parse_instant("2024-03-01T13:30:00+01:00").expect("offset"),
            expected
        );
        assert!(parse_instant("yesterday").is_err());
    }

    #[test]
    fn request_instants_use_explicit_utc_offset() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).single().expect("valid");
        assert_eq!(
            format_request_instant(instant),
            "2024-03-01T12:30:00.000+00:00"
        );
    }

    #[test]
    fn inverted_range_is_rejected() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).single().expect("valid");
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single().expect("valid");
        assert!(TimeRange::new(start, end).is_err());
        let range = TimeRange::new(end, start).expect("ordered range");
        assert_eq!(range.to_request().dt_begin, "2024-03-01T00:00:00.000+00:00");
    }
}
