//! Time utility functions
//!
//! Timestamps are stored as unix seconds (UTC) throughout the store.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// Which end of a date range a bound describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

/// Current time as unix seconds
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Convert unix seconds to an RFC 3339 string
pub fn secs_to_rfc3339(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .unwrap_or_else(|| {
            tracing::warn!(secs, "Invalid timestamp, using epoch");
            DateTime::UNIX_EPOCH
        })
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serialize unix seconds as an RFC 3339 string (`serialize_with` helper)
pub fn serialize_secs<S>(secs: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&secs_to_rfc3339(*secs))
}

/// Optional variant of [`serialize_secs`]
pub fn serialize_opt_secs<S>(secs: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secs {
        Some(secs) => serializer.serialize_some(&secs_to_rfc3339(*secs)),
        None => serializer.serialize_none(),
    }
}

/// Parse a date filter bound into unix seconds.
///
/// Accepts `YYYY-MM-DD` (the whole day is included, so an end bound maps to
/// 23:59:59 of that day) or a full RFC 3339 timestamp. Returns `None` for
/// anything else.
pub fn parse_date_bound(value: &str, bound: RangeBound) -> Option<i64> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match bound {
            RangeBound::Start => date.and_hms_opt(0, 0, 0)?,
            RangeBound::End => date.and_hms_opt(23, 59, 59)?,
        };
        return Some(time.and_utc().timestamp());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp())
}
