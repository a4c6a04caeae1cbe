//! Time related utils.

use chrono::Utc;

/// DateTime is the alias for chrono::DateTime<Utc>.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Milliseconds since the unix epoch, the unit of `BB-TIMESTAMP`.
pub fn timestamp_millis(t: DateTime) -> i64 {
    t.timestamp_millis()
}

/// Parse epoch milliseconds back into a datetime.
///
/// Returns `None` if the value is out of chrono's representable range.
pub fn from_timestamp_millis(millis: i64) -> Option<DateTime> {
    DateTime::from_timestamp_millis(millis)
}
