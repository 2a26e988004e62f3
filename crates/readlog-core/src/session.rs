//! The reading-session record.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A completed reading session as the backend stores it.
///
/// `timestamp` is the session's end time in unix seconds and doubles as
/// the delete key. The backend assigns it on create; uniqueness per user
/// is assumed, not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingSession {
    pub timestamp: i64,
    /// Duration in seconds.
    pub duration: i64,
}

impl ReadingSession {
    /// End of the session as an instant.
    pub fn ended_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Calendar day the session ended on, in the given time zone.
    pub fn local_date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.ended_at().with_timezone(tz).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn local_date_respects_time_zone() {
        // 2024-03-01 23:30 UTC is already March 2nd at UTC+9.
        let session = ReadingSession {
            timestamp: 1_709_335_800,
            duration: 300,
        };
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            session.local_date(&Utc),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            session.local_date(&tokyo),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }
}
