use chrono::{DateTime, Datelike, NaiveDateTime, Timelike};

/// Calendar breakdown of an event timestamp, as stored in the `time` table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeParts {
    pub start_time: NaiveDateTime,
    pub hour: i32,
    pub day: i32,
    /// ISO 8601 week number
    pub week: i32,
    pub month: i32,
    /// Calendar year, not the ISO week-numbering year
    pub year: i32,
    /// Monday = 0 .. Sunday = 6
    pub weekday: i32,
}

impl TimeParts {
    /// Decompose epoch milliseconds (UTC). `None` when outside chrono's range.
    pub fn from_epoch_millis(ms: i64) -> Option<Self> {
        let start_time = DateTime::from_timestamp_millis(ms)?.naive_utc();

        Some(TimeParts {
            start_time,
            hour: start_time.hour() as i32,
            day: start_time.day() as i32,
            week: start_time.iso_week().week() as i32,
            month: start_time.month() as i32,
            year: start_time.year(),
            weekday: start_time.weekday().num_days_from_monday() as i32,
        })
    }
}
