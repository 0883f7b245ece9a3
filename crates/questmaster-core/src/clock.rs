//! Time source for deadline math and calendar-day comparisons.
//!
//! Instants are always `DateTime<Utc>`. Calendar questions ("is this due
//! today?", "was this completed before noon?") are answered in the clock's
//! local time zone, so a `ManualClock` with a fixed offset makes them
//! deterministic in tests.

use chrono::{
    DateTime, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Timelike, Utc,
};
use std::sync::RwLock;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `at` in local time.
    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate;

    /// Hour of day (0-23) of `at` in local time.
    fn local_hour(&self, at: DateTime<Utc>) -> u32;

    /// Interpret a wall-clock value in local time.
    fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>>;

    fn today(&self) -> NaiveDate {
        self.local_date(self.now())
    }
}

/// Wall clock in the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }

    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&Local).hour()
    }

    fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        resolve(Local.from_local_datetime(&naive))
    }
}

/// Settable clock with a fixed UTC offset.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `now`, local time equal to UTC.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: RwLock::new(now),
            offset,
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.write() {
            *now = at;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.write() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .read()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.offset).hour()
    }

    fn from_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        resolve(self.offset.from_local_datetime(&naive))
    }
}

fn resolve<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<DateTime<Utc>> {
    match result {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        // DST fold: take the earlier instant.
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::hours(20));
        assert_eq!(clock.now(), start + Duration::hours(20));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn offset_shifts_calendar_date() {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 22, 30, 0).unwrap();
        let clock = ManualClock::with_offset(at, FixedOffset::east_opt(3 * 3600).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(clock.local_hour(at), 1);
    }

    #[test]
    fn from_local_applies_offset() {
        let clock = ManualClock::with_offset(Utc::now(), FixedOffset::west_opt(5 * 3600).unwrap());
        let naive = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let utc = clock.from_local(naive).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap());
    }
}
