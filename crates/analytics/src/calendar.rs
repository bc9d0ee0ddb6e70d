use crate::error::AnalyticsError;
use chrono::{DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Defines what "day" and "month" mean for every date-bucketed calculation.
///
/// The calendar is a fixed UTC offset supplied by the caller. Nothing in this
/// crate ever consults the host's local timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceCalendar {
    offset: FixedOffset,
}

impl ReferenceCalendar {
    pub fn utc() -> Self {
        Self::with_offset(Utc.fix())
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a calendar `minutes` east of UTC (negative values are west).
    pub fn from_offset_minutes(minutes: i32) -> Result<Self, AnalyticsError> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::with_offset)
            .ok_or_else(|| {
                AnalyticsError::InvalidInput(format!(
                    "UTC offset of {minutes} minutes is out of range"
                ))
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar date `ts` falls on in this calendar.
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// The UTC instant at which `date` begins in this calendar.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let local = date.and_time(NaiveTime::MIN);
        self.offset
            .from_local_datetime(&local)
            .earliest()
            .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
    }

    pub fn is_same_day(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        self.local_date(a) == self.local_date(b)
    }

    /// The first day of the month containing `date`.
    pub fn month_start(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    /// `[start, end)` of the calendar month containing `ts`, as UTC instants.
    pub fn month_bounds(&self, ts: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let first = self.month_start(self.local_date(ts));
        let end = first
            .checked_add_months(Months::new(1))
            .map_or(DateTime::<Utc>::MAX_UTC, |next| self.start_of_day(next));
        (self.start_of_day(first), end)
    }
}

impl Default for ReferenceCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn day_boundaries_follow_the_offset() {
        let tokyo = ReferenceCalendar::from_offset_minutes(9 * 60).unwrap();
        // 20:00 UTC on the 1st is already the 2nd in UTC+9.
        let ts = at(2024, 3, 1, 20);
        assert_eq!(tokyo.local_date(ts), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(ReferenceCalendar::utc().local_date(ts), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        let start = tokyo.start_of_day(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        assert_eq!(start, at(2024, 3, 1, 15));
    }

    #[test]
    fn same_day_depends_on_calendar() {
        let a = at(2024, 3, 1, 2);
        let b = at(2024, 2, 29, 22);
        assert!(!ReferenceCalendar::utc().is_same_day(a, b));
        let new_york = ReferenceCalendar::from_offset_minutes(-5 * 60).unwrap();
        assert!(new_york.is_same_day(a, b));
    }

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let cal = ReferenceCalendar::utc();
        let (start, end) = cal.month_bounds(at(2024, 2, 17, 12));
        assert_eq!(start, at(2024, 2, 1, 0));
        assert_eq!(end, at(2024, 3, 1, 0));

        let (start, end) = cal.month_bounds(at(2023, 12, 31, 23));
        assert_eq!(start, at(2023, 12, 1, 0));
        assert_eq!(end, at(2024, 1, 1, 0));
    }

    #[test]
    fn rejects_offsets_beyond_a_day() {
        assert!(ReferenceCalendar::from_offset_minutes(24 * 60).is_err());
        assert!(ReferenceCalendar::from_offset_minutes(i32::MAX).is_err());
    }
}
