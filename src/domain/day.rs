//! Calendar days as UTC ranges
//!
//! Availability is decided per local day: the time of day is ignored, so an
//! item deferred to any time during the day is already due on that day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// Midnight of `date` in `tz`, as a UTC instant
///
/// A local midnight skipped by a DST transition resolves to the first valid
/// instant of that day.
pub fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    if let Some(at) = tz.from_local_datetime(&naive).earliest() {
        return at.with_timezone(&Utc);
    }
    (1..=4)
        .filter_map(|hour| {
            tz.from_local_datetime(&(naive + chrono::Duration::hours(hour)))
                .earliest()
        })
        .next()
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// One local calendar day, as the half-open UTC range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Day {
    date: NaiveDate,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Day {
    /// The day `date` in `tz`
    pub fn on<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Self {
        let end = date
            .succ_opt()
            .map(|next| midnight(tz, next))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            date,
            start: midnight(tz, date),
            end,
        }
    }

    /// The day containing `at`, in `at`'s own time zone
    pub fn containing<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self::on(&at.timezone(), at.date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns true if `at` falls on a later day
    pub fn is_before(&self, at: DateTime<Utc>) -> bool {
        at >= self.end
    }
}
