//! Deadline evaluation in a fixed civil-time offset.
//!
//! Task deadlines are calendar dates with an optional time-of-day snapshot,
//! interpreted in the operating region's fixed UTC offset. The offset is an
//! explicit configuration value injected into the services rather than a
//! hidden constant, so tests can exercise other regions.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// End-of-day civil time used when a task carries no time-of-day snapshot.
pub const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("23:59:59 is a valid time of day"),
};

/// Fixed UTC offset in which civil deadlines are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilOffset(FixedOffset);

impl CivilOffset {
    /// The operating region's civil offset (UTC−5).
    pub const UTC_MINUS_5: Self = match FixedOffset::west_opt(5 * 3600) {
        Some(offset) => Self(offset),
        None => panic!("five hours is a valid UTC offset"),
    };

    /// Creates an offset a whole number of hours east of UTC. Negative values
    /// are west of UTC.
    ///
    /// Returns `None` for offsets outside `±23` hours.
    #[must_use]
    pub fn from_hours_east(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self)
    }

    /// Returns the wrapped [`FixedOffset`].
    #[must_use]
    pub const fn as_fixed_offset(&self) -> FixedOffset {
        self.0
    }

    /// Returns today's civil date at the given instant.
    #[must_use]
    pub fn civil_date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.0).date_naive()
    }
}

/// Classification of a completion instant against a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineVerdict {
    /// The completion instant is at or before the deadline.
    OnTime,
    /// The completion instant is after the deadline.
    Late,
}

/// Resolves the deadline instant in UTC for a scheduled date and optional
/// time-of-day snapshot.
///
/// A missing time-of-day defaults to end-of-day civil time (`23:59:59`), not
/// midnight. Civil datetimes in a fixed offset are never ambiguous, so the
/// conversion always resolves to a single instant.
#[must_use]
pub fn deadline_instant(
    scheduled_date: NaiveDate,
    time_of_day: Option<NaiveTime>,
    offset: CivilOffset,
) -> DateTime<Utc> {
    let civil = scheduled_date.and_time(time_of_day.unwrap_or(END_OF_DAY));
    civil
        .and_local_timezone(offset.as_fixed_offset())
        .single()
        .map_or_else(
            || DateTime::<Utc>::from_naive_utc_and_offset(civil, Utc),
            |resolved| resolved.with_timezone(&Utc),
        )
}

/// Classifies `now` against the task's deadline.
///
/// Callers evaluate this only while a task is still open; re-submission of an
/// already-completed task must not re-evaluate nor overwrite its original
/// completion stamp.
#[must_use]
pub fn evaluate(
    scheduled_date: NaiveDate,
    time_of_day: Option<NaiveTime>,
    offset: CivilOffset,
    now: DateTime<Utc>,
) -> DeadlineVerdict {
    if now <= deadline_instant(scheduled_date, time_of_day, offset) {
        DeadlineVerdict::OnTime
    } else {
        DeadlineVerdict::Late
    }
}
