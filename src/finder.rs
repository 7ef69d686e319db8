//! Backward search for the most recent instant an [`Expression`] matches.
//!
//! The search runs in two bounded passes: first the most recent qualifying day
//! (year, month, day of month and day of week), then the latest time of day on it.
//! Every pass walks the parsed sets highest first, starting from the reference
//! value on the first iteration and from the top of the field afterwards.

use crate::expression::Expression;
use crate::field::Field;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use tracing::{debug, trace, warn};

/// Outcome of [`find_last_match`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ResolvedOccurrence {
    /// Milliseconds between the matched instant and the reference.
    Found { elapsed_millis: u64 },
    NotFound,
}

impl ResolvedOccurrence {
    pub fn elapsed_millis(&self) -> Option<u64> {
        match self {
            ResolvedOccurrence::Found { elapsed_millis } => Some(*elapsed_millis),
            ResolvedOccurrence::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ResolvedOccurrence::Found { .. })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Search<T> {
    Found(T),
    Exhausted,
}

/// Finds the most recent instant at or before `reference_millis` (milliseconds since
/// the epoch, already shifted into the schedule's offset) whose calendar fields all
/// match `expression`.
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use cron_countdown::{find_last_match, Expression, ResolvedOccurrence};
///
/// let midnight = Expression::parse("0 0 0 * * * *");
/// let reference = "2024-03-15T13:00:00Z".parse::<DateTime<Utc>>().unwrap();
/// assert_eq!(
///     ResolvedOccurrence::Found { elapsed_millis: 13 * 3600 * 1000 },
///     find_last_match(&midnight, reference.timestamp_millis())
/// );
/// ```
pub fn find_last_match(expression: &Expression, reference_millis: i64) -> ResolvedOccurrence {
    let reference = match Utc.timestamp_millis_opt(reference_millis).single() {
        Some(dt) => dt.naive_utc(),
        None => {
            warn!(reference_millis, "reference instant is not representable");
            return ResolvedOccurrence::NotFound;
        }
    };

    match last_instant(expression, reference) {
        Some(matched) => {
            let elapsed = reference_millis - matched.and_utc().timestamp_millis();
            trace!(%reference, %matched, elapsed, "found last occurrence");
            ResolvedOccurrence::Found {
                elapsed_millis: elapsed.max(0) as u64,
            }
        }
        None => {
            warn!(%reference, "no occurrence within the year bounds");
            ResolvedOccurrence::NotFound
        }
    }
}

fn last_instant(expression: &Expression, reference: NaiveDateTime) -> Option<NaiveDateTime> {
    let day = match last_day(expression, reference.date()) {
        Search::Found(day) => day,
        Search::Exhausted => return None,
    };
    let bound = (day == reference.date()).then(|| reference.time());
    if let Search::Found(time) = last_time(expression, bound) {
        return Some(day.and_time(time));
    }

    // Only the reference day carries a time bound, so one retry is enough.
    debug!(%day, "no matching time left on day, retrying the day before");
    let day = match last_day(expression, day.pred_opt()?) {
        Search::Found(day) => day,
        Search::Exhausted => return None,
    };
    match last_time(expression, None) {
        Search::Found(time) => Some(day.and_time(time)),
        Search::Exhausted => None,
    }
}

/// Most recent day at or before `from` matching year, month, day of month AND day of week.
fn last_day(expression: &Expression, from: NaiveDate) -> Search<NaiveDate> {
    let years = expression.field(Field::Years);
    let months = expression.field(Field::Months);
    let days_of_month = expression.field(Field::DaysOfMonth);
    let days_of_week = expression.field(Field::DaysOfWeek);

    let from_year = match u32::try_from(from.year()) {
        Ok(year) => year,
        Err(_) => return Search::Exhausted,
    };

    for year in years.descending(Field::Years.spec().min, from_year) {
        let month_end = if year == from_year { from.month() } else { 12 };

        for month in months.descending(1, month_end) {
            let last = days_in_month(month, year);
            let days_end = if year == from_year && month == from.month() {
                from.day().min(last)
            } else {
                last
            };

            for day_of_month in days_of_month.descending(1, days_end) {
                let date = match NaiveDate::from_ymd_opt(year as i32, month, day_of_month) {
                    Some(date) => date,
                    None => continue,
                };
                if days_of_week.contains(date.weekday().num_days_from_sunday()) {
                    return Search::Found(date);
                }
            }
        }
    }
    Search::Exhausted
}

/// Latest time of day not after `bound` (end of day when `None`).
fn last_time(expression: &Expression, bound: Option<NaiveTime>) -> Search<NaiveTime> {
    let hours = expression.field(Field::Hours);
    let minutes = expression.field(Field::Minutes);
    let seconds = expression.field(Field::Seconds);

    let (hours_end, minutes_end, seconds_end) = bound
        .map(|t| (t.hour(), t.minute(), t.second()))
        .unwrap_or((23, 59, 59));

    for hour in hours.descending(0, hours_end) {
        let initial_hour = bound.is_some() && hour == hours_end;
        let minute_end = if initial_hour { minutes_end } else { 59 };

        for minute in minutes.descending(0, minute_end) {
            let second_end = if initial_hour && minute == minutes_end {
                seconds_end
            } else {
                59
            };

            if let Some(second) = seconds.descending(0, second_end).next() {
                if let Some(time) = NaiveTime::from_hms_opt(hour, minute, second) {
                    return Search::Found(time);
                }
            }
        }
    }
    Search::Exhausted
}

fn is_leap_year(year: u32) -> bool {
    let by_four = year % 4 == 0;
    let by_hundred = year % 100 == 0;
    let by_four_hundred = year % 400 == 0;
    by_four && ((!by_hundred) || by_four_hundred)
}

fn days_in_month(month: u32, year: u32) -> u32 {
    let is_leap_year = is_leap_year(year);
    match month {
        9 | 4 | 6 | 11 => 30,
        2 if is_leap_year => 29,
        2 => 28,
        _ => 31,
    }
}
