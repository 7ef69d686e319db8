//! # Cron Countdown
//!
//! Resolves how long ago a recurring, cron-like schedule last triggered, so a
//! countdown to the end of its current cycle can be displayed.
//!
//! Expressions have up to 7 fields, `seconds minutes hours day-of-month month day-of-week [year]`.
//! Omitted leading fields take their defaults (`0` for the time fields, `*` otherwise).
//!
//! The following Syntax is supported:
//! - \* any value
//! - , value list
//! - \- range values
//! - / step values
//! - `JAN`-`DEC` and `SUN`-`SAT` aliases, day of week `7` is Sunday
//!
//! Day of month and day of week are combined with AND: `0 0 0 1 * MON` only
//! triggers on a Monday the 1st.
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use cron_countdown::{ClockSync, OffsetTables, ScheduleConfig};
//!
//! // A weekly sale starting Monday 10:00 and a flash sale every day at 18:00, Moscow time.
//! let schedule = ScheduleConfig::from_json(
//!     r#"{
//!         "starts": ["0 0 10 * * MON", "0 0 18 * * *"],
//!         "intervals": ["7d", "2h"],
//!         "offset": "180"
//!     }"#,
//! )
//! .unwrap()
//! .build();
//!
//! let now = "2024-03-15T15:30:00Z".parse::<DateTime<Utc>>().unwrap().timestamp_millis();
//! let selection = schedule.select(now, 0, &OffsetTables::new());
//!
//! // 18:30 in Moscow: the flash sale started half an hour ago.
//! assert_eq!(1, selection.chosen_index);
//! assert_eq!(90 * 60, selection.remaining_seconds);
//!
//! let countdown = schedule.countdown(&ClockSync::new(now, now), now, 0, &OffsetTables::new());
//! assert_eq!("00:01:30:00", countdown.breakdown_at(now).to_string());
//! ```
mod countdown;
mod duration;
mod errors;
mod expression;
mod field;
mod finder;
mod offset;
mod selector;

#[doc(inline)]
pub use errors::{
    ConfigMismatch, CycleLengthError, ExpressionFault, OffsetFault, ParseFault,
    ParseScheduleError, RangeFault,
};

#[doc(inline)]
pub use field::{Field, FieldSpec, MAX_YEAR, MIN_YEAR};

#[doc(inline)]
pub use expression::{Expression, MatchSet};

#[doc(inline)]
pub use finder::{find_last_match, ResolvedOccurrence};

#[doc(inline)]
pub use offset::{resolve_offset_minutes, OffsetBucket, OffsetMap, OffsetTables, AUTO};

#[doc(inline)]
pub use duration::parse_cycle_length;

#[doc(inline)]
pub use selector::{
    select, Schedule, ScheduleCandidate, ScheduleConfig, Selection, DEFAULT_CYCLE_SECONDS,
};

#[doc(inline)]
pub use countdown::{Breakdown, ClockSync, Countdown};
