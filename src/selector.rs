use crate::countdown::{ClockSync, Countdown};
use crate::duration::parse_cycle_length;
use crate::errors::ConfigMismatch;
use crate::expression::Expression;
use crate::offset::{resolve_offset_minutes, OffsetTables};
use serde::Deserialize;
use tracing::{debug, warn};

/// Cycle used when an interval cannot be evaluated.
pub const DEFAULT_CYCLE_SECONDS: u64 = 86_400;

/// An expression paired with the time from each of its triggers to the next reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCandidate {
    pub expression: Expression,
    pub cycle_length_seconds: u64,
}

impl ScheduleCandidate {
    pub fn new(expression: Expression, cycle_length_seconds: u64) -> Self {
        ScheduleCandidate {
            expression,
            cycle_length_seconds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub remaining_seconds: u64,
    pub chosen_index: usize,
}

/// Picks the candidate that triggered most recently before `reference_millis`
/// (earliest index on ties) and returns what is left of its cycle.
///
/// When no candidate has ever triggered the first one is chosen with its full cycle.
pub fn select(candidates: &[ScheduleCandidate], reference_millis: i64) -> Selection {
    let most_recent = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            candidate
                .expression
                .find_last_match(reference_millis)
                .elapsed_millis()
                .map(|elapsed| (index, elapsed))
        })
        .min_by_key(|&(index, elapsed)| (elapsed, index));

    match (most_recent, candidates.first()) {
        (Some((index, elapsed_millis)), _) => {
            let elapsed_seconds = (elapsed_millis + 500) / 1000;
            let cycle = candidates[index].cycle_length_seconds;
            debug!(index, elapsed_seconds, cycle, "selected schedule");
            Selection {
                remaining_seconds: cycle.saturating_sub(elapsed_seconds),
                chosen_index: index,
            }
        }
        (None, Some(first)) => {
            warn!(
                candidates = candidates.len(),
                "no schedule has triggered, starting a full cycle"
            );
            Selection {
                remaining_seconds: first.cycle_length_seconds,
                chosen_index: 0,
            }
        }
        (None, None) => {
            warn!("no schedules configured");
            Selection {
                remaining_seconds: 0,
                chosen_index: 0,
            }
        }
    }
}

/// The candidates of one countdown plus the offset specifier they are expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    candidates: Vec<ScheduleCandidate>,
    offset: String,
}

impl Schedule {
    pub fn new(candidates: Vec<ScheduleCandidate>, offset: impl Into<String>) -> Self {
        Schedule {
            candidates,
            offset: offset.into(),
        }
    }

    pub fn candidates(&self) -> &[ScheduleCandidate] {
        &self.candidates
    }

    pub fn offset(&self) -> &str {
        &self.offset
    }

    /// Shifts `reference_millis` (UTC) by the resolved offset and runs [`select`].
    pub fn select(
        &self,
        reference_millis: i64,
        client_offset_minutes: i32,
        tables: &OffsetTables,
    ) -> Selection {
        let offset = resolve_offset_minutes(&self.offset, client_offset_minutes, tables);
        let shifted = reference_millis.saturating_add(i64::from(offset) * 60_000);
        select(&self.candidates, shifted)
    }

    /// Countdown for a viewer whose local clock reads `local_now_millis`.
    pub fn countdown(
        &self,
        clock: &ClockSync,
        local_now_millis: i64,
        client_offset_minutes: i32,
        tables: &OffsetTables,
    ) -> Countdown {
        let selection = self.select(clock.now(local_now_millis), client_offset_minutes, tables);
        Countdown::new(selection.remaining_seconds, local_now_millis)
    }
}

/// Declarative form of a [`Schedule`], as attached to a countdown widget.
///
/// ```rust
/// use cron_countdown::ScheduleConfig;
///
/// let config = ScheduleConfig::from_json(
///     r#"{"starts": ["0 0 10 * * MON"], "intervals": ["7d"], "offset": "auto"}"#,
/// )
/// .unwrap();
/// let schedule = config.build();
/// assert_eq!(604_800, schedule.candidates()[0].cycle_length_seconds);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub starts: Vec<String>,
    pub intervals: Vec<String>,
    pub offset: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            starts: vec!["0 0 0 * * *".into()],
            intervals: vec![DEFAULT_CYCLE_SECONDS.to_string()],
            offset: "0".into(),
        }
    }
}

impl ScheduleConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn build(&self) -> Schedule {
        self.build_with_fault().0
    }

    /// Builds the schedule, reporting unequal `starts` and `intervals`. The shorter wins.
    pub fn build_with_fault(&self) -> (Schedule, Option<ConfigMismatch>) {
        let used = self.starts.len().min(self.intervals.len());
        let mismatch = (self.starts.len() != self.intervals.len()).then(|| ConfigMismatch {
            starts: self.starts.len(),
            intervals: self.intervals.len(),
            used,
        });
        if let Some(fault) = &mismatch {
            warn!(%fault, "dropping unpaired schedules");
        }

        let candidates = self
            .starts
            .iter()
            .zip(&self.intervals)
            .map(|(start, interval)| {
                let cycle = parse_cycle_length(interval).unwrap_or_else(|err| {
                    warn!(interval = interval.as_str(), %err, "using a one day cycle");
                    DEFAULT_CYCLE_SECONDS
                });
                ScheduleCandidate::new(Expression::parse(start), cycle)
            })
            .collect();

        (Schedule::new(candidates, self.offset.clone()), mismatch)
    }
}
