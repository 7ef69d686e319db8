use std::fmt;

/// Anchors a trusted clock (usually fetched from a server) to the local clock
/// so later readings follow local elapsed time without its drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockSync {
    trusted_millis: i64,
    local_millis: i64,
    from_server: bool,
}

impl ClockSync {
    pub fn new(server_millis: i64, local_millis: i64) -> Self {
        ClockSync {
            trusted_millis: server_millis,
            local_millis,
            from_server: true,
        }
    }

    /// Used when the trusted clock could not be fetched.
    pub fn local_only(local_millis: i64) -> Self {
        ClockSync {
            trusted_millis: local_millis,
            local_millis,
            from_server: false,
        }
    }

    pub fn is_from_server(&self) -> bool {
        self.from_server
    }

    /// Trusted minus local time at the anchor.
    pub fn drift_millis(&self) -> i64 {
        self.trusted_millis - self.local_millis
    }

    /// Trusted time when the local clock reads `local_now_millis`. Never earlier than the anchor.
    pub fn now(&self, local_now_millis: i64) -> i64 {
        let elapsed = local_now_millis.saturating_sub(self.local_millis).max(0);
        self.trusted_millis.saturating_add(elapsed)
    }
}

/// Remaining seconds of a cycle, computed at a given local instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_seconds: u64,
    computed_at_local_millis: i64,
}

impl Countdown {
    pub fn new(remaining_seconds: u64, computed_at_local_millis: i64) -> Self {
        Countdown {
            remaining_seconds,
            computed_at_local_millis,
        }
    }

    /// Whole seconds left when the local clock reads `local_now_millis`, floored at zero.
    pub fn remaining_at(&self, local_now_millis: i64) -> u64 {
        let passed = local_now_millis
            .saturating_sub(self.computed_at_local_millis)
            .max(0)
            / 1000;
        self.remaining_seconds.saturating_sub(passed as u64)
    }

    pub fn is_finished_at(&self, local_now_millis: i64) -> bool {
        self.remaining_at(local_now_millis) == 0
    }

    pub fn breakdown_at(&self, local_now_millis: i64) -> Breakdown {
        Breakdown::from_seconds(self.remaining_at(local_now_millis))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Breakdown {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Breakdown {
    pub fn from_seconds(total: u64) -> Self {
        Breakdown {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_follows_local_elapsed_time() {
        let clock = ClockSync::new(1_000_000, 400_000);
        assert!(clock.is_from_server());
        assert_eq!(600_000, clock.drift_millis());
        assert_eq!(1_000_000, clock.now(400_000));
        assert_eq!(1_001_500, clock.now(401_500));
        // Local clock stepped backwards.
        assert_eq!(1_000_000, clock.now(300_000));
    }

    #[test]
    fn local_only_clock() {
        let clock = ClockSync::local_only(400_000);
        assert!(!clock.is_from_server());
        assert_eq!(0, clock.drift_millis());
        assert_eq!(401_500, clock.now(401_500));
    }

    #[test]
    fn countdown_ticks_down_and_stops() {
        let countdown = Countdown::new(100, 5_000);
        assert_eq!(100, countdown.remaining_at(4_000));
        assert_eq!(100, countdown.remaining_at(5_999));
        assert_eq!(99, countdown.remaining_at(6_000));
        assert_eq!(0, countdown.remaining_at(200_000));
        assert!(countdown.is_finished_at(105_000));
        assert!(!countdown.is_finished_at(104_999));
    }

    #[test]
    fn breakdown() {
        assert_eq!(
            Breakdown {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1
            },
            Breakdown::from_seconds(90_061)
        );
        assert_eq!("02:21:00:00", Breakdown::from_seconds(248_400).to_string());
        assert_eq!("00:00:00:00", Breakdown::default().to_string());
        assert_eq!(
            "00:00:01:39",
            Countdown::new(100, 0).breakdown_at(1_000).to_string()
        );
    }
}
