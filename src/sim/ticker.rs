//! Fixed-period motion schedule
//!
//! A `TickSchedule` exists only while the ship is sailing. Dropping it is the
//! cancellation: there is no flag to check and nothing left to fire.

/// Schedule of due ticks against a monotonic millisecond clock
#[derive(Debug, Clone, PartialEq)]
pub struct TickSchedule {
    period_ms: f64,
    next_due_ms: f64,
}

impl TickSchedule {
    /// Start a fresh cycle at `now_ms`; the first tick is due one period later
    pub fn new(now_ms: f64, period_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now_ms + period_ms,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    pub fn next_due_ms(&self) -> f64 {
        self.next_due_ms
    }

    /// Consume one due tick, if any.
    ///
    /// Ticks stay on the period grid, so a late poll yields every tick that
    /// came due since, one call at a time.
    pub fn take_due(&mut self, now_ms: f64) -> bool {
        if now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms += self.period_ms;
        true
    }

    /// Drop any backlog and re-anchor the grid at `now_ms`
    pub fn rebase(&mut self, now_ms: f64) {
        self.next_due_ms = now_ms + self.period_ms;
    }
}
