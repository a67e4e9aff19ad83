//! Monotonic time from a free-running hardware counter
//!
//! The counter itself wraps every `range` increments. Its overflow interrupt
//! calls `record_overflow` exactly once per wrap; nothing else may touch the
//! overflow count, otherwise a wrap could be missed or counted twice.

use crate::consts::{COARSE_RANGE, COUNTER_PERIOD, FINE_RANGE};

/// Static description of one hardware counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSpec {
    /// Seconds per counter increment
    pub period: f64,
    /// Increments per wraparound
    pub range: u32,
}

impl ClockSpec {
    /// 8-bit counter, drives the minutes/seconds display
    pub const COARSE: ClockSpec = ClockSpec {
        period: COUNTER_PERIOD,
        range: COARSE_RANGE,
    };

    /// 16-bit counter, drives tick deltas and debug timestamps
    pub const FINE: ClockSpec = ClockSpec {
        period: COUNTER_PERIOD,
        range: FINE_RANGE,
    };
}

/// Elapsed time derived from a counter plus a software overflow count.
///
/// Reads only move forward: if a read would land before the previous one
/// (an overflow was serviced late), the previous value is returned instead.
#[derive(Debug, Clone)]
pub struct Clock {
    spec: ClockSpec,
    overflows: u64,
    last: f64,
}

impl Clock {
    pub fn new(spec: ClockSpec) -> Self {
        Self {
            spec,
            overflows: 0,
            last: 0.0,
        }
    }

    /// Called from the counter's overflow interrupt, once per wrap
    #[inline]
    pub fn record_overflow(&mut self) {
        self.overflows += 1;
    }

    /// Restart from zero (the hardware counter is cleared alongside)
    pub fn reset(&mut self) {
        self.overflows = 0;
        self.last = 0.0;
    }

    /// Seconds since the last reset, given the sampled counter register
    pub fn elapsed_seconds(&mut self, raw: u32) -> f64 {
        let raw = raw % self.spec.range;
        let counts = raw as f64 + self.overflows as f64 * self.spec.range as f64;
        let now = self.spec.period * counts;
        if now < self.last {
            log::warn!(
                "clock read {:.4}s before previous {:.4}s (overflow serviced late?)",
                now,
                self.last
            );
            return self.last;
        }
        self.last = now;
        now
    }
}
