//! Arming state machine for enemy attacks
//!
//! Each alien, the mothership's movement and the mothership's gun own one
//! `Cooldown`. The tick handler advances it; spawn and wall logic arm it.
//! On the wire (debug output, tests) it still reads as the classic sentinel
//! value: below -4 locked, -4..0 counting, 0 and above ready.

use rand::Rng;

/// Counting values below this are treated as locked
pub const LOCK_THRESHOLD: f64 = -4.0;
/// Sentinel value of a locked cooldown
pub const LOCK_VALUE: f64 = -5.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Cooldown {
    /// Idle (or holding position after a wall bounce); ticks do nothing
    #[default]
    Locked,
    /// Counting up toward zero; the value is always in [-4, 0)
    Counting(f64),
    /// Due; the next tick reports the action and relocks
    Ready,
}

impl Cooldown {
    /// Decode a sentinel value
    pub fn from_value(value: f64) -> Self {
        if value < LOCK_THRESHOLD {
            Cooldown::Locked
        } else if value < 0.0 {
            Cooldown::Counting(value)
        } else {
            Cooldown::Ready
        }
    }

    /// Encode as a sentinel value
    pub fn value(&self) -> f64 {
        match *self {
            Cooldown::Locked => LOCK_VALUE,
            Cooldown::Counting(v) => v,
            Cooldown::Ready => 0.0,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Cooldown::Locked)
    }

    pub fn is_counting(&self) -> bool {
        matches!(self, Cooldown::Counting(_))
    }

    /// Advance by `elapsed` seconds. Returns true when the action fires;
    /// the cooldown is locked again by the time this returns.
    pub fn tick(&mut self, elapsed: f64) -> bool {
        if let Cooldown::Counting(v) = *self {
            let v = v + elapsed.max(0.0);
            *self = if v >= 0.0 {
                Cooldown::Ready
            } else {
                Cooldown::Counting(v)
            };
        }

        if matches!(self, Cooldown::Ready) {
            *self = Cooldown::Locked;
            return true;
        }
        false
    }

    /// Start a waiting period drawn uniformly from [-high, -low]
    pub fn arm<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let draw = if high > low {
            rng.random_range(low..=high)
        } else {
            low
        };
        *self = Cooldown::from_value(-draw);
    }

    /// Wall contact: a pending Ready is discarded and a locked cooldown is
    /// rearmed. A cooldown that is already counting keeps its value.
    pub fn bounce<R: Rng + ?Sized>(&mut self, rng: &mut R, low: f64, high: f64) {
        if matches!(self, Cooldown::Ready) {
            *self = Cooldown::Locked;
        }
        if self.is_locked() {
            self.arm(rng, low, high);
        }
    }

    /// Force the locked state (boss defeated, session reset)
    pub fn lock(&mut self) {
        *self = Cooldown::Locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    #[test]
    fn test_sentinel_round_trip() {
        assert_eq!(Cooldown::from_value(-5.0), Cooldown::Locked);
        assert_eq!(Cooldown::from_value(-4.5), Cooldown::Locked);
        assert_eq!(Cooldown::from_value(-4.0), Cooldown::Counting(-4.0));
        assert_eq!(Cooldown::from_value(0.0), Cooldown::Ready);
        assert_eq!(Cooldown::Locked.value(), LOCK_VALUE);
    }

    #[test]
    fn test_arm_draws_inside_range() {
        let mut rng = rng();
        for _ in 0..200 {
            let mut c = Cooldown::Locked;
            c.arm(&mut rng, 2.0, 4.0);
            let v = c.value();
            assert!(c.is_counting());
            assert!((-4.0..=-2.0).contains(&v), "drew {v}");
        }
    }

    #[test]
    fn test_large_tick_fires_and_relocks_in_one_call() {
        let mut c = Cooldown::Locked;
        c.arm(&mut rng(), 2.0, 4.0);
        assert!(c.tick(10.0));
        assert_eq!(c, Cooldown::Locked);
        assert_eq!(c.value(), -5.0);
    }

    #[test]
    fn test_locked_ignores_ticks() {
        let mut c = Cooldown::Locked;
        for _ in 0..100 {
            assert!(!c.tick(1.0));
        }
        assert!(c.is_locked());
    }

    #[test]
    fn test_counts_up_then_fires_once() {
        let mut c = Cooldown::Counting(-0.25);
        assert!(!c.tick(0.1));
        assert!(!c.tick(0.1));
        assert!(c.tick(0.1));
        assert!(!c.tick(0.1));
    }

    #[test]
    fn test_bounce_discards_pending_ready() {
        let mut c = Cooldown::Ready;
        c.bounce(&mut rng(), 2.0, 4.0);
        assert!(c.is_counting());
        // A bounce while counting leaves the countdown alone
        let before = c;
        c.bounce(&mut rng(), 2.0, 4.0);
        assert_eq!(c, before);
    }

    proptest! {
        #[test]
        fn prop_counting_never_decreases(start in -4.0f64..-0.001, steps in proptest::collection::vec(0.0f64..0.5, 1..50)) {
            let mut c = Cooldown::Counting(start);
            let mut previous = start;
            for e in steps {
                let fired = c.tick(e);
                match c {
                    Cooldown::Counting(v) => {
                        prop_assert!(!fired);
                        prop_assert!(v >= previous);
                        previous = v;
                    }
                    Cooldown::Locked => {
                        prop_assert!(fired);
                        prop_assert!(previous + e >= 0.0);
                        break;
                    }
                    Cooldown::Ready => prop_assert!(false, "Ready must not outlive a tick"),
                }
            }
        }
    }
}
