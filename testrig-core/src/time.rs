//! Monotonic timestamp abstractions shared by firmware and host targets.
//!
//! Every elapsed-time comparison in the engine goes through
//! [`MonotonicInstant::duration_since`], so implementations decide how to
//! stay correct when their underlying counter wraps. The engine itself never
//! subtracts raw timestamps.

use core::ops::Add;
use core::time::Duration;

/// Trait implemented by monotonic instant wrappers used throughout the engine.
pub trait MonotonicInstant: Copy {
    /// Returns the elapsed time from `earlier` to `self`.
    ///
    /// Implementations must use wraparound-safe arithmetic so a comparison
    /// spanning a counter overflow still reports the true elapsed duration.
    fn duration_since(&self, earlier: Self) -> Duration;
}

/// Millisecond tick counter as produced by a 32-bit hardware timer.
///
/// The counter wraps at `u32::MAX`; [`MonotonicInstant::duration_since`] uses
/// `wrapping_sub` so durations remain correct across a single wrap. This is
/// also the timestamp representation handed across the interrupt bridge,
/// where it has to fit in one atomic word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TickMillis(u32);

impl TickMillis {
    /// Wraps a raw millisecond tick value.
    #[must_use]
    pub const fn new(millis: u32) -> Self {
        Self(millis)
    }

    /// Returns the raw tick value.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self.0
    }
}

impl MonotonicInstant for TickMillis {
    fn duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(u64::from(self.0.wrapping_sub(earlier.0)))
    }
}

impl Add<Duration> for TickMillis {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let millis = u32::try_from(rhs.as_millis()).unwrap_or(u32::MAX);
        Self(self.0.wrapping_add(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_between_ticks() {
        let earlier = TickMillis::new(1_000);
        let later = TickMillis::new(4_500);
        assert_eq!(later.duration_since(earlier), Duration::from_millis(3_500));
    }

    #[test]
    fn elapsed_survives_counter_wrap() {
        let earlier = TickMillis::new(u32::MAX - 100);
        let later = TickMillis::new(400);
        assert_eq!(later.duration_since(earlier), Duration::from_millis(501));
    }

    #[test]
    fn adding_a_duration_wraps() {
        let near_wrap = TickMillis::new(u32::MAX - 10);
        let advanced = near_wrap + Duration::from_millis(20);
        assert_eq!(advanced.as_raw(), 9);
    }
}
