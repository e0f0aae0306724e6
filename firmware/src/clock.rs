//! Millisecond tick source backed by the embassy monotonic.
//!
//! The engine timestamps everything with [`TickMillis`], a 32-bit counter
//! that wraps after roughly 49 days of uptime. Duration arithmetic in the
//! core is wrap-safe, so truncating the 64-bit embassy counter is fine.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::time::Duration as CoreDuration;

use embassy_time::{Duration, Instant};
use testrig_core::time::TickMillis;

/// Current time as an engine tick.
#[cfg(target_os = "none")]
pub fn now() -> TickMillis {
    from_instant(Instant::now())
}

/// Converts an embassy instant to an engine tick, truncating to 32 bits.
#[allow(clippy::cast_possible_truncation)]
pub fn from_instant(instant: Instant) -> TickMillis {
    TickMillis::new(instant.as_millis() as u32)
}

/// Converts a core duration into an embassy duration for timer waits.
pub fn to_embassy(duration: CoreDuration) -> Duration {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(millis)
}
