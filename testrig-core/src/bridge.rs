//! Lock-free handoff of debounced edges from interrupt to loop context.
//!
//! The bridge is the only state shared between the two execution contexts.
//! Each edge kind gets its own single-producer/single-consumer slot: an
//! atomic occupied marker plus one atomic word holding the millisecond
//! timestamp. Publishing is last-write-wins — if a second edge of the same
//! kind lands before the loop drains the first, the older timestamp is
//! overwritten. Same-kind edges arriving within a single loop iteration are
//! therefore coalesced; the engine guarantees at most one outstanding unread
//! edge per kind, not an unbounded queue.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::debounce::{EdgeEvent, EdgeKind};
use crate::time::TickMillis;

/// One-deep slot carrying a timestamped notification across contexts.
pub struct EdgeSlot {
    occupied: AtomicBool,
    millis: AtomicU32,
}

impl EdgeSlot {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            occupied: AtomicBool::new(false),
            millis: AtomicU32::new(0),
        }
    }

    /// Stores a timestamp, replacing any unread value (interrupt side).
    pub fn publish(&self, timestamp: TickMillis) {
        self.millis.store(timestamp.as_raw(), Ordering::Release);
        self.occupied.store(true, Ordering::Release);
    }

    /// Reads and clears the slot in one bounded operation (loop side).
    ///
    /// An interrupt overwriting the payload between the marker swap and the
    /// payload load only makes the returned timestamp newer, which is the
    /// documented coalescing behaviour.
    pub fn take(&self) -> Option<TickMillis> {
        if self.occupied.swap(false, Ordering::AcqRel) {
            Some(TickMillis::new(self.millis.load(Ordering::Acquire)))
        } else {
            None
        }
    }

    /// Returns `true` when an unread value is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.occupied.load(Ordering::Acquire)
    }

    /// Discards any unread value.
    pub fn clear(&self) {
        self.occupied.store(false, Ordering::Release);
    }
}

impl Default for EdgeSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending press/release slots shared between interrupt and loop context.
///
/// All methods take `&self` so a `static` bridge can be referenced from both
/// the interrupt handler and the cooperative loop.
pub struct EdgeBridge {
    press: EdgeSlot,
    release: EdgeSlot,
}

impl EdgeBridge {
    /// Creates a bridge with both slots empty.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            press: EdgeSlot::new(),
            release: EdgeSlot::new(),
        }
    }

    /// Publishes a validated edge from interrupt context.
    pub fn publish(&self, event: EdgeEvent<TickMillis>) {
        match event.kind {
            EdgeKind::Press => self.press.publish(event.timestamp),
            EdgeKind::Release => self.release.publish(event.timestamp),
        }
    }

    /// Drains one pending edge, press before release.
    ///
    /// Draining press first keeps observation order deterministic: a press
    /// and release accepted within the same loop iteration are consumed in
    /// the order the debouncer accepted them.
    pub fn take(&self) -> Option<EdgeEvent<TickMillis>> {
        if let Some(timestamp) = self.press.take() {
            return Some(EdgeEvent {
                kind: EdgeKind::Press,
                timestamp,
            });
        }

        self.release.take().map(|timestamp| EdgeEvent {
            kind: EdgeKind::Release,
            timestamp,
        })
    }

    /// Returns `true` when either slot holds an unread edge.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.press.is_pending() || self.release.is_pending()
    }

    /// Discards all unread edges, used when a session restarts.
    pub fn clear(&self) {
        self.press.clear();
        self.release.clear();
    }
}

impl Default for EdgeBridge {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(millis: u32) -> EdgeEvent<TickMillis> {
        EdgeEvent {
            kind: EdgeKind::Press,
            timestamp: TickMillis::new(millis),
        }
    }

    fn release(millis: u32) -> EdgeEvent<TickMillis> {
        EdgeEvent {
            kind: EdgeKind::Release,
            timestamp: TickMillis::new(millis),
        }
    }

    #[test]
    fn each_published_edge_is_consumed_exactly_once() {
        let bridge = EdgeBridge::new();
        bridge.publish(press(100));

        let event = bridge.take().expect("edge expected");
        assert_eq!(event.kind, EdgeKind::Press);
        assert_eq!(event.timestamp, TickMillis::new(100));
        assert!(bridge.take().is_none());
    }

    #[test]
    fn press_is_drained_before_release() {
        let bridge = EdgeBridge::new();
        bridge.publish(release(250));
        bridge.publish(press(200));

        assert_eq!(bridge.take().map(|e| e.kind), Some(EdgeKind::Press));
        assert_eq!(bridge.take().map(|e| e.kind), Some(EdgeKind::Release));
        assert!(bridge.take().is_none());
    }

    #[test]
    fn same_kind_edges_coalesce_to_latest_timestamp() {
        let bridge = EdgeBridge::new();
        bridge.publish(press(100));
        bridge.publish(press(140));

        let event = bridge.take().expect("edge expected");
        assert_eq!(event.timestamp, TickMillis::new(140));
        assert!(bridge.take().is_none());
    }

    #[test]
    fn clear_discards_unread_edges() {
        let bridge = EdgeBridge::new();
        bridge.publish(press(1));
        bridge.publish(release(2));
        assert!(bridge.has_pending());

        bridge.clear();
        assert!(!bridge.has_pending());
        assert!(bridge.take().is_none());
    }
}
