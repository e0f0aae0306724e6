//! Event classification and session statistics.
//!
//! The tracker pairs debounced edges into presses, classifies their duration,
//! and spots diagnostic conditions; the statistics container keeps the
//! monotonically incremented counters the session reports at completion.

use core::time::Duration;

use heapless::Vec;

use crate::debounce::{EdgeEvent, EdgeKind};
use crate::time::MonotonicInstant;

/// Presses at or above this duration classify as long by default.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(5_000);

/// Releases closer together than this flag a rapid-repeat diagnostic.
pub const DEFAULT_RAPID_REPEAT: Duration = Duration::from_millis(200);

/// Duration thresholds applied when classifying presses.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PressThresholds {
    pub long_press: Duration,
    pub rapid_repeat: Duration,
}

impl Default for PressThresholds {
    fn default() -> Self {
        Self {
            long_press: DEFAULT_LONG_PRESS,
            rapid_repeat: DEFAULT_RAPID_REPEAT,
        }
    }
}

/// Classification of a completed press.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PressClass {
    Short,
    Long,
}

/// Outcome of feeding one edge into the tracker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeOutcome {
    /// A press opened; nothing to classify yet.
    PressOpened,
    /// A release closed the most recent unmatched press.
    Classified {
        class: PressClass,
        held_for: Duration,
        /// Set when the gap since the previous release fell below the
        /// rapid-repeat threshold. Diagnostic only; counts are unaffected.
        rapid_repeat: Option<Duration>,
    },
    /// A release arrived without a preceding accepted press.
    SpuriousRelease,
}

/// Pairs press/release edges and classifies the resulting press durations.
pub struct PressTracker<TInstant>
where
    TInstant: Copy,
{
    thresholds: PressThresholds,
    open_press: Option<TInstant>,
    last_release: Option<TInstant>,
}

impl<TInstant> PressTracker<TInstant>
where
    TInstant: MonotonicInstant,
{
    /// Creates a tracker with the provided thresholds.
    #[must_use]
    pub const fn new(thresholds: PressThresholds) -> Self {
        Self {
            thresholds,
            open_press: None,
            last_release: None,
        }
    }

    /// Returns the configured thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> PressThresholds {
        self.thresholds
    }

    /// Returns `true` while a press awaits its release.
    #[must_use]
    pub const fn press_open(&self) -> bool {
        self.open_press.is_some()
    }

    /// Feeds one validated edge and reports what it amounted to.
    ///
    /// A second press before a release simply re-opens with the newer
    /// timestamp, matching the bridge's last-write-wins handoff.
    pub fn observe(&mut self, event: EdgeEvent<TInstant>) -> EdgeOutcome {
        match event.kind {
            EdgeKind::Press => {
                self.open_press = Some(event.timestamp);
                EdgeOutcome::PressOpened
            }
            EdgeKind::Release => {
                let Some(pressed_at) = self.open_press.take() else {
                    return EdgeOutcome::SpuriousRelease;
                };

                let held_for = event.timestamp.duration_since(pressed_at);
                let class = if held_for >= self.thresholds.long_press {
                    PressClass::Long
                } else {
                    PressClass::Short
                };

                let rapid_repeat = self.last_release.and_then(|previous| {
                    let gap = event.timestamp.duration_since(previous);
                    (gap < self.thresholds.rapid_repeat).then_some(gap)
                });
                self.last_release = Some(event.timestamp);

                EdgeOutcome::Classified {
                    class,
                    held_for,
                    rapid_repeat,
                }
            }
        }
    }

    /// Drops any open press and release memory.
    pub fn reset(&mut self) {
        self.open_press = None;
        self.last_release = None;
    }
}

/// Maximum number of distinct named categories tracked per session.
pub const MAX_CATEGORIES: usize = 24;

/// Counters aggregated over one session.
///
/// Press counters are dedicated fields; everything else (colors shown,
/// brightness levels, servo positions) is a named category keyed by the step
/// label from the plan table.
#[derive(Clone, Debug, Default)]
pub struct EventStatistics {
    short_presses: u32,
    long_presses: u32,
    total_presses: u32,
    categories: Vec<(&'static str, u32), MAX_CATEGORIES>,
}

impl EventStatistics {
    /// Creates an empty statistics container.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            short_presses: 0,
            long_presses: 0,
            total_presses: 0,
            categories: Vec::new(),
        }
    }

    /// Records one classified press.
    pub fn record_press(&mut self, class: PressClass) {
        match class {
            PressClass::Short => self.short_presses = self.short_presses.saturating_add(1),
            PressClass::Long => self.long_presses = self.long_presses.saturating_add(1),
        }
        self.total_presses = self.total_presses.saturating_add(1);
    }

    /// Increments the named category, creating it on first sight.
    ///
    /// Categories beyond [`MAX_CATEGORIES`] are dropped; plans are sized well
    /// below the limit.
    pub fn record_category(&mut self, label: &'static str) {
        if let Some((_, count)) = self
            .categories
            .iter_mut()
            .find(|(existing, _)| *existing == label)
        {
            *count = count.saturating_add(1);
        } else {
            let _ = self.categories.push((label, 1));
        }
    }

    /// Returns the number of short presses recorded.
    #[must_use]
    pub const fn short_presses(&self) -> u32 {
        self.short_presses
    }

    /// Returns the number of long presses recorded.
    #[must_use]
    pub const fn long_presses(&self) -> u32 {
        self.long_presses
    }

    /// Returns the total number of presses recorded.
    #[must_use]
    pub const fn total_presses(&self) -> u32 {
        self.total_presses
    }

    /// Looks up a named category count.
    #[must_use]
    pub fn category(&self, label: &str) -> u32 {
        self.categories
            .iter()
            .find(|(existing, _)| *existing == label)
            .map_or(0, |(_, count)| *count)
    }

    /// Iterates the named categories in first-seen order.
    pub fn categories(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.categories.iter().copied()
    }

    /// Clears every counter, done once at session start.
    pub fn reset(&mut self) {
        self.short_presses = 0;
        self.long_presses = 0;
        self.total_presses = 0;
        self.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::TickMillis;

    fn edge(kind: EdgeKind, millis: u32) -> EdgeEvent<TickMillis> {
        EdgeEvent {
            kind,
            timestamp: TickMillis::new(millis),
        }
    }

    fn tracker() -> PressTracker<TickMillis> {
        PressTracker::new(PressThresholds::default())
    }

    #[test]
    fn three_second_hold_classifies_short() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.observe(edge(EdgeKind::Press, 1_000)),
            EdgeOutcome::PressOpened
        );

        let outcome = tracker.observe(edge(EdgeKind::Release, 4_000));
        assert_eq!(
            outcome,
            EdgeOutcome::Classified {
                class: PressClass::Short,
                held_for: Duration::from_millis(3_000),
                rapid_repeat: None,
            }
        );
    }

    #[test]
    fn six_second_hold_classifies_long() {
        let mut tracker = tracker();
        tracker.observe(edge(EdgeKind::Press, 0));

        let outcome = tracker.observe(edge(EdgeKind::Release, 6_000));
        assert!(matches!(
            outcome,
            EdgeOutcome::Classified {
                class: PressClass::Long,
                ..
            }
        ));
    }

    #[test]
    fn hold_exactly_at_threshold_is_long() {
        let mut tracker = tracker();
        tracker.observe(edge(EdgeKind::Press, 0));

        let outcome = tracker.observe(edge(EdgeKind::Release, 5_000));
        assert!(matches!(
            outcome,
            EdgeOutcome::Classified {
                class: PressClass::Long,
                ..
            }
        ));
    }

    #[test]
    fn release_without_press_is_spurious() {
        let mut tracker = tracker();
        assert_eq!(
            tracker.observe(edge(EdgeKind::Release, 100)),
            EdgeOutcome::SpuriousRelease
        );
    }

    #[test]
    fn releases_close_together_flag_rapid_repeat() {
        let mut tracker = tracker();
        tracker.observe(edge(EdgeKind::Press, 0));
        tracker.observe(edge(EdgeKind::Release, 50));

        tracker.observe(edge(EdgeKind::Press, 100));
        let outcome = tracker.observe(edge(EdgeKind::Release, 150));
        assert_eq!(
            outcome,
            EdgeOutcome::Classified {
                class: PressClass::Short,
                held_for: Duration::from_millis(50),
                rapid_repeat: Some(Duration::from_millis(100)),
            }
        );
    }

    #[test]
    fn widely_spaced_releases_do_not_flag() {
        let mut tracker = tracker();
        tracker.observe(edge(EdgeKind::Press, 0));
        tracker.observe(edge(EdgeKind::Release, 50));

        tracker.observe(edge(EdgeKind::Press, 1_000));
        let outcome = tracker.observe(edge(EdgeKind::Release, 1_100));
        assert!(matches!(
            outcome,
            EdgeOutcome::Classified {
                rapid_repeat: None,
                ..
            }
        ));
    }

    #[test]
    fn second_press_reopens_with_newer_timestamp() {
        let mut tracker = tracker();
        tracker.observe(edge(EdgeKind::Press, 0));
        tracker.observe(edge(EdgeKind::Press, 2_000));

        let outcome = tracker.observe(edge(EdgeKind::Release, 3_000));
        assert!(matches!(
            outcome,
            EdgeOutcome::Classified {
                held_for,
                ..
            } if held_for == Duration::from_millis(1_000)
        ));
    }

    #[test]
    fn statistics_keep_press_and_category_counts() {
        let mut stats = EventStatistics::new();
        stats.record_press(PressClass::Short);
        stats.record_press(PressClass::Long);
        stats.record_press(PressClass::Short);
        stats.record_category("red");
        stats.record_category("red");
        stats.record_category("green");

        assert_eq!(stats.short_presses(), 2);
        assert_eq!(stats.long_presses(), 1);
        assert_eq!(stats.total_presses(), 3);
        assert_eq!(stats.category("red"), 2);
        assert_eq!(stats.category("green"), 1);
        assert_eq!(stats.category("blue"), 0);
    }

    #[test]
    fn reset_clears_every_counter() {
        let mut stats = EventStatistics::new();
        stats.record_press(PressClass::Short);
        stats.record_category("red");

        stats.reset();
        assert_eq!(stats.total_presses(), 0);
        assert_eq!(stats.category("red"), 0);
        assert_eq!(stats.categories().count(), 0);
    }
}
