//! Edge debouncing for a single digital input.
//!
//! The debouncer runs in interrupt context: it keeps a few words of state,
//! performs no formatting or allocation, and turns noisy level transitions
//! into validated press/release edges. Raw samples that arrive inside the
//! debounce window are defined as switch bounce and leave the accepted-level
//! memory untouched.

use core::time::Duration;

use crate::time::MonotonicInstant;

/// Default window applied when callers do not override it.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(50);

/// Direction of a validated edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeKind {
    /// Input moved to the active level.
    Press,
    /// Input returned to the idle level.
    Release,
}

/// A validated transition, immutable once created.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeEvent<TInstant>
where
    TInstant: Copy,
{
    pub kind: EdgeKind,
    pub timestamp: TInstant,
}

/// Which logic level counts as "pressed" for the wired input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    const fn is_active(self, level: bool) -> bool {
        match self {
            ActiveLevel::High => level,
            ActiveLevel::Low => !level,
        }
    }
}

/// Filters raw level samples into clean press/release edges.
pub struct Debouncer<TInstant>
where
    TInstant: Copy,
{
    window: Duration,
    active: ActiveLevel,
    last_accepted_level: Option<bool>,
    last_accepted_at: Option<TInstant>,
}

impl<TInstant> Debouncer<TInstant>
where
    TInstant: MonotonicInstant,
{
    /// Creates a debouncer with the given window and wiring polarity.
    #[must_use]
    pub const fn new(window: Duration, active: ActiveLevel) -> Self {
        Self {
            window,
            active,
            last_accepted_level: None,
            last_accepted_at: None,
        }
    }

    /// Returns the configured debounce window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Feeds one raw level sample, returning a validated edge if accepted.
    ///
    /// The very first sample establishes the idle baseline: it seeds the
    /// accepted level and timestamp but produces no event, so a bounce
    /// arriving within the window of power-up is rejected like any other.
    pub fn sample(&mut self, level: bool, now: TInstant) -> Option<EdgeEvent<TInstant>> {
        let Some(previous) = self.last_accepted_level else {
            self.last_accepted_level = Some(level);
            self.last_accepted_at = Some(now);
            return None;
        };

        if level == previous {
            return None;
        }

        if let Some(accepted_at) = self.last_accepted_at
            && now.duration_since(accepted_at) <= self.window
        {
            return None;
        }

        self.last_accepted_level = Some(level);
        self.last_accepted_at = Some(now);

        let kind = if self.active.is_active(level) {
            EdgeKind::Press
        } else {
            EdgeKind::Release
        };

        Some(EdgeEvent {
            kind,
            timestamp: now,
        })
    }

    /// Forgets all accepted-level memory, as if freshly constructed.
    pub fn reset(&mut self) {
        self.last_accepted_level = None;
        self.last_accepted_at = None;
    }
}
