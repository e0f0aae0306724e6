//! Test scheduling queue shared between boot wiring and the session task.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::channel::{Channel, Receiver};
use testrig_core::plans::TestKind;

/// Depth of the queue of pending test kinds.
pub const TEST_QUEUE_DEPTH: usize = 4;

#[cfg(target_os = "none")]
type RigMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type RigMutex = NoopRawMutex;

/// Queue of tests waiting for the session task.
pub type TestQueue = Channel<RigMutex, TestKind, TEST_QUEUE_DEPTH>;

/// Convenience receiver type alias for the test queue.
pub type TestReceiver<'a> = Receiver<'a, RigMutex, TestKind, TEST_QUEUE_DEPTH>;
