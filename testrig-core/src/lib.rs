#![no_std]

// Shared validation-engine logic for the test rig feature set.
//
// This crate stays portable across MCU firmware and host tooling by avoiding
// the Rust standard library and exposing abstractions the other crates can
// adopt.

pub mod bridge;
pub mod debounce;
pub mod phase;
pub mod plans;
pub mod report;
pub mod session;
pub mod stats;
pub mod time;
