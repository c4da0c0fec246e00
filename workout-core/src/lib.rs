#![no_std]

// Core logic for the interval workout timer.
//
// Everything here avoids the Rust standard library so the engine can sit
// behind any tick source, such as a host terminal or a test harness.

pub mod engine;
pub mod repl;
pub mod session;
pub mod telemetry;
pub mod workouts;
