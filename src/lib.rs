//! Fan Control Indicator
//!
//! Polls `fw-fanctrl` and `ectool` for the active cooling mode and fan
//! speed, and switches modes on request.
//!
//! All state lives in a single-threaded [`session::Session`]: a
//! [`scheduler::PollingScheduler`] feeds fan speeds into a
//! [`state::FanStateTracker`], and a [`controller::ModeSwitchController`]
//! applies user mode changes to the same tracker. Everything runs on one
//! `tokio` current-thread runtime inside a `LocalSet`.

pub mod args;
pub mod console;
pub mod controller;
pub mod errors;
pub mod logging;
pub mod modes;
pub mod protocol;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod startup;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use errors::{FanCtrlError, Result};
pub use modes::{all_modes, find_by_id, Mode};
pub use runner::{CommandRunner, SystemRunner};
pub use session::{Notifier, Session};
pub use state::{DisplayState, FanState, FanStateTracker};
