//! User-initiated mode switches

use crate::modes::Mode;
use crate::protocol;
use crate::runner::CommandRunner;
use crate::state::FanStateTracker;
use log::{debug, error, info, warn};
use std::rc::Rc;

/// Applies mode changes requested from the menu.
///
/// Switching is fire-and-forget: the tracker shows the new mode at once and
/// the outcome of `fw-fanctrl <mode>` is only logged. A failed switch is
/// never rolled back. If the executable cannot be started at all, the tool
/// is marked unavailable like a failed startup query would.
#[derive(Clone)]
pub struct ModeSwitchController {
    runner: Rc<dyn CommandRunner>,
    tracker: FanStateTracker,
}

impl ModeSwitchController {
    pub fn new(runner: Rc<dyn CommandRunner>, tracker: FanStateTracker) -> Self {
        Self { runner, tracker }
    }

    /// Must be called from inside a `tokio::task::LocalSet`
    pub fn select_mode(&self, mode: &'static Mode) {
        info!("Switching fan mode to {}", mode.id());
        self.tracker.set_mode_optimistically(mode);

        let pending = self.runner.run(&protocol::mode_set_argv(mode.id()), None);
        let tracker = self.tracker.clone();
        tokio::task::spawn_local(async move {
            match pending.await {
                Ok(_) => debug!("{} accepted mode {}", protocol::FANCTRL_BIN, mode.id()),
                Err(e) if e.is_spawn_failure() => {
                    error!("Failed to set fan mode {}: {}", mode.id(), e);
                    tracker.record_tool_missing();
                }
                Err(e) => warn!("Failed to set fan mode {}: {}", mode.id(), e),
            }
        });
    }
}
