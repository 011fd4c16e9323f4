//! Root object owning one activation of the indicator

use crate::controller::ModeSwitchController;
use crate::modes::Mode;
use crate::runner::CommandRunner;
use crate::scheduler::{PollContext, PollingScheduler, SchedulerState};
use crate::settings::{PollConfig, SettingsStore};
use crate::startup::{self, StartupOutcome};
use crate::state::FanStateTracker;
use log::{debug, info};
use std::cell::Cell;
use std::rc::Rc;
use tokio_util::sync::CancellationToken;

pub const MISSING_TOOL_TITLE: &str = "Fan Speed not working";
pub const MISSING_TOOL_BODY: &str = "You don't have fw-fanctrl installed!";

/// Presents user-facing notifications
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// Shared flag telling late async results whether the session still exists
#[derive(Debug, Clone)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    fn kill(&self) {
        self.0.set(false);
    }
}

/// Everything that lives between activation and deactivation: the fan
/// state, the poll timer and the mode switch controller.
///
/// Must be created inside a `tokio::task::LocalSet`.
pub struct Session {
    tracker: FanStateTracker,
    controller: ModeSwitchController,
    scheduler: PollingScheduler,
    liveness: Liveness,
    cancel: CancellationToken,
}

impl Session {
    /// Start polling and reconcile the current mode in the background.
    ///
    /// If fw-fanctrl cannot be queried, `notifier` is told exactly once.
    pub fn activate(
        runner: Rc<dyn CommandRunner>,
        settings: Rc<dyn SettingsStore>,
        notifier: Rc<dyn Notifier>,
    ) -> Self {
        let tracker = FanStateTracker::new();
        let liveness = Liveness::new();
        let cancel = CancellationToken::new();
        let config = PollConfig::load_or_default(&*settings);

        let controller = ModeSwitchController::new(Rc::clone(&runner), tracker.clone());
        let scheduler = PollingScheduler::new(PollContext {
            runner: Rc::clone(&runner),
            tracker: tracker.clone(),
            settings,
            cancel: cancel.clone(),
        });

        info!("Activating fan control session");
        spawn_reconciliation(runner, tracker.clone(), notifier, liveness.clone(), cancel.clone());
        scheduler.start(config.interval_secs);

        Self {
            tracker,
            controller,
            scheduler,
            liveness,
            cancel,
        }
    }

    pub fn tracker(&self) -> &FanStateTracker {
        &self.tracker
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Switch modes; see [`ModeSwitchController::select_mode`]
    pub fn select_mode(&self, mode: &'static Mode) {
        self.controller.select_mode(mode);
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Handle for tasks that may outlive the session
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Stop polling and abandon pending queries. Idempotent.
    pub fn deactivate(&mut self) {
        if !self.liveness.is_alive() {
            return;
        }
        info!("Deactivating fan control session");
        self.scheduler.stop();
        self.cancel.cancel();
        self.liveness.kill();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.deactivate();
    }
}

fn spawn_reconciliation(
    runner: Rc<dyn CommandRunner>,
    tracker: FanStateTracker,
    notifier: Rc<dyn Notifier>,
    liveness: Liveness,
    cancel: CancellationToken,
) {
    tokio::task::spawn_local(async move {
        let outcome = startup::reconcile(&*runner, &tracker, &cancel).await;
        match outcome {
            StartupOutcome::ToolMissing if liveness.is_alive() => {
                notifier.notify(MISSING_TOOL_TITLE, MISSING_TOOL_BODY);
            }
            outcome => debug!("Startup reconciliation finished: {:?}", outcome),
        }
    });
}
