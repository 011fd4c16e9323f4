//! Repeating fan speed poll with a live-reconfigurable interval

use crate::errors::{FanCtrlError, Result};
use crate::protocol;
use crate::runner::{run_cancellable, CommandRunner};
use crate::settings::{PollConfig, SettingsStore};
use crate::state::FanStateTracker;
use log::{debug, info, trace, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Query `ectool` once and parse the fan RPM
pub async fn query_speed(runner: &dyn CommandRunner, cancel: &CancellationToken) -> Result<u32> {
    let output = run_cancellable(runner, &protocol::speed_query_argv(), None, cancel).await?;
    protocol::parse_speed(&output)
}

/// Collaborators a tick needs
pub struct PollContext {
    pub runner: Rc<dyn CommandRunner>,
    pub tracker: FanStateTracker,
    pub settings: Rc<dyn SettingsStore>,
    /// Fires on session teardown; pending speed queries stop waiting
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running { interval_secs: u32 },
}

struct Timer {
    handle: JoinHandle<()>,
    interval_secs: u32,
}

struct Inner {
    context: PollContext,
    timer: RefCell<Option<Timer>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get_mut().take() {
            timer.handle.abort();
        }
    }
}

/// Owner of the single polling timer.
///
/// Must be used from inside a `tokio::task::LocalSet`. At most one timer
/// task is alive at any moment: `start` always aborts the previous one.
#[derive(Clone)]
pub struct PollingScheduler {
    inner: Rc<Inner>,
}

impl PollingScheduler {
    pub fn new(context: PollContext) -> Self {
        Self {
            inner: Rc::new(Inner {
                context,
                timer: RefCell::new(None),
            }),
        }
    }

    pub fn state(&self) -> SchedulerState {
        match self.inner.timer.borrow().as_ref() {
            Some(timer) => SchedulerState::Running {
                interval_secs: timer.interval_secs,
            },
            None => SchedulerState::Stopped,
        }
    }

    /// (Re)start polling every `interval_secs` seconds; the first tick
    /// fires one full interval from now.
    pub fn start(&self, interval_secs: u32) {
        self.stop();

        let interval_secs = interval_secs.max(1);
        let handle = tokio::task::spawn_local(run_timer(Rc::downgrade(&self.inner), interval_secs));
        *self.inner.timer.borrow_mut() = Some(Timer {
            handle,
            interval_secs,
        });
        info!("Polling fan speed every {}s", interval_secs);
    }

    /// Cancel the repeating trigger. Queries already dispatched keep running.
    pub fn stop(&self) {
        if let Some(timer) = self.inner.timer.borrow_mut().take() {
            timer.handle.abort();
            debug!("Stopped {}s poll timer", timer.interval_secs);
        }
    }

    /// One timer firing. Returns false when this timer has been replaced.
    fn tick(&self, interval_secs: u32) -> bool {
        trace!("Poll tick ({}s)", interval_secs);
        self.dispatch_speed_query();

        match PollConfig::load(&*self.inner.context.settings) {
            Ok(PollConfig { interval_secs: configured }) if configured != interval_secs => {
                info!(
                    "Refresh interval changed from {}s to {}s",
                    interval_secs, configured
                );
                self.start(configured);
                false
            }
            Ok(_) => true,
            Err(e) => {
                warn!("Keeping {}s poll interval, settings unreadable: {}", interval_secs, e);
                true
            }
        }
    }

    fn dispatch_speed_query(&self) {
        let context = &self.inner.context;
        let runner = Rc::clone(&context.runner);
        let tracker = context.tracker.clone();
        let cancel = context.cancel.clone();

        // Detached from the timer task so a restart never drops the result
        tokio::task::spawn_local(async move {
            match query_speed(&*runner, &cancel).await {
                Ok(rpm) => tracker.record_speed(rpm),
                Err(FanCtrlError::Cancelled) => debug!("Fan speed query abandoned"),
                Err(e) => warn!("Fan speed query failed: {}", e),
            }
        });
    }
}

async fn run_timer(inner: Weak<Inner>, interval_secs: u32) {
    let period = Duration::from_secs(interval_secs.into());
    let mut ticks = time::interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticks.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !(PollingScheduler { inner }).tick(interval_secs) {
            break;
        }
    }
}
