//! Fan state tracking and change notification

use crate::modes::{self, Mode};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::watch;

/// Icon shown before any mode is known
pub const DEFAULT_ICON: &str = "network-cellular-connected-symbolic";
/// Icon shown once fw-fanctrl turned out to be missing
pub const UNAVAILABLE_ICON: &str = "software-update-urgent-symbolic";

/// Locally cached view of the fan tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanState {
    pub current_mode: Option<&'static Mode>,
    pub speed_rpm: Option<u32>,
    pub tool_available: bool,
}

impl Default for FanState {
    fn default() -> Self {
        Self {
            current_mode: None,
            speed_rpm: None,
            tool_available: true,
        }
    }
}

impl FanState {
    pub fn display_state(&self) -> DisplayState {
        if self.tool_available {
            DisplayState::Normal(self.current_mode)
        } else {
            DisplayState::Unavailable
        }
    }
}

/// What the indicator should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// Tool present; mode is `None` until the first query resolves
    Normal(Option<&'static Mode>),
    /// fw-fanctrl could not be run during this session
    Unavailable,
}

impl DisplayState {
    pub fn icon_name(&self) -> &'static str {
        match self {
            DisplayState::Normal(Some(mode)) => mode.icon(),
            DisplayState::Normal(None) => DEFAULT_ICON,
            DisplayState::Unavailable => UNAVAILABLE_ICON,
        }
    }
}

/// Sole owner of the session's [`FanState`].
///
/// Cloning yields another handle to the same state. Every mutation bumps a
/// revision number on a watch channel; listeners re-read [`snapshot`]
/// instead of relying on the revision value.
///
/// [`snapshot`]: FanStateTracker::snapshot
#[derive(Clone)]
pub struct FanStateTracker {
    state: Rc<RefCell<FanState>>,
    revision: Rc<watch::Sender<u64>>,
}

impl Default for FanStateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl FanStateTracker {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Rc::new(RefCell::new(FanState::default())),
            revision: Rc::new(revision),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> FanState {
        *self.state.borrow()
    }

    pub fn display_state(&self) -> DisplayState {
        self.state.borrow().display_state()
    }

    /// Receiver that wakes after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of published mutations so far
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Apply a mode id reported by `fw-fanctrl -q`.
    ///
    /// Unknown ids leave the current mode untouched.
    pub fn record_queried_mode(&self, raw_id: &str) {
        match modes::find_by_id(raw_id) {
            Some(mode) => {
                debug!("Queried mode: {}", mode.id());
                self.update(|state| state.current_mode = Some(mode));
            }
            None => warn!("Ignoring unknown fan mode {:?}", raw_id),
        }
    }

    pub fn record_speed(&self, rpm: u32) {
        self.update(|state| state.speed_rpm = Some(rpm));
    }

    /// Mark fw-fanctrl as missing for the rest of the session
    pub fn record_tool_missing(&self) {
        if !self.state.borrow().tool_available {
            return;
        }
        info!("{} marked unavailable", crate::protocol::FANCTRL_BIN);
        self.update(|state| state.tool_available = false);
    }

    /// Show a user-requested mode before fw-fanctrl has confirmed it.
    ///
    /// Never rolled back, even if the switch command fails later.
    pub fn set_mode_optimistically(&self, mode: &'static Mode) {
        self.update(|state| state.current_mode = Some(mode));
    }

    fn update(&self, mutate: impl FnOnce(&mut FanState)) {
        mutate(&mut *self.state.borrow_mut());
        self.revision.send_modify(|revision| *revision += 1);
    }
}
