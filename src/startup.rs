//! One-shot reconciliation with fw-fanctrl when a session starts

use crate::errors::{FanCtrlError, Result};
use crate::protocol;
use crate::runner::{run_cancellable, CommandRunner};
use crate::state::FanStateTracker;
use log::{debug, error};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupOutcome {
    /// fw-fanctrl answered; the mode was applied if it is a known one
    Reconciled,
    /// fw-fanctrl could not be queried and is now marked unavailable
    ToolMissing,
    /// The session ended before an answer arrived
    Abandoned,
}

/// Ask fw-fanctrl for the active mode, returning the raw id
pub async fn query_mode(runner: &dyn CommandRunner, cancel: &CancellationToken) -> Result<String> {
    let output = run_cancellable(runner, &protocol::mode_query_argv(), None, cancel).await?;
    Ok(protocol::parse_mode_id(&output).to_string())
}

/// Seed the tracker from fw-fanctrl's reported mode.
///
/// Any failure other than cancellation marks the tool as missing.
pub async fn reconcile(
    runner: &dyn CommandRunner,
    tracker: &FanStateTracker,
    cancel: &CancellationToken,
) -> StartupOutcome {
    match query_mode(runner, cancel).await {
        Ok(raw_id) => {
            debug!("{} reports mode {:?}", protocol::FANCTRL_BIN, raw_id);
            tracker.record_queried_mode(&raw_id);
            StartupOutcome::Reconciled
        }
        Err(FanCtrlError::Cancelled) => StartupOutcome::Abandoned,
        Err(e) => {
            error!("{} is not installed: {}", protocol::FANCTRL_BIN, e);
            tracker.record_tool_missing();
            StartupOutcome::ToolMissing
        }
    }
}
