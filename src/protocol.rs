//! Command lines issued to the fan tools and parsing of their output
//!
//! Both tools are driven through their plain-text stdout. Parsing is
//! deliberately positional: the speed is always the fourth token of the
//! `ectool pwmgetfanrpm` output, the mode is the whole `fw-fanctrl -q` line.

use crate::errors::{FanCtrlError, Result};
use crate::runner::argv;

/// Executable that switches and reports fan modes
pub const FANCTRL_BIN: &str = "fw-fanctrl";

/// Position of the RPM value in the speed query output
const SPEED_TOKEN_INDEX: usize = 3;

/// `pkexec ectool pwmgetfanrpm`
pub fn speed_query_argv() -> Vec<String> {
    argv(&["pkexec", "ectool", "pwmgetfanrpm"])
}

/// `fw-fanctrl -q`
pub fn mode_query_argv() -> Vec<String> {
    argv(&[FANCTRL_BIN, "-q"])
}

/// `fw-fanctrl <mode>`
pub fn mode_set_argv(mode_id: &str) -> Vec<String> {
    argv(&[FANCTRL_BIN, mode_id])
}

/// Remove one trailing line terminator, if present
pub fn strip_newline(output: &str) -> &str {
    let output = output.strip_suffix('\n').unwrap_or(output);
    output.strip_suffix('\r').unwrap_or(output)
}

/// Extract the fan RPM from `ectool pwmgetfanrpm` output
pub fn parse_speed(output: &str) -> Result<u32> {
    let line = strip_newline(output);
    let token = line
        .split_whitespace()
        .nth(SPEED_TOKEN_INDEX)
        .ok_or_else(|| FanCtrlError::Parse(format!("no speed token in {:?}", line)))?;

    token
        .parse::<u32>()
        .map_err(|e| FanCtrlError::Parse(format!("invalid speed {:?}: {}", token, e)))
}

/// Extract the raw mode id from `fw-fanctrl -q` output
pub fn parse_mode_id(output: &str) -> &str {
    strip_newline(output)
}
