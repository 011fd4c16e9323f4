//! Command line argument parsing for the fan control indicator

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fan Control Indicator
///
/// Shows the fw-fanctrl mode and live fan speed, and switches modes.
#[derive(Parser, Debug)]
#[command(name = "fanctrl-indicator")]
#[command(about = "Status indicator for fw-fanctrl")]
#[command(version)]
pub struct Args {
    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (default: ~/.config/fanctrl-indicator/settings.json)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the interactive indicator (default)
    Run,
    /// List the available fan modes
    Modes,
    /// Print the current mode and fan speed once
    Status,
    /// Switch to a fan mode once
    Set {
        /// Mode id, e.g. "lazy"
        mode: String,
    },
    /// Store the number of seconds between speed checks
    Interval {
        /// Seconds between checks (1-600)
        seconds: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_command() {
        let args = Args::parse_from(["fanctrl-indicator"]);
        assert_eq!(args.command, None);
        assert_eq!(args.verbose, 0);
        assert_eq!(args.settings, None);
    }

    #[test]
    fn test_subcommands() {
        let args = Args::parse_from(["fanctrl-indicator", "-vv", "set", "deaf"]);
        assert_eq!(args.verbose, 2);
        assert_eq!(
            args.command,
            Some(Commands::Set {
                mode: "deaf".to_string()
            })
        );

        let args = Args::parse_from([
            "fanctrl-indicator",
            "interval",
            "30",
            "--settings",
            "/tmp/s.json",
        ]);
        assert_eq!(args.command, Some(Commands::Interval { seconds: 30 }));
        assert_eq!(args.settings, Some(PathBuf::from("/tmp/s.json")));
    }
}
