//! Terminal presentation of the indicator

use crate::errors::Result;
use crate::modes::{self, Mode};
use crate::runner::CommandRunner;
use crate::session::{Notifier, Session};
use crate::settings::{self, SettingsStore, REFRESH_SECONDS_KEY};
use crate::state::{DisplayState, FanState};
use log::info;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::io;
use std::rc::Rc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints notifications as one line on a terminal stream
pub struct ConsoleNotifier<W> {
    out: RefCell<W>,
}

impl ConsoleNotifier<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: io::Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: io::Write> Notifier for ConsoleNotifier<W> {
    fn notify(&self, title: &str, body: &str) {
        let line = format!("*** {} - {}\n", title, body);
        let _ = self.out.borrow_mut().write_all(line.as_bytes());
    }
}

/// A line typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Select(&'static Mode),
    Interval(u32),
    Menu,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  <mode> | <number>   switch fan mode (see menu)
  interval <seconds>  seconds between speed checks (1-600)
  menu                show the menu
  help                show this help
  quit                exit";

/// Parse one input line. `Err` carries a message for the user.
pub fn parse_command(line: &str) -> std::result::Result<UserCommand, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(UserCommand::Menu);
    };

    match (first, words.next()) {
        ("quit" | "q" | "exit", None) => Ok(UserCommand::Quit),
        ("help" | "h" | "?", None) => Ok(UserCommand::Help),
        ("menu" | "m", None) => Ok(UserCommand::Menu),
        ("interval", Some(value)) => {
            let seconds: i64 = value
                .parse()
                .map_err(|_| format!("not a number: {}", value))?;
            settings::validate(REFRESH_SECONDS_KEY, seconds).map_err(|e| e.to_string())?;
            Ok(UserCommand::Interval(seconds as u32))
        }
        (word, None) => mode_from_word(word)
            .map(UserCommand::Select)
            .ok_or_else(|| format!("unknown mode or command: {}", word)),
        _ => Err(format!("unrecognized input: {}", line.trim())),
    }
}

/// Resolve a mode id or a 1-based menu position
fn mode_from_word(word: &str) -> Option<&'static Mode> {
    if let Ok(position) = word.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| modes::all_modes().get(index));
    }
    modes::find_by_id(word)
}

fn speed_label(state: &FanState) -> String {
    match state.speed_rpm {
        Some(rpm) => format!("Speed: {} rpm.", rpm),
        None => "loading...".to_string(),
    }
}

/// One-line summary printed on every state change
pub fn render_status(state: &FanState) -> String {
    let display = state.display_state();
    let mode = match display {
        DisplayState::Normal(Some(mode)) => mode.display_name(),
        DisplayState::Normal(None) => "unknown mode",
        DisplayState::Unavailable => "fw-fanctrl missing",
    };
    format!("[{}] {} | {}", display.icon_name(), mode, speed_label(state))
}

/// The full indicator menu
pub fn render_menu(state: &FanState) -> String {
    let mut menu = String::new();
    let _ = writeln!(menu, "{}", speed_label(state));
    let _ = writeln!(menu, "----------------");

    match state.display_state() {
        DisplayState::Unavailable => {
            let _ = writeln!(menu, "  fw-fanctrl is not installed");
        }
        DisplayState::Normal(current) => {
            for (index, mode) in modes::all_modes().iter().enumerate() {
                let marker = if current.is_some_and(|c| std::ptr::eq(c, mode)) {
                    '•'
                } else {
                    ' '
                };
                let _ = writeln!(menu, "{} {}. {}", marker, index + 1, mode.display_name());
            }
        }
    }

    let _ = writeln!(menu, "  Settings: interval <seconds>");
    menu
}

/// Run the interactive indicator until quit, EOF or Ctrl-C
pub async fn run(
    runner: Rc<dyn CommandRunner>,
    settings: Rc<dyn SettingsStore>,
) -> Result<()> {
    let notifier = Rc::new(ConsoleNotifier::stderr());
    let mut session = Session::activate(runner, Rc::clone(&settings), notifier);
    let mut revisions = session.tracker().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", render_menu(&session.tracker().snapshot()));
    println!("{}", HELP);

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                revisions.borrow_and_update();
                if session.is_alive() {
                    println!("{}", render_status(&session.tracker().snapshot()));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(UserCommand::Select(mode)) => session.select_mode(mode),
                    Ok(UserCommand::Interval(seconds)) => {
                        match settings.set_int(REFRESH_SECONDS_KEY, seconds.into()) {
                            Ok(()) => println!("Refresh interval set to {}s", seconds),
                            Err(e) => eprintln!("Failed to save interval: {}", e),
                        }
                    }
                    Ok(UserCommand::Menu) => print!("{}", render_menu(&session.tracker().snapshot())),
                    Ok(UserCommand::Help) => println!("{}", HELP),
                    Ok(UserCommand::Quit) => break,
                    Err(message) => eprintln!("{}", message),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    session.deactivate();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::find_by_id;
    use crate::session::{MISSING_TOOL_BODY, MISSING_TOOL_TITLE};

    #[test]
    fn test_parse_mode_by_id_and_position() {
        assert_eq!(
            parse_command("lazy"),
            Ok(UserCommand::Select(find_by_id("lazy").unwrap()))
        );
        assert_eq!(
            parse_command(" 7 "),
            Ok(UserCommand::Select(find_by_id("aeolus").unwrap()))
        );
        assert!(parse_command("0").is_err());
        assert!(parse_command("8").is_err());
        assert!(parse_command("Lazy").is_err());
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_command("interval 10"), Ok(UserCommand::Interval(10)));
        assert!(parse_command("interval 0").is_err());
        assert!(parse_command("interval 601").is_err());
        assert!(parse_command("interval soon").is_err());
        assert!(parse_command("interval").is_err());
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command(""), Ok(UserCommand::Menu));
        assert_eq!(parse_command("menu"), Ok(UserCommand::Menu));
        assert_eq!(parse_command("help"), Ok(UserCommand::Help));
        assert_eq!(parse_command("quit"), Ok(UserCommand::Quit));
        assert!(parse_command("quit now").is_err());
    }

    #[test]
    fn test_menu_marks_current_mode() {
        let state = FanState {
            current_mode: find_by_id("medium"),
            speed_rpm: Some(1500),
            tool_available: true,
        };
        let menu = render_menu(&state);
        let lines: Vec<&str> = menu.lines().collect();
        assert_eq!(lines[0], "Speed: 1500 rpm.");
        assert_eq!(lines[2], "  1. Super Quiet");
        assert_eq!(lines[4], "• 3. Normal");
        assert_eq!(lines.len(), 2 + modes::all_modes().len() + 1);
    }

    #[test]
    fn test_menu_when_tool_missing() {
        let state = FanState {
            current_mode: find_by_id("medium"),
            speed_rpm: None,
            tool_available: false,
        };
        let menu = render_menu(&state);
        assert!(menu.starts_with("loading...\n"));
        assert!(menu.contains("fw-fanctrl is not installed"));
        assert!(!menu.contains("Normal"));
    }

    #[test]
    fn test_status_line() {
        let mut state = FanState::default();
        assert_eq!(
            render_status(&state),
            "[network-cellular-connected-symbolic] unknown mode | loading..."
        );

        state.current_mode = find_by_id("deaf");
        state.speed_rpm = Some(4100);
        assert_eq!(
            render_status(&state),
            "[network-cellular-acquiring-symbolic] Super Fan | Speed: 4100 rpm."
        );

        state.tool_available = false;
        assert!(render_status(&state).starts_with("[software-update-urgent-symbolic]"));
    }

    #[test]
    fn test_notification_printed_once() {
        let notifier = ConsoleNotifier::new(Vec::new());
        notifier.notify(MISSING_TOOL_TITLE, MISSING_TOOL_BODY);
        let text = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(
            text,
            "*** Fan Speed not working - You don't have fw-fanctrl installed!\n"
        );
    }
}
