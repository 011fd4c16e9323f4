//! Asynchronous execution of external commands

use crate::errors::{FanCtrlError, Result};
use futures_util::future::LocalBoxFuture;
use log::debug;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Runs one external command and returns its captured standard output.
///
/// Implementations never panic on a failed command; every failure is a
/// rejected future. The returned text is raw: callers strip trailing
/// newlines themselves.
pub trait CommandRunner {
    fn run(&self, argv: &[String], input: Option<String>) -> LocalBoxFuture<'static, Result<String>>;
}

/// Runner backed by real OS processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], input: Option<String>) -> LocalBoxFuture<'static, Result<String>> {
        let argv = argv.to_vec();
        Box::pin(async move {
            let (program, args) = argv.split_first().ok_or_else(|| FanCtrlError::Spawn {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            })?;

            debug!("Running {:?}", argv);

            let mut command = Command::new(program);
            command
                .args(args)
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .stdin(if input.is_some() {
                    Stdio::piped()
                } else {
                    Stdio::null()
                });

            let mut child = command.spawn().map_err(|source| FanCtrlError::Spawn {
                program: program.clone(),
                source,
            })?;

            // Feed stdin while stdout drains, or a child echoing a large
            // input blocks on a full pipe.
            let stdin = child.stdin.take();
            let feed = async move {
                if let (Some(mut stdin), Some(input)) = (stdin, input) {
                    stdin.write_all(input.as_bytes()).await?;
                    // Dropping the handle closes the pipe.
                }
                Ok::<(), std::io::Error>(())
            };

            let ((), output) = tokio::try_join!(feed, child.wait_with_output())
                .map_err(FanCtrlError::Communication)?;

            if !output.status.success() {
                debug!("{} exited with {}", program, output.status);
            }

            String::from_utf8(output.stdout).map_err(|e| {
                FanCtrlError::Communication(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })
        })
    }
}

/// Run a command, giving up as soon as `cancel` fires.
///
/// Cancellation only stops the wait; the child process keeps running.
pub async fn run_cancellable(
    runner: &dyn CommandRunner,
    argv: &[String],
    input: Option<String>,
    cancel: &CancellationToken,
) -> Result<String> {
    let pending = runner.run(argv, input);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FanCtrlError::Cancelled),
        result = pending => result,
    }
}

/// Build an owned argv from string slices
pub fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeRunner;

    #[tokio::test]
    async fn test_captures_stdout() {
        let output = SystemRunner::new()
            .run(&argv(&["echo", "lazy"]), None)
            .await
            .unwrap();
        assert_eq!(output, "lazy\n");
    }

    #[tokio::test]
    async fn test_writes_input_to_stdin() {
        let output = SystemRunner::new()
            .run(&argv(&["cat"]), Some("foo bar baz 1234\n".to_string()))
            .await
            .unwrap();
        assert_eq!(output, "foo bar baz 1234\n");
    }

    #[tokio::test]
    async fn test_large_input_through_echoing_child() {
        let input = "x".repeat(1 << 20);
        let output = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            SystemRunner::new().run(&argv(&["cat"]), Some(input.clone())),
        )
        .await
        .expect("cat did not finish")
        .unwrap();
        assert_eq!(output.len(), input.len());
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn test_missing_executable_is_spawn_error() {
        let err = SystemRunner::new()
            .run(&argv(&["fanctrl-indicator-no-such-binary"]), None)
            .await
            .unwrap_err();
        assert!(err.is_spawn_failure());
    }

    #[tokio::test]
    async fn test_empty_argv_is_spawn_error() {
        let err = SystemRunner::new().run(&[], None).await.unwrap_err();
        assert!(err.is_spawn_failure());
    }

    #[tokio::test]
    async fn test_cancel_stops_waiting() {
        let runner = FakeRunner::new();
        let command = argv(&["pkexec", "ectool", "pwmgetfanrpm"]);
        runner.respond(&command, "Fan 0 RPM: 1200\n");
        let _gate = runner.gate(&command);

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = run_cancellable(&*runner, &command, None, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, FanCtrlError::Cancelled));
        assert_eq!(runner.call_count(&command), 1);
    }

    #[tokio::test]
    async fn test_uncancelled_run_returns_output() {
        let runner = FakeRunner::new();
        let command = argv(&["fw-fanctrl", "-q"]);
        runner.respond(&command, "medium\n");

        let cancel = CancellationToken::new();
        let output = run_cancellable(&*runner, &command, None, &cancel)
            .await
            .unwrap();
        assert_eq!(output, "medium\n");
    }
}
