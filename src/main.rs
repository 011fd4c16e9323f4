//! Main entry point for the fan control indicator

use anyhow::{bail, Context};
use clap::Parser;
use fanctrl_indicator::{
    args::{Args, Commands},
    console, logging, modes, protocol,
    runner::CommandRunner,
    scheduler, startup,
    settings::{JsonSettings, SettingsStore, REFRESH_SECONDS_KEY},
    SystemRunner,
};
use std::rc::Rc;
use tokio::task::LocalSet;
use tokio_util::sync::CancellationToken;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::setup(args.verbose).context("failed to set up logging")?;

    // Build metadata for binary identity verification
    log::info!(
        "fanctrl-indicator v{} (git {} / {}) built {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("unknown"),
        option_env!("GIT_DESC").unwrap_or("unknown"),
        option_env!("BUILD_TIME").unwrap_or("unknown")
    );

    let settings = Rc::new(JsonSettings::new(
        args.settings.clone().unwrap_or_else(JsonSettings::default_path),
    ));
    log::debug!("Using settings at {}", settings.path().display());
    let runner: Rc<dyn CommandRunner> = Rc::new(SystemRunner::new());

    match args.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            LocalSet::new()
                .run_until(console::run(runner, settings))
                .await?;
        }
        Commands::Modes => {
            for mode in modes::all_modes() {
                println!("{:<12} {}", mode.id(), mode.display_name());
            }
        }
        Commands::Status => print_status(&*runner).await,
        Commands::Set { mode } => {
            let Some(mode) = modes::find_by_id(&mode) else {
                bail!("unknown mode {:?}; run `fanctrl-indicator modes`", mode);
            };
            runner
                .run(&protocol::mode_set_argv(mode.id()), None)
                .await
                .with_context(|| format!("failed to switch to {}", mode.id()))?;
            println!("Fan mode set to {}", mode.display_name());
        }
        Commands::Interval { seconds } => {
            settings
                .set_int(REFRESH_SECONDS_KEY, seconds)
                .context("failed to store refresh interval")?;
            println!("Refresh interval set to {}s", seconds);
        }
    }

    Ok(())
}

async fn print_status(runner: &dyn CommandRunner) {
    let cancel = CancellationToken::new();

    match startup::query_mode(runner, &cancel).await {
        Ok(raw_id) => match modes::find_by_id(&raw_id) {
            Some(mode) => println!("Mode:  {} ({})", mode.display_name(), mode.id()),
            None => println!("Mode:  unrecognized {:?}", raw_id),
        },
        Err(e) => println!("Mode:  unavailable ({})", e),
    }

    match scheduler::query_speed(runner, &cancel).await {
        Ok(rpm) => println!("Speed: {} rpm", rpm),
        Err(e) => println!("Speed: unavailable ({})", e),
    }
}
