use crate::clock::SystemClock;
use crate::commands::{dispatch, parse_command, CommandReply};
use crate::config::{default_config_path, TrackerConfig};
use crate::data_manager::DataManager;
use crate::events::SessionUpdate;
use crate::logging::init_logging;
use crate::session_tracker::WorkoutSessionTracker;
use crate::tick_scheduler::IntervalScheduler;
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

#[derive(Debug, Parser)]
#[command(
    name = "workout-session",
    version,
    about = "Track an in-progress workout across pauses and restarts"
)]
pub struct Cli {
    /// Path to config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the active session record
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Host event loop: stdin commands and scheduler ticks are serialized onto
/// this task, which is the only one touching the tracker.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = TrackerConfig::load(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    init_logging(level);

    let store = DataManager::new(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
    let (tick_tx, mut ticks) = mpsc::unbounded_channel();
    let scheduler = IntervalScheduler::new(Handle::current(), tick_tx);
    let (mut tracker, outcome) = WorkoutSessionTracker::open_observed(
        store,
        SystemClock,
        scheduler,
        config.settings(),
        |update: &SessionUpdate| print_json(update),
    );
    tracing::info!(?outcome, data_dir = %config.data_dir.display(), "ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(err) if err.is_recoverable() => {
                        tracing::warn!(error = %err, "ignoring input");
                        continue;
                    }
                    Err(err) => return Err(err.into()),
                };
                match dispatch(&mut tracker, command) {
                    CommandReply::Quit => break,
                    CommandReply::Finished(Some(summary)) => print_json(&summary),
                    CommandReply::Status(state) => print_json(&state),
                    CommandReply::Finished(None)
                    | CommandReply::Discarded(_)
                    | CommandReply::Done => {}
                }
            }
            Some(tick) = ticks.recv() => tracker.on_tick(tick),
        }
    }

    tracing::debug!("input closed, leaving session on disk");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::warn!(error = %err, "failed to encode output"),
    }
}
