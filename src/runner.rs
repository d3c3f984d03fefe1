//! External command launching.
//!
//! Two launch modes exist: fire-and-forget for the record/stop scripts, and
//! a blocking shell run used by the replay background task. Children get
//! null stdio on all three streams so nothing they print can reach the
//! terminal the UI owns. Fire-and-forget children are abandoned on purpose;
//! no handle is kept and the runtime reaps them when they exit.

use std::process::{ExitStatus, Stdio};

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::events::Event;

/// Starts a command line in the background and abandons it.
///
/// The command line is split shell-style into program and arguments and
/// spawned directly, without a shell. Returns as soon as the child exists;
/// its exit is never observed and its exit code is never inspected.
pub fn launch_detached(command_line: &str) -> Result<()> {
    let mut parts = shell_words::split(command_line)
        .with_context(|| format!("failed to parse command '{}'", command_line))?;
    if parts.is_empty() {
        bail!("empty command");
    }
    let program = parts.remove(0);
    Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start '{}'", command_line))?;
    Ok(())
}

/// Runs one command through the shell and waits for it to exit.
pub async fn run_via_shell(shell: &str, command: &str) -> Result<ExitStatus> {
    let status = Command::new(shell)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .with_context(|| format!("failed to run '{}' via {}", command, shell))?;
    Ok(status)
}

/// The replay background task.
///
/// Runs the rendered replay command to completion (the configured grace
/// delay is part of the command itself), then delivers exactly one
/// completion event carrying the recording's name. The exit code is not
/// inspected; a replay that exits non-zero still counts as finished.
///
/// This task never touches UI state. Failures in here go to stderr only;
/// the log stays quiet.
pub async fn run_replay(shell: String, command: String, name: String, tx: mpsc::Sender<Event>) {
    if let Err(err) = run_via_shell(&shell, &command).await {
        eprintln!("replay task for {} failed: {:#}", name, err);
        return;
    }
    if let Err(err) = tx.send(Event::ReplayFinished { name }).await {
        eprintln!("replay completion dropped: {}", err);
    }
}
