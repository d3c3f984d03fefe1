//! Recordings-directory watching.
//!
//! A dedicated thread watches the recordings directory and nudges the UI
//! loop whenever recordings appear or disappear, so an already-visible list
//! stays fresh without manual refreshes. The thread is best-effort: if the
//! watcher cannot be set up it reports to stderr and dies, and the rest of
//! the program keeps working with manual listing only.

use std::path::{Path, PathBuf};
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::events::Event;

const DEBOUNCE: Duration = Duration::from_millis(200);

/// Spawns the watcher thread for the recordings directory.
pub fn spawn_store_watcher(dir: PathBuf, suffix: String, tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || {
        if let Err(err) = watch_store(&dir, &suffix, tx) {
            eprintln!("watcher for {} failed: {}", dir.display(), err);
        }
    });
}

fn watch_store(dir: &Path, suffix: &str, tx: mpsc::Sender<Event>) -> Result<()> {
    let (raw_tx, raw_rx) = std::sync::mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = raw_tx.send(res);
        },
        notify::Config::default(),
    )
    .context("failed to create watcher")?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;

    loop {
        let event = match raw_rx.recv() {
            Ok(res) => res,
            Err(_) => break,
        };
        if !is_relevant(&event, suffix) {
            continue;
        }

        // A recorder writing a file emits several events; wait for quiet.
        let mut last = Instant::now();
        loop {
            let elapsed = last.elapsed();
            if elapsed >= DEBOUNCE {
                break;
            }
            match raw_rx.recv_timeout(DEBOUNCE - elapsed) {
                Ok(res) => {
                    if is_relevant(&res, suffix) {
                        last = Instant::now();
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            }
        }

        if tx.blocking_send(Event::RecordingsChanged).is_err() {
            break;
        }
    }

    Ok(())
}

/// Whether a raw watcher notification concerns a recording.
///
/// Errors and path-less notifications count as relevant.
fn is_relevant(event: &notify::Result<NotifyEvent>, suffix: &str) -> bool {
    let Ok(event) = event else {
        return true;
    };
    if event.paths.is_empty() {
        return true;
    }
    event.paths.iter().any(|path| has_suffix(path, suffix))
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(suffix))
        .unwrap_or(false)
}
