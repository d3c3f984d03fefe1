//! Macrodeck: a TUI front end for recording and replaying desktop input macros.
//!
//! This is the entry point of the application. It parses command-line
//! arguments, loads configuration, and runs the main event loop that owns
//! every piece of UI state. Background replay tasks talk back to this loop
//! through the event channel only.

mod app;
mod config;
mod events;
mod log;
mod runner;
mod store;
mod tui;
mod watch;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::Parser;
use tokio::sync::mpsc;

use crate::app::{App, AppAction};
use crate::events::Event;

/// Command-line interface definition.
#[derive(Debug, Parser)]
#[command(
    name = "macrodeck",
    version,
    about = "Record and replay desktop input macros with a TUI",
    styles = help_styles(),
    color = clap::ColorChoice::Always
)]
struct Cli {
    /// Path to macrodeck.toml configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory holding the recordings (overrides the config file).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match config_path(&cli) {
        Some(path) => config::load_config(&path)?,
        None => config::Config::default(),
    };
    let settings = config::Settings::resolve(config, cli.dir);

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let mut app = App::new(settings, event_tx.clone());

    let mut terminal = tui::init_terminal()?;

    spawn_input_listener(event_tx.clone());
    spawn_signal_listener(event_tx.clone());
    watch::spawn_store_watcher(
        app.settings.recordings_dir.clone(),
        app.settings.suffix.clone(),
        event_tx.clone(),
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(150));
    let mut result = Ok(());

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                match event {
                    Event::Key(key) => {
                        let action = app.handle_key(key);
                        handle_app_action(action, &mut app);
                    }
                    Event::Resize { width, height } => {
                        let _ = (width, height);
                        let _ = terminal.autoresize();
                    }
                    Event::ReplayFinished { name } => app.on_replay_finished(&name),
                    Event::RecordingsChanged => app.on_recordings_changed(),
                    Event::Shutdown => app.should_quit = true,
                }
            }
            // Periodic redraw so transient status messages expire on screen.
            _ = ticker.tick() => {}
        }

        if let Err(err) = tui::draw(&mut app, &mut terminal) {
            result = Err(err.into());
            break;
        }
        if app.should_quit {
            break;
        }
    }

    tui::restore_terminal(terminal)?;
    result
}

fn handle_app_action(action: AppAction, app: &mut App) {
    match action {
        AppAction::Quit => app.should_quit = true,
        AppAction::StartRecording => app.start_recording(),
        AppAction::StopRecording => app.stop_recording(),
        AppAction::ShowRecordings => app.show_recordings(),
        AppAction::RequestDelete => app.request_delete(),
        AppAction::ConfirmDelete => app.confirm_delete(),
        AppAction::Replay => app.replay_selected(),
        AppAction::CopyPath => app.copy_selected_path(),
        AppAction::None => {}
    }
}

fn spawn_input_listener(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || loop {
        if crossterm::event::poll(Duration::from_millis(100)).unwrap_or(false) {
            match crossterm::event::read() {
                Ok(crossterm::event::Event::Key(key)) => {
                    let _ = tx.blocking_send(Event::Key(key));
                }
                Ok(crossterm::event::Event::Resize(width, height)) => {
                    let _ = tx.blocking_send(Event::Resize { width, height });
                }
                _ => {}
            }
        }
    });
}

fn spawn_signal_listener(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(signal) => signal,
                Err(_) => return,
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
            let _ = tx.send(Event::Shutdown).await;
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            let _ = tx.send(Event::Shutdown).await;
        }
    });
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(default_config_path)
}

fn default_config_path() -> Option<PathBuf> {
    let path = Path::new("macrodeck.toml");
    if path.exists() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

fn help_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Green.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Green.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Cyan.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::Magenta.into())))
        .invalid(
            Style::new()
                .fg_color(Some(AnsiColor::Red.into()))
                .effects(Effects::BOLD),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_overrides() {
        let cli = Cli::parse_from(["macrodeck", "--config", "custom.toml", "--dir", "/tmp/recs"]);
        assert_eq!(cli.config.as_deref(), Some(Path::new("custom.toml")));
        assert_eq!(cli.dir.as_deref(), Some(Path::new("/tmp/recs")));
    }

    #[test]
    fn cli_defaults_to_no_overrides() {
        let cli = Cli::parse_from(["macrodeck"]);
        assert!(cli.config.is_none());
        assert!(cli.dir.is_none());
    }
}
