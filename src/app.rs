//! Application state and UI logic.
//!
//! This module holds the core `App` struct: the append-only log, the
//! recordings list with its visibility and selection, the delete
//! confirmation overlay, and the translation of key events into actions.
//! Every log line the user sees is produced here.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::events::Event;
use crate::log::UiLog;
use crate::runner;
use crate::store::{Listing, RecordingStore};

const STATUS_TTL: Duration = Duration::from_secs(3);

/// Actions resulting from user interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// No action required.
    None,
    /// Exit the application.
    Quit,
    /// Launch the start-recording command.
    StartRecording,
    /// Launch the stop-recording command.
    StopRecording,
    /// List the recordings directory and reveal the list.
    ShowRecordings,
    /// Open the confirmation overlay for the selected recording.
    RequestDelete,
    /// The overlay was accepted; delete the pending recording.
    ConfirmDelete,
    /// Replay the selected recording.
    Replay,
    /// Copy the selected recording's path to the clipboard.
    CopyPath,
}

#[derive(Debug, Clone, Copy)]
pub enum StatusLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    at: Instant,
    level: StatusLevel,
}

/// The main application state container.
#[derive(Debug)]
pub struct App {
    /// Resolved runtime settings.
    pub settings: Settings,
    /// Append-only message log.
    pub log: UiLog,
    /// Names from the most recent listing, sorted.
    pub recordings: Vec<String>,
    /// Whether the recordings pane is shown.
    pub list_visible: bool,
    /// Index of the currently selected recording.
    pub selected: usize,
    /// Name awaiting delete confirmation while the overlay is open.
    pub pending_delete: Option<String>,
    /// Flag indicating if the application should exit.
    pub should_quit: bool,
    /// Height of the log view area (for scrolling calculations).
    pub log_view_height: usize,
    store: RecordingStore,
    status_message: Option<StatusMessage>,
    events_tx: mpsc::Sender<Event>,
}

impl App {
    /// Creates a new `App` instance.
    pub fn new(settings: Settings, events_tx: mpsc::Sender<Event>) -> Self {
        let store = RecordingStore::new(&settings);
        Self {
            settings,
            log: UiLog::new(),
            recordings: Vec::new(),
            list_visible: false,
            selected: 0,
            pending_delete: None,
            should_quit: false,
            log_view_height: 0,
            store,
            status_message: None,
            events_tx,
        }
    }

    /// Translates a key event into an action.
    ///
    /// While the confirmation overlay is open it captures every key; the
    /// overlay's default answer is No, so Enter and Esc both dismiss it.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if self.pending_delete.is_some() {
            return self.handle_confirm_input(key);
        }
        self.handle_normal_input(key)
    }

    fn handle_confirm_input(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => AppAction::ConfirmDelete,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
                self.pending_delete = None;
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn handle_normal_input(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                AppAction::Quit
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                AppAction::Quit
            }
            KeyCode::Char('r') => AppAction::StartRecording,
            KeyCode::Char('s') => AppAction::StopRecording,
            KeyCode::Char('l') => AppAction::ShowRecordings,
            KeyCode::Char('d') => AppAction::RequestDelete,
            KeyCode::Char('p') | KeyCode::Enter => AppAction::Replay,
            KeyCode::Char('y') => AppAction::CopyPath,
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                AppAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                AppAction::None
            }
            KeyCode::PageUp => {
                self.log.scroll_up(self.log_view_height.max(1));
                AppAction::None
            }
            KeyCode::PageDown => {
                self.log.scroll_down(self.log_view_height.max(1));
                AppAction::None
            }
            _ => AppAction::None,
        }
    }

    fn select_next(&mut self) {
        if self.list_visible && self.selected + 1 < self.recordings.len() {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        if self.list_visible && self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Launches the configured record command and logs the outcome.
    pub fn start_recording(&mut self) {
        match runner::launch_detached(&self.settings.record_cmd) {
            Ok(()) => self.log.push("Recording started..."),
            Err(err) => self
                .log
                .push(format!("Error running record script: {:#}", err)),
        }
    }

    /// Launches the configured stop command and logs the outcome.
    pub fn stop_recording(&mut self) {
        match runner::launch_detached(&self.settings.stop_cmd) {
            Ok(()) => self.log.push("Recording stopped."),
            Err(err) => self
                .log
                .push(format!("Error stopping recording: {:#}", err)),
        }
    }

    /// Lists the recordings directory, populating and revealing the list pane.
    ///
    /// A missing directory is reported without touching visibility; a match-free
    /// directory hides the pane. When the pane populates, the first row is
    /// selected.
    pub fn show_recordings(&mut self) {
        let dir = self.settings.recordings_dir.display().to_string();
        match self.store.list() {
            Err(err) => self
                .log
                .push(format!("Error showing recordings: {:#}", err)),
            Ok(Listing::Missing) => {
                self.log.push(format!("{}/ directory not found.", dir));
            }
            Ok(Listing::Found(names)) if names.is_empty() => {
                self.recordings.clear();
                self.list_visible = false;
                self.log.push(format!(
                    "No {} files found in {}/ directory.",
                    self.settings.suffix, dir
                ));
            }
            Ok(Listing::Found(names)) => {
                let count = names.len();
                self.recordings = names;
                self.selected = 0;
                self.list_visible = true;
                self.log.push(format!("Found {} recording(s).", count));
            }
        }
    }

    /// Opens the confirmation overlay for the selected recording.
    pub fn request_delete(&mut self) {
        let Some(name) =
            self.selection_or_log("Please select a recording from the list to delete.")
        else {
            return;
        };
        self.pending_delete = Some(name);
    }

    /// Deletes the recording the overlay was opened for, then relists.
    pub fn confirm_delete(&mut self) {
        let Some(name) = self.pending_delete.take() else {
            return;
        };
        match self.store.delete(&name) {
            Ok(()) => {
                self.log.push(format!("Deleted recording: {}", name));
                self.show_recordings();
            }
            Err(err) => self.log.push(format!("Error deleting file: {}", err)),
        }
    }

    /// Schedules a replay of the selected recording on a background task.
    ///
    /// The acknowledgement line is logged here, before the task exists; the
    /// completion line arrives later through the event channel. Nothing is
    /// spawned when a guard fails.
    pub fn replay_selected(&mut self) {
        let Some(name) = self.selection_or_log("Please select a recording from the list.")
        else {
            return;
        };
        let path = self.store.path_of(&name);
        if !self.store.exists(&name) {
            self.log
                .push(format!("Error: Selected file {} not found.", path.display()));
            return;
        }
        let command = self.settings.render_replay(&path);
        self.log.push(format!(
            "Replaying {} after {} seconds...",
            name, self.settings.replay_delay_secs
        ));
        tokio::spawn(runner::run_replay(
            self.settings.shell.clone(),
            command,
            name,
            self.events_tx.clone(),
        ));
    }

    /// Handles the completion notification from a replay task.
    pub fn on_replay_finished(&mut self, name: &str) {
        self.log.push(format!("Replay of {} completed!", name));
    }

    /// Refreshes a visible list after the directory changed underneath it.
    ///
    /// Hidden lists stay hidden and nothing is logged. The selected name is
    /// kept when it survives the change; otherwise the index is clamped. When
    /// no recordings match anymore the pane is hidden.
    pub fn on_recordings_changed(&mut self) {
        if !self.list_visible {
            return;
        }
        match self.store.list() {
            Ok(Listing::Found(names)) if !names.is_empty() => {
                let previous = self.recordings.get(self.selected).cloned();
                self.recordings = names;
                self.selected = previous
                    .and_then(|name| self.recordings.iter().position(|n| *n == name))
                    .unwrap_or_else(|| self.selected.min(self.recordings.len() - 1));
            }
            Ok(_) => {
                self.recordings.clear();
                self.list_visible = false;
                self.selected = 0;
            }
            Err(err) => eprintln!(
                "refresh of {} failed: {:#}",
                self.settings.recordings_dir.display(),
                err
            ),
        }
    }

    /// Copies the selected recording's path to the system clipboard.
    pub fn copy_selected_path(&mut self) {
        if !self.list_visible || self.recordings.is_empty() {
            self.set_status_warning("no recording selected");
            return;
        }
        let Some(name) = self.recordings.get(self.selected) else {
            self.set_status_warning("no recording selected");
            return;
        };
        let path = self.store.path_of(name).display().to_string();
        match copy_to_clipboard(&path) {
            Ok(()) => self.set_status_message(format!("Copied {} to clipboard", path)),
            Err(err) => self.set_status_warning(format!("Clipboard error: {:#}", err)),
        }
    }

    /// Two-stage selection guard shared by delete and replay.
    ///
    /// Logs the no-list line when the pane is hidden or empty, or the given
    /// line when the pane is populated but nothing is selected.
    fn selection_or_log(&mut self, missing_selection: &str) -> Option<String> {
        if !self.list_visible || self.recordings.is_empty() {
            self.log
                .push("No recording selected. Press 'l' to list recordings first.");
            return None;
        }
        match self.recordings.get(self.selected) {
            Some(name) => Some(name.clone()),
            None => {
                self.log.push(missing_selection);
                None
            }
        }
    }

    /// The permanent half of the status bar: directory and listing state.
    pub fn status_line(&self) -> String {
        let mut parts = vec![format!("dir: {}", self.settings.recordings_dir.display())];
        if self.list_visible {
            parts.push(format!("{} recording(s)", self.recordings.len()));
        }
        parts.join(" | ")
    }

    /// Key hints for the status bar, overlay-aware.
    pub fn key_hints(&self) -> &'static str {
        if self.pending_delete.is_some() {
            "y confirm | n/Esc cancel"
        } else {
            "r record | s stop | l list | p replay | d delete | y copy | q quit"
        }
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.set_status_with_level(message, StatusLevel::Info);
    }

    pub fn set_status_warning(&mut self, message: impl Into<String>) {
        self.set_status_with_level(message, StatusLevel::Warning);
    }

    fn set_status_with_level(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            text: message.into(),
            at: Instant::now(),
            level,
        });
    }

    /// The transient status message, if it has not expired.
    pub fn status_message(&self) -> Option<(&str, StatusLevel)> {
        if let Some(message) = &self.status_message {
            if message.at.elapsed() < STATUS_TTL {
                return Some((message.text.as_str(), message.level));
            }
        }
        None
    }
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("failed to access clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to set clipboard text")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn make_settings(dir: &Path) -> Settings {
        Settings {
            recordings_dir: dir.to_path_buf(),
            suffix: ".xns".to_string(),
            record_cmd: "true".to_string(),
            stop_cmd: "true".to_string(),
            replay_cmd: "sleep {delay} && true \"{path}\"".to_string(),
            replay_delay_secs: 0,
            shell: "sh".to_string(),
        }
    }

    fn make_app(dir: &Path) -> (App, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(8);
        (App::new(make_settings(dir), tx), rx)
    }

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn keys_map_to_actions() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = make_app(tmp.path());
        assert_eq!(app.handle_key(key('r')), AppAction::StartRecording);
        assert_eq!(app.handle_key(key('s')), AppAction::StopRecording);
        assert_eq!(app.handle_key(key('l')), AppAction::ShowRecordings);
        assert_eq!(app.handle_key(key('d')), AppAction::RequestDelete);
        assert_eq!(app.handle_key(key('p')), AppAction::Replay);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
            AppAction::Replay
        );
        assert_eq!(app.handle_key(key('y')), AppAction::CopyPath);
        assert_eq!(app.handle_key(key('q')), AppAction::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn show_populates_sorted_and_selects_first() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.xns");
        touch(tmp.path(), "note.txt");
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        assert_eq!(app.recordings, vec!["a.xns", "b.xns"]);
        assert_eq!(app.selected, 0);
        assert!(app.list_visible);
        assert_eq!(app.log.last(), Some("Found 2 recording(s)."));
    }

    #[test]
    fn show_missing_directory_logs_and_leaves_visibility_alone() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("recs");
        let (mut app, _rx) = make_app(&dir);
        app.show_recordings();
        assert!(!app.list_visible);
        assert_eq!(
            app.log.last(),
            Some(format!("{}/ directory not found.", dir.display()).as_str())
        );
    }

    #[test]
    fn show_without_matches_hides_list() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "note.txt");
        let (mut app, _rx) = make_app(tmp.path());
        // Pretend an earlier listing was still on screen.
        app.recordings = vec!["stale.xns".to_string()];
        app.list_visible = true;
        app.show_recordings();
        assert!(!app.list_visible);
        assert!(app.recordings.is_empty());
        assert_eq!(
            app.log.last(),
            Some(format!("No .xns files found in {}/ directory.", tmp.path().display()).as_str())
        );
    }

    #[test]
    fn replay_without_listing_logs_guard_and_spawns_nothing() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, mut rx) = make_app(tmp.path());
        app.replay_selected();
        assert_eq!(
            app.log.last(),
            Some("No recording selected. Press 'l' to list recordings first.")
        );
        // No runtime is active here; reaching the spawn would panic, and the
        // channel stays empty.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn replay_on_vanished_file_logs_not_found() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, mut rx) = make_app(tmp.path());
        app.show_recordings();
        std::fs::remove_file(tmp.path().join("a.xns")).unwrap();
        app.replay_selected();
        let expected = format!(
            "Error: Selected file {} not found.",
            tmp.path().join("a.xns").display()
        );
        assert_eq!(app.log.last(), Some(expected.as_str()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn replay_logs_schedule_then_exactly_one_completion() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "b.xns");
        let (mut app, mut rx) = make_app(tmp.path());
        app.show_recordings();
        app.replay_selected();
        assert_eq!(app.log.last(), Some("Replaying b.xns after 0 seconds..."));

        match rx.recv().await {
            Some(Event::ReplayFinished { name }) => {
                app.on_replay_finished(&name);
            }
            other => panic!("expected a completion event, got {:?}", other),
        }
        assert_eq!(app.log.last(), Some("Replay of b.xns completed!"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn delete_requires_confirmation_then_relists() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        touch(tmp.path(), "b.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();

        assert_eq!(app.handle_key(key('d')), AppAction::RequestDelete);
        app.request_delete();
        assert_eq!(app.pending_delete.as_deref(), Some("a.xns"));

        assert_eq!(app.handle_key(key('y')), AppAction::ConfirmDelete);
        app.confirm_delete();
        assert!(!tmp.path().join("a.xns").exists());
        assert_eq!(app.recordings, vec!["b.xns"]);
        assert_eq!(app.selected, 0);
        assert!(app.log.iter().any(|line| line == "Deleted recording: a.xns"));
        assert_eq!(app.log.last(), Some("Found 1 recording(s)."));
    }

    #[test]
    fn delete_overlay_defaults_to_no() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        app.request_delete();

        // Enter means the default answer, which is No.
        let action = app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(action, AppAction::None);
        assert!(app.pending_delete.is_none());
        assert!(tmp.path().join("a.xns").exists());

        app.request_delete();
        let action = app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(action, AppAction::None);
        assert!(app.pending_delete.is_none());
        assert!(tmp.path().join("a.xns").exists());
    }

    #[test]
    fn delete_failure_is_logged() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        app.request_delete();
        std::fs::remove_file(tmp.path().join("a.xns")).unwrap();
        app.confirm_delete();
        let last = app.log.last().unwrap();
        assert!(last.starts_with("Error deleting file:"), "got: {}", last);
    }

    #[test]
    fn delete_without_listing_logs_guard() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = make_app(tmp.path());
        app.request_delete();
        assert!(app.pending_delete.is_none());
        assert_eq!(
            app.log.last(),
            Some("No recording selected. Press 'l' to list recordings first.")
        );
    }

    #[test]
    fn selection_moves_and_clamps() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        touch(tmp.path(), "b.xns");
        touch(tmp.path(), "c.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        app.handle_key(key('j'));
        app.handle_key(key('j'));
        assert_eq!(app.selected, 2);
        app.handle_key(key('j'));
        assert_eq!(app.selected, 2);
        app.handle_key(key('k'));
        assert_eq!(app.selected, 1);
        app.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Up, KeyModifiers::NONE));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn refresh_keeps_selected_name_when_it_survives() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        touch(tmp.path(), "b.xns");
        touch(tmp.path(), "c.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        app.handle_key(key('j'));
        assert_eq!(app.recordings[app.selected], "b.xns");

        std::fs::remove_file(tmp.path().join("a.xns")).unwrap();
        app.on_recordings_changed();
        assert_eq!(app.recordings, vec!["b.xns", "c.xns"]);
        assert_eq!(app.recordings[app.selected], "b.xns");
        // Silent refresh: no log lines were appended.
        assert_eq!(app.log.last(), Some("Found 3 recording(s)."));
    }

    #[test]
    fn refresh_hides_list_when_nothing_matches() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        std::fs::remove_file(tmp.path().join("a.xns")).unwrap();
        app.on_recordings_changed();
        assert!(!app.list_visible);
        assert!(app.recordings.is_empty());
    }

    #[test]
    fn refresh_leaves_hidden_list_alone() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.on_recordings_changed();
        assert!(!app.list_visible);
        assert!(app.recordings.is_empty());
        assert!(app.log.is_empty());
    }

    #[tokio::test]
    async fn record_and_stop_log_their_outcome() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = make_app(tmp.path());
        app.start_recording();
        assert_eq!(app.log.last(), Some("Recording started..."));
        app.stop_recording();
        assert_eq!(app.log.last(), Some("Recording stopped."));

        app.settings.record_cmd = "/nonexistent-recorder-3141".to_string();
        app.start_recording();
        let last = app.log.last().unwrap();
        assert!(last.starts_with("Error running record script:"), "got: {}", last);
    }

    #[test]
    fn copy_without_selection_sets_warning() {
        let tmp = TempDir::new().unwrap();
        let (mut app, _rx) = make_app(tmp.path());
        app.copy_selected_path();
        let (text, level) = app.status_message().unwrap();
        assert_eq!(text, "no recording selected");
        assert!(matches!(level, StatusLevel::Warning));
        // Status feedback never lands in the log.
        assert!(app.log.is_empty());
    }

    #[test]
    fn status_line_reflects_listing() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        let base = format!("dir: {}", tmp.path().display());
        assert_eq!(app.status_line(), base);
        app.show_recordings();
        assert_eq!(app.status_line(), format!("{} | 1 recording(s)", base));
    }

    #[test]
    fn overlay_captures_unrelated_keys() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.xns");
        let (mut app, _rx) = make_app(tmp.path());
        app.show_recordings();
        app.request_delete();
        assert_eq!(app.handle_key(key('r')), AppAction::None);
        assert_eq!(app.handle_key(key('l')), AppAction::None);
        assert!(app.pending_delete.is_some());
        assert_eq!(app.key_hints(), "y confirm | n/Esc cancel");
    }
}
