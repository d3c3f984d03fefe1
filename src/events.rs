//! Event definitions for the application event loop.
//!
//! This module defines the `Event` enum which encapsulates all possible events
//! that drive the application's state transitions: user input, replay
//! completions, recordings-directory changes, and system signals.

use crossterm::event::KeyEvent;

/// Represents an event in the application's main event loop.
#[derive(Debug, Clone)]
pub enum Event {
    /// A keyboard event received from the user.
    Key(KeyEvent),
    /// The terminal window was resized.
    Resize { width: u16, height: u16 },
    /// A background replay task ran its external command to completion.
    ///
    /// Emitted exactly once per replay invocation and carrying the replayed
    /// recording's name. This event is the only channel between a replay
    /// task and the UI; tasks never touch app state directly.
    ReplayFinished { name: String },
    /// Something changed inside the recordings directory.
    RecordingsChanged,
    /// A termination signal was received; leave the loop and restore the terminal.
    Shutdown,
}
