//! The append-only message log shown in the main pane.
//!
//! Every user action and completion notification lands here as one line.
//! Lines are only ever appended, never cleared or truncated, matching the
//! text pane this UI descends from.

/// Append-only log with a tail-anchored view.
///
/// `scroll_back` counts how many lines the view has been scrolled up from
/// the end; it snaps back to zero whenever a new line arrives so fresh
/// output is always visible.
#[derive(Debug, Default)]
pub struct UiLog {
    lines: Vec<String>,
    scroll_back: usize,
}

impl UiLog {
    pub fn new() -> UiLog {
        UiLog::default()
    }

    /// Appends one line and snaps the view back to the tail.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.scroll_back = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the most recent line, if any.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// Returns an iterator over all lines, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// True while the view is anchored to the newest line.
    pub fn is_following(&self) -> bool {
        self.scroll_back == 0
    }

    /// Scrolls towards older lines, clamped so the view never runs off the top.
    pub fn scroll_up(&mut self, step: usize) {
        let max_back = self.lines.len().saturating_sub(1);
        self.scroll_back = (self.scroll_back + step).min(max_back);
    }

    /// Scrolls towards the tail.
    pub fn scroll_down(&mut self, step: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(step);
    }

    /// The window of lines to render in a pane `height` lines tall.
    pub fn visible(&self, height: usize) -> &[String] {
        let end = self.lines.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        &self.lines[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> UiLog {
        let mut log = UiLog::new();
        for i in 0..n {
            log.push(format!("line {}", i));
        }
        log
    }

    #[test]
    fn push_appends_in_order() {
        let log = filled(3);
        let lines: Vec<&str> = log.iter().collect();
        assert_eq!(lines, vec!["line 0", "line 1", "line 2"]);
        assert_eq!(log.last(), Some("line 2"));
    }

    #[test]
    fn visible_shows_the_tail() {
        let log = filled(10);
        assert_eq!(log.visible(3), &["line 7", "line 8", "line 9"]);
        assert_eq!(log.visible(20).len(), 10);
    }

    #[test]
    fn scroll_up_moves_window_and_clamps() {
        let mut log = filled(5);
        log.scroll_up(2);
        assert_eq!(log.visible(2), &["line 1", "line 2"]);
        log.scroll_up(100);
        assert_eq!(log.visible(1), &["line 0"]);
    }

    #[test]
    fn new_line_snaps_back_to_tail() {
        let mut log = filled(5);
        log.scroll_up(3);
        assert!(!log.is_following());
        log.push("fresh");
        assert!(log.is_following());
        assert_eq!(log.visible(1), &["fresh"]);
    }

    #[test]
    fn scroll_down_returns_towards_tail() {
        let mut log = filled(5);
        log.scroll_up(3);
        log.scroll_down(1);
        assert_eq!(log.visible(1), &["line 2"]);
        log.scroll_down(100);
        assert_eq!(log.visible(1), &["line 4"]);
    }
}
