//! Terminal User Interface (TUI) rendering and management.
//!
//! This module handles initializing the terminal in raw mode, restoring it on
//! exit, and drawing the application state using `ratatui`. The recordings
//! pane is only rendered while `App::list_visible` is set; the delete
//! confirmation overlay sits on top of everything else.

use std::io::{self, Stdout};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::{App, StatusLevel};

/// Type alias for the specific terminal backend used.
pub type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Initializes the terminal for TUI mode.
///
/// Enables raw mode, enters the alternate screen, and creates a `ratatui`
/// Terminal instance.
pub fn init_terminal() -> io::Result<TuiTerminal> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restores the terminal to its original state.
///
/// Disables raw mode, leaves the alternate screen, and shows the cursor.
pub fn restore_terminal(mut terminal: TuiTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Draws the current application state to the terminal.
pub fn draw(app: &mut App, terminal: &mut TuiTerminal) -> io::Result<()> {
    let title = window_title(app);
    execute!(terminal.backend_mut(), SetTitle(title))?;
    terminal.draw(|frame| {
        let area = frame.size();
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(4)])
            .split(area);

        let log_area = if app.list_visible {
            let main = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(vertical[0]);
            render_recording_list(app, frame, main[0]);
            main[1]
        } else {
            vertical[0]
        };

        render_log(app, frame, log_area);
        render_status_bar(app, frame, vertical[1]);

        if let Some(name) = app.pending_delete.clone() {
            render_confirm_overlay(frame, area, &name);
        }
    })?;
    Ok(())
}

fn render_recording_list(app: &App, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .recordings
        .iter()
        .map(|name| ListItem::new(truncate(name, width)))
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Recordings ({})", app.recordings.len()))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(
        list,
        area,
        &mut list_state(app.selected, app.recordings.len()),
    );
}

fn render_log(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(log_title(app))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    app.log_view_height = inner.height as usize;

    let width = inner.width as usize;
    let lines: Vec<Line> = app
        .log
        .visible(inner.height as usize)
        .iter()
        .map(|line| Line::from(Span::raw(truncate(line, width))))
        .collect();
    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);

    if app.log.is_empty() {
        let empty = Paragraph::new("No messages yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default());
        frame.render_widget(empty, inner);
    }
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let top_line = match app.status_message() {
        Some((text, StatusLevel::Warning)) => {
            Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Yellow)))
        }
        Some((text, StatusLevel::Info)) => {
            Line::from(Span::styled(text.to_string(), Style::default().fg(Color::Green)))
        }
        None => Line::from(Span::raw(app.status_line())),
    };
    let status = Paragraph::new(Text::from(vec![
        top_line,
        Line::from(Span::styled(
            app.key_hints(),
            Style::default().fg(Color::DarkGray),
        )),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(status, area);
}

fn render_confirm_overlay(frame: &mut Frame, area: Rect, name: &str) {
    let popup = centered_rect(50, 20, area);
    let body = Text::from(vec![
        Line::from(Span::raw(format!(
            "Are you sure you want to delete the recording '{}'?",
            name
        ))),
        Line::from(Span::raw("")),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" delete   "),
            Span::styled("n", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" keep (default)"),
        ]),
    ]);
    let dialog = Paragraph::new(body).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(dialog, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn window_title(app: &App) -> String {
    if app.list_visible {
        if let Some(name) = app.recordings.get(app.selected) {
            return format!("macrodeck · {}", name);
        }
    }
    "macrodeck".to_string()
}

fn log_title(app: &App) -> String {
    if app.log.is_following() {
        "Log".to_string()
    } else {
        "Log (scrolled)".to_string()
    }
}

fn list_state(selected: usize, len: usize) -> ratatui::widgets::ListState {
    let mut state = ratatui::widgets::ListState::default();
    if len > 0 {
        state.select(Some(selected.min(len - 1)));
    }
    state
}

fn truncate(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out = text.chars().take(max.saturating_sub(1)).collect::<String>();
    out.push('~');
    out
}
