pub mod markdown;
pub mod widgets;

use std::str::FromStr;

use crate::app::{App, AppMode};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Color,
    Frame,
};

/// Resolve a configured colour name, falling back when it does not parse.
pub fn theme_color(name: &str, fallback: Color) -> Color {
    Color::from_str(name).unwrap_or(fallback)
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let alert_height = u16::from(app.alert.is_some());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Title / backend status
            Constraint::Length(3),            // Topic input
            Constraint::Length(alert_height), // Alert region
            Constraint::Min(0),               // Result or library
            Constraint::Length(1),            // Bottom keymap bar
        ])
        .split(frame.area());

    widgets::render_title_bar(frame, app, chunks[0]);
    widgets::render_topic_input(frame, app, chunks[1]);
    widgets::render_alert(frame, app, chunks[2]);
    match app.mode {
        AppMode::Compose => widgets::render_result_panel(frame, app, chunks[3]),
        AppMode::Library => widgets::render_library(frame, app, chunks[3]),
    }
    widgets::render_bottom_bar(frame, app, chunks[4]);

    if app.show_help {
        widgets::render_help_window(frame, frame.area());
    }

    if let Some(confirm) = &app.confirm {
        widgets::render_confirm_window(frame, &confirm.prompt(), frame.area());
    }
}
