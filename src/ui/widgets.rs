use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{markdown, theme_color};
use crate::app::{AlertKind, App, AppMode, CounterState, UiMode};
use crate::formatter;
use crate::models::TOPIC_MAX_CHARS;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;

    Rect {
        x: area.x + x,
        y: area.y + y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_help_window(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(Span::styled(
            "BlogForge - Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Compose:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Enter         - Generate blog post"),
        Line::from("  Ctrl+S        - Save generated post"),
        Line::from("  Ctrl+R        - Regenerate (asks first)"),
        Line::from("  Ctrl+T        - Toggle HTML source"),
        Line::from("  Esc           - Dismiss alert"),
        Line::from(""),
        Line::from(Span::styled("Library:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Ctrl+L        - Open/close saved blogs"),
        Line::from("  Up/Down       - Select blog"),
        Line::from("  Ctrl+D        - Delete selected blog"),
        Line::from("  F5            - Refresh list"),
        Line::from(""),
        Line::from(Span::styled("General:", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  PgUp/PgDn     - Scroll content"),
        Line::from("  Ctrl+H        - Show/hide this help"),
        Line::from("  Ctrl+C        - Quit (press twice)"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Ctrl+H or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help ")
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    let popup_area = centered(area, 52, 24);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(help_paragraph, popup_area);
}

pub fn render_confirm_window(frame: &mut Frame, prompt: &str, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "y / Enter: Yes    n / Esc: No",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm ")
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    let popup_area = centered(area, 60, 7);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

pub fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (status, color) = match app.backend_online {
        Some(true) => ("online", Color::Green),
        Some(false) => ("offline", Color::Red),
        None => ("checking", Color::DarkGray),
    };
    let (activity, activity_color) = match app.ui_mode() {
        UiMode::Idle | UiMode::ResultShown => ("", Color::DarkGray),
        UiMode::Generating => (" generating...", Color::Yellow),
        UiMode::Saving => (" saving...", Color::Yellow),
        UiMode::ErrorShown => (" needs attention", Color::Red),
    };

    let line = Line::from(vec![
        Span::styled(
            "BlogForge ",
            Style::default()
                .fg(theme_color(&app.theme.header_color, Color::Blue))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", app.backend_url),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("[{status}]"), Style::default().fg(color)),
        Span::styled(activity, Style::default().fg(activity_color)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_topic_input(frame: &mut Frame, app: &App, area: Rect) {
    let (count, state) = app.topic_counter();
    let counter_color = match state {
        CounterState::Neutral => Color::DarkGray,
        CounterState::Valid => Color::Green,
        CounterState::Invalid => Color::Red,
    };
    let border = theme_color(&app.theme.border_color, Color::Cyan);
    let border_color = if state == CounterState::Invalid {
        Color::Red
    } else {
        border
    };

    let (input_text, input_style) = if app.input_buffer.is_empty() {
        ("Enter a blog topic...", Style::default().fg(Color::Gray))
    } else {
        (
            app.input_buffer.as_str(),
            Style::default().fg(border).add_modifier(Modifier::BOLD),
        )
    };

    let input = Paragraph::new(input_text).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Topic ")
            .title(
                Line::from(Span::styled(
                    format!(" {count}/{TOPIC_MAX_CHARS} characters "),
                    Style::default().fg(counter_color),
                ))
                .right_aligned(),
            )
            .border_style(Style::default().fg(border_color)),
    );

    frame.render_widget(input, area);
}

pub fn render_alert(frame: &mut Frame, app: &App, area: Rect) {
    let Some(alert) = &app.alert else {
        return;
    };

    let (prefix, color) = match alert.kind {
        AlertKind::Success => ("✓ ", Color::Green),
        AlertKind::Warning => ("! ", Color::Yellow),
        AlertKind::Error => ("✗ ", Color::Red),
    };

    let paragraph = Paragraph::new(format!("{prefix}{}", alert.message))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));

    frame.render_widget(paragraph, area);
}

/// Render scrollable lines, clamping the app's scroll offset to the content.
fn render_scrolled(
    frame: &mut Frame,
    app: &mut App,
    lines: Vec<Line<'static>>,
    block: Block<'_>,
    area: Rect,
) {
    let inner_width = area.width.saturating_sub(2).max(1) as usize;
    let total_visual_lines: usize = lines
        .iter()
        .map(|line| line.width().div_ceil(inner_width).max(1))
        .sum();

    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = total_visual_lines.saturating_sub(visible_height);
    let actual_scroll = app.scroll_offset.min(max_scroll);

    if app.scroll_offset != actual_scroll {
        app.scroll_offset = actual_scroll;
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(actual_scroll).unwrap_or(u16::MAX), 0));

    frame.render_widget(paragraph, area);
}

fn render_welcome(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to BlogForge",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Type a topic and press Enter to write a blog post",
            Style::default().fg(Color::Cyan),
        )),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn render_waiting(frame: &mut Frame, accent: Color, border: Color, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Generating your blog post...",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "This can take a minute.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let waiting = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(waiting, area);
}

pub fn render_result_panel(frame: &mut Frame, app: &mut App, area: Rect) {
    let accent = theme_color(&app.theme.accent_color, Color::Yellow);
    let border = theme_color(&app.theme.border_color, Color::Cyan);

    match app.ui_mode() {
        UiMode::Generating => {
            render_waiting(frame, accent, border, area);
            return;
        }
        UiMode::Idle => {
            render_welcome(frame, area);
            return;
        }
        UiMode::ResultShown | UiMode::Saving | UiMode::ErrorShown => {}
    }

    // A failed generate leaves an error with nothing to show
    let Some(blog) = &app.current_blog else {
        render_welcome(frame, area);
        return;
    };

    let title = format!(" {} ", blog.topic);
    let subtitle = format!(
        " generated {} ",
        blog.generated_at
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .title(Line::from(subtitle).right_aligned())
        .border_style(Style::default().fg(border));

    let lines = if app.show_html {
        markdown::render_html_source(&app.rendered_html)
    } else {
        markdown::render_blocks_to_lines(&app.rendered, accent)
    };

    render_scrolled(frame, app, lines, block, area);
}

pub fn render_library(frame: &mut Frame, app: &mut App, area: Rect) {
    let accent = theme_color(&app.theme.accent_color, Color::Yellow);
    let border = theme_color(&app.theme.border_color, Color::Cyan);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let list_title = if app.library_loading {
        " Saved blogs (loading...) ".to_string()
    } else {
        format!(" Saved blogs ({}) ", app.library.len())
    };
    let list_block = Block::default()
        .borders(Borders::ALL)
        .title(list_title)
        .border_style(Style::default().fg(border));

    if app.library.is_empty() {
        let empty = Paragraph::new("No saved blogs")
            .style(Style::default().fg(Color::DarkGray))
            .block(list_block);
        frame.render_widget(empty, chunks[0]);
    } else {
        let items: Vec<ListItem> = app
            .library
            .iter()
            .map(|blog| {
                let date = blog
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let preview = blog
                    .preview_text()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                ListItem::new(vec![
                    Line::from(blog.topic.clone()),
                    Line::from(Span::styled(preview, Style::default().fg(Color::Gray))),
                    Line::from(Span::styled(date, Style::default().fg(Color::DarkGray))),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(list_block)
            .highlight_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(Some(app.selected));
        frame.render_stateful_widget(list, chunks[0], &mut state);
    }

    let Some(blog) = app.selected_blog() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        frame.render_widget(block, chunks[1]);
        return;
    };

    let title = match blog.updated_at {
        Some(updated) => format!(
            " {} · updated {} ",
            blog.topic,
            updated.format("%Y-%m-%d %H:%M")
        ),
        None => format!(" {} ", blog.topic),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(accent)))
        .border_style(Style::default().fg(border));
    let blocks = formatter::parse_blocks(&blog.content);
    let lines = markdown::render_blocks_to_lines(&blocks, accent);

    render_scrolled(frame, app, lines, block, chunks[1]);
}

pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if app.exit_pending {
        (
            "Press Ctrl+C again to exit, Esc to cancel".to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        let text = match app.mode {
            AppMode::Compose => format!(
                "Enter: Generate | Ctrl+S: {} | Ctrl+R: Regenerate | Ctrl+L: Library | Ctrl+H: Help",
                app.save_label()
            ),
            AppMode::Library => {
                "Up/Down: Select | Ctrl+D: Delete | F5: Refresh | Esc: Back | Ctrl+H: Help"
                    .to_string()
            }
        };
        (text, Style::default().fg(Color::DarkGray))
    };

    let bar = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style);

    frame.render_widget(bar, area);
}
