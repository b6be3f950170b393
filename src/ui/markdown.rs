// Terminal rendering of formatted blog blocks

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::formatter::{Block, Inline, ListKind};

fn inline_spans(runs: &[Inline], base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for run in runs {
        match run {
            Inline::Text(text) => spans.push(Span::styled(text.clone(), base)),
            Inline::Strong(inner) => spans.extend(inline_spans(
                inner,
                base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Inline::Emphasis(inner) => {
                spans.extend(inline_spans(inner, base.add_modifier(Modifier::ITALIC)));
            }
        }
    }
    spans
}

const fn header_color(level: usize, accent: Color) -> Color {
    match level {
        1 => accent,
        2 => Color::Cyan,
        _ => Color::Blue,
    }
}

/// Convert formatted blocks to ratatui Lines, a blank line between blocks.
pub fn render_blocks_to_lines(blocks: &[Block], accent: Color) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        match block {
            Block::Header { level, text } => {
                let style = Style::default()
                    .fg(header_color(*level, accent))
                    .add_modifier(Modifier::BOLD);
                let mut spans = inline_spans(text, style);
                if *level == 1 {
                    spans.iter_mut().for_each(|s| {
                        s.style = s.style.add_modifier(Modifier::UNDERLINED);
                    });
                }
                lines.push(Line::from(spans));
            }
            Block::Paragraph(rows) => {
                for row in rows {
                    lines.push(Line::from(inline_spans(row, Style::default())));
                }
            }
            Block::List { kind, items } => {
                for (n, item) in items.iter().enumerate() {
                    let marker = match kind {
                        ListKind::Bulleted => "  • ".to_string(),
                        ListKind::Numbered => format!("  {}. ", n + 1),
                    };
                    let mut spans = vec![Span::styled(marker, Style::default().fg(Color::Cyan))];
                    spans.extend(inline_spans(item, Style::default()));
                    lines.push(Line::from(spans));
                }
            }
            Block::Raw(markup) => {
                lines.push(Line::from(Span::styled(
                    markup.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    lines
}

/// Show HTML source, one line per block element.
pub fn render_html_source(html: &str) -> Vec<Line<'static>> {
    html.lines()
        .map(|line| {
            Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Color::Green),
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::parse_blocks;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_render_plain_text() {
        let lines = render_blocks_to_lines(&parse_blocks("Hello world"), Color::Yellow);
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "Hello world");
    }

    #[test]
    fn test_render_header_and_paragraph() {
        let lines =
            render_blocks_to_lines(&parse_blocks("# Intro\n\nRust is fast."), Color::Yellow);
        assert_eq!(lines.len(), 3);
        assert_eq!(plain(&lines[0]), "Intro");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(plain(&lines[2]), "Rust is fast.");
    }

    #[test]
    fn test_render_bold_text() {
        let lines = render_blocks_to_lines(&parse_blocks("This is **bold** text"), Color::Yellow);
        assert_eq!(lines[0].spans.len(), 3);
        assert_eq!(lines[0].spans[1].content, "bold");
        assert!(lines[0].spans[1]
            .style
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_render_emphasis_inside_bold() {
        let lines = render_blocks_to_lines(&parse_blocks("**a *b* c**"), Color::Yellow);
        let spans = &lines[0].spans;
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "b");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[1].style.add_modifier.contains(Modifier::ITALIC));
        assert!(!spans[0].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_render_numbered_list_markers() {
        let lines = render_blocks_to_lines(&parse_blocks("3. a\n7. b"), Color::Yellow);
        assert_eq!(plain(&lines[0]), "  1. a");
        assert_eq!(plain(&lines[1]), "  2. b");
    }

    #[test]
    fn test_render_bullets() {
        let lines = render_blocks_to_lines(&parse_blocks("- a\n- b"), Color::Yellow);
        assert_eq!(lines.len(), 2);
        assert_eq!(plain(&lines[0]), "  • a");
    }

    #[test]
    fn test_render_html_source() {
        let lines = render_html_source("<h1>A</h1>\n<p>B</p>");
        assert_eq!(lines.len(), 2);
    }
}
