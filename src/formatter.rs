//! Content formatter: generated blog text to HTML.
//!
//! Supports a small markdown subset: `#`..`######` headers, `**strong**`,
//! `*emphasis*`, `-`/`•` bullet lists, `1.` numbered lists and paragraphs
//! separated by blank lines. Input is parsed line by line into [`Block`]s,
//! which render either to HTML ([`to_html`]) or to terminal lines
//! (`ui::markdown`).
//!
//! Text is never escaped. Lines that already begin with a block-level tag are
//! kept verbatim, so formatting the formatter's own output changes nothing.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s(.+)$").expect("valid header regex"));
static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s(.+)$").expect("valid bullet regex"));
static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s(.+)$").expect("valid numbered regex"));
static STRONG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid strong regex"));
static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<p[\s>]|</?[uo]l[\s>]|<li[\s>]|<h[1-6][\s>])").expect("valid block tag regex")
});

const HEADER_CLASS: &str = "text-primary fw-bold mt-4 mb-3";
const LIST_CLASS: &str = "mb-3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bulleted,
    Numbered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Header { level: usize, text: Vec<Inline> },
    /// One entry per source line; rendered joined by line breaks.
    Paragraph(Vec<Vec<Inline>>),
    List { kind: ListKind, items: Vec<Vec<Inline>> },
    /// Pre-rendered markup passed through untouched.
    Raw(String),
}

enum Open {
    None,
    Paragraph(Vec<Vec<Inline>>),
    List(ListKind, Vec<Vec<Inline>>),
}

impl Open {
    fn close_into(&mut self, blocks: &mut Vec<Block>) {
        match std::mem::replace(self, Self::None) {
            Self::None => {}
            Self::Paragraph(lines) => blocks.push(Block::Paragraph(lines)),
            Self::List(kind, items) => blocks.push(Block::List { kind, items }),
        }
    }
}

enum Atom {
    Char(char),
    Strong(Vec<Inline>),
}

/// Split a line into text, strong and emphasis runs.
///
/// Strong markers are resolved first. Emphasis then pairs the remaining
/// single markers, both inside strong runs and around them.
pub fn parse_inline(text: &str) -> Vec<Inline> {
    let mut atoms = Vec::new();
    let mut last = 0;

    for caps in STRONG_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        atoms.extend(text[last..whole.start()].chars().map(Atom::Char));
        let inner = caps[1].chars().map(Atom::Char).collect();
        atoms.push(Atom::Strong(emphasis_runs(inner)));
        last = whole.end();
    }
    atoms.extend(text[last..].chars().map(Atom::Char));

    emphasis_runs(atoms)
}

/// Pair `*` markers left to right. A span needs at least one atom between
/// its markers; a marker with no partner stays literal.
fn emphasis_pairs(atoms: &[Atom]) -> Vec<(usize, usize)> {
    let stars: Vec<usize> = atoms
        .iter()
        .enumerate()
        .filter(|(_, atom)| matches!(atom, Atom::Char('*')))
        .map(|(i, _)| i)
        .collect();

    let mut pairs = Vec::new();
    let mut from = 0;
    while let Some(&open) = stars.iter().find(|&&i| i >= from) {
        let Some(&close) = stars.iter().find(|&&i| i >= open + 2) else {
            break;
        };
        pairs.push((open, close));
        from = close + 1;
    }
    pairs
}

fn emphasis_runs(atoms: Vec<Atom>) -> Vec<Inline> {
    let mut pairs = emphasis_pairs(&atoms).into_iter().peekable();
    let mut out = Vec::new();
    let mut pending = Vec::new();

    for (i, atom) in atoms.into_iter().enumerate() {
        match pairs.peek() {
            Some(&(open, _)) if i == open => {
                push_atoms(std::mem::take(&mut pending), &mut out);
            }
            Some(&(_, close)) if i == close => {
                let mut inner = Vec::new();
                push_atoms(std::mem::take(&mut pending), &mut inner);
                out.push(Inline::Emphasis(inner));
                pairs.next();
            }
            _ => pending.push(atom),
        }
    }
    push_atoms(pending, &mut out);

    out
}

fn push_atoms(atoms: Vec<Atom>, out: &mut Vec<Inline>) {
    let mut text = String::new();
    for atom in atoms {
        match atom {
            Atom::Char(c) => text.push(c),
            Atom::Strong(inner) => {
                if !text.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut text)));
                }
                out.push(Inline::Strong(inner));
            }
        }
    }
    if !text.is_empty() {
        out.push(Inline::Text(text));
    }
}

fn list_item(line: &str) -> Option<(ListKind, &str)> {
    if let Some(caps) = BULLET_RE.captures(line) {
        return caps.get(1).map(|m| (ListKind::Bulleted, m.as_str()));
    }
    NUMBERED_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| (ListKind::Numbered, m.as_str()))
}

fn header(line: &str) -> Option<(usize, &str)> {
    let caps = HEADER_RE.captures(line)?;
    let level = caps.get(1)?.as_str().len();
    let text = caps.get(2)?.as_str().trim();
    (!text.is_empty()).then_some((level, text))
}

/// Parse content into blocks in a single pass over its lines.
pub fn parse_blocks(content: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open = Open::None;

    for line in content.lines() {
        if line.trim().is_empty() {
            open.close_into(&mut blocks);
            continue;
        }

        if BLOCK_TAG_RE.is_match(line.trim_start()) {
            open.close_into(&mut blocks);
            blocks.push(Block::Raw(line.to_string()));
            continue;
        }

        if let Some((level, text)) = header(line) {
            open.close_into(&mut blocks);
            blocks.push(Block::Header {
                level,
                text: parse_inline(text),
            });
            continue;
        }

        if let Some((kind, text)) = list_item(line) {
            match &mut open {
                Open::List(open_kind, items) if *open_kind == kind => {
                    items.push(parse_inline(text));
                }
                _ => {
                    open.close_into(&mut blocks);
                    open = Open::List(kind, vec![parse_inline(text)]);
                }
            }
            continue;
        }

        match &mut open {
            Open::Paragraph(lines) => lines.push(parse_inline(line)),
            _ => {
                open.close_into(&mut blocks);
                open = Open::Paragraph(vec![parse_inline(line)]);
            }
        }
    }
    open.close_into(&mut blocks);

    blocks
}

fn inline_html(runs: &[Inline]) -> String {
    let mut out = String::new();
    for run in runs {
        match run {
            Inline::Text(text) => out.push_str(text),
            Inline::Strong(inner) => {
                out.push_str("<strong>");
                out.push_str(&inline_html(inner));
                out.push_str("</strong>");
            }
            Inline::Emphasis(inner) => {
                out.push_str("<em>");
                out.push_str(&inline_html(inner));
                out.push_str("</em>");
            }
        }
    }
    out
}

/// Render blocks as HTML, one block-level element per line.
pub fn to_html(blocks: &[Block]) -> String {
    if blocks.is_empty() {
        return "<p></p>".to_string();
    }

    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Header { level, text } => {
                lines.push(format!(
                    "<h{level} class=\"{HEADER_CLASS}\">{}</h{level}>",
                    inline_html(text)
                ));
            }
            Block::Paragraph(rows) => {
                let mut line = String::from("<p>");
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        line.push_str("<br>");
                    }
                    line.push_str(&inline_html(row));
                }
                line.push_str("</p>");
                lines.push(line);
            }
            Block::List { kind, items } => {
                let tag = match kind {
                    ListKind::Bulleted => "ul",
                    ListKind::Numbered => "ol",
                };
                lines.push(format!("<{tag} class=\"{LIST_CLASS}\">"));
                for item in items {
                    lines.push(format!("<li>{}</li>", inline_html(item)));
                }
                lines.push(format!("</{tag}>"));
            }
            Block::Raw(markup) => lines.push(markup.clone()),
        }
    }

    lines.join("\n")
}

/// Format generated blog content as HTML.
pub fn format(content: &str) -> String {
    to_html(&parse_blocks(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_one_header() {
        let html = format("# Title");
        assert_eq!(
            html,
            "<h1 class=\"text-primary fw-bold mt-4 mb-3\">Title</h1>"
        );
    }

    #[test]
    fn test_level_six_header() {
        let html = format("###### Deep");
        assert!(html.starts_with("<h6 "));
        assert!(html.contains(">Deep</h6>"));
    }

    #[test]
    fn test_seven_hashes_is_not_a_header() {
        assert_eq!(format("####### Deep"), "<p>####### Deep</p>");
    }

    #[test]
    fn test_hash_without_space_is_text() {
        assert_eq!(format("#hashtag"), "<p>#hashtag</p>");
    }

    #[test]
    fn test_strong_before_emphasis() {
        let html = format("**bold** and *italic*");
        assert_eq!(html, "<p><strong>bold</strong> and <em>italic</em></p>");
    }

    #[test]
    fn test_emphasis_is_non_greedy() {
        let html = format("*a* b *c*");
        assert_eq!(html, "<p><em>a</em> b <em>c</em></p>");
    }

    #[test]
    fn test_unmatched_markers_stay_literal() {
        assert_eq!(format("2 * 3 = 6"), "<p>2 * 3 = 6</p>");
    }

    #[test]
    fn test_bullet_list_wraps_all_items() {
        let html = format("- a\n- b\n- c");
        assert_eq!(
            html,
            "<ul class=\"mb-3\">\n<li>a</li>\n<li>b</li>\n<li>c</li>\n</ul>"
        );
    }

    #[test]
    fn test_bullet_symbol_variant() {
        let html = format("• first\n- second");
        assert_eq!(html.matches("<li>").count(), 2);
        assert_eq!(html.matches("<ul").count(), 1);
    }

    #[test]
    fn test_every_list_run_is_wrapped() {
        let html = format("- a\n- b\n\nBetween lists.\n\n- c\n- d");
        assert_eq!(html.matches("<ul class=\"mb-3\">").count(), 2);
        assert_eq!(html.matches("</ul>").count(), 2);
        assert!(html.contains("<p>Between lists.</p>"));
    }

    #[test]
    fn test_numbered_list_gets_ordered_container() {
        let html = format("1. one\n2. two\n10. ten");
        assert_eq!(
            html,
            "<ol class=\"mb-3\">\n<li>one</li>\n<li>two</li>\n<li>ten</li>\n</ol>"
        );
    }

    #[test]
    fn test_switching_list_kind_starts_new_list() {
        let html = format("- a\n1. b");
        assert!(html.contains("<ul class=\"mb-3\">\n<li>a</li>\n</ul>"));
        assert!(html.contains("<ol class=\"mb-3\">\n<li>b</li>\n</ol>"));
    }

    #[test]
    fn test_paragraph_lines_join_with_breaks() {
        assert_eq!(
            format("first line\nsecond line\n\nnext paragraph"),
            "<p>first line<br>second line</p>\n<p>next paragraph</p>"
        );
    }

    #[test]
    fn test_empty_content_still_has_block_wrapper() {
        assert_eq!(format(""), "<p></p>");
        assert_eq!(format("\n\n\n"), "<p></p>");
    }

    #[test]
    fn test_markup_is_not_escaped() {
        assert_eq!(format("a < b & c"), "<p>a < b & c</p>");
    }

    #[test]
    fn test_inline_markup_inside_header_and_list() {
        let html = format("## The **fast** path\n- *quick* win");
        assert!(html.contains(
            "<h2 class=\"text-primary fw-bold mt-4 mb-3\">The <strong>fast</strong> path</h2>"
        ));
        assert!(html.contains("<li><em>quick</em> win</li>"));
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(format("# Intro\r\n\r\nBody"), format("# Intro\n\nBody"));
    }

    #[test]
    fn test_intro_scenario() {
        let html = format("# Intro\n\nRust is fast.");
        assert_eq!(
            html,
            "<h1 class=\"text-primary fw-bold mt-4 mb-3\">Intro</h1>\n<p>Rust is fast.</p>"
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "# A\n\n**b** *c*\n- d\n1. e";
        assert_eq!(format(input), format(input));
    }

    #[test]
    fn test_reformatting_own_output_is_stable() {
        let inputs = [
            "",
            "# Intro\n\nRust is fast.",
            "- a\n- b\n\n1. c\n\ntext **bold**\nmore",
            "###### Deep\nplain",
        ];
        for input in inputs {
            let once = format(input);
            assert_eq!(format(&once), once, "double-wrapped output for {input:?}");
        }
    }

    #[test]
    fn test_parse_inline_runs() {
        assert_eq!(
            parse_inline("x **y** *z*"),
            vec![
                Inline::Text("x ".to_string()),
                Inline::Strong(vec![Inline::Text("y".to_string())]),
                Inline::Text(" ".to_string()),
                Inline::Emphasis(vec![Inline::Text("z".to_string())]),
            ]
        );
    }

    #[test]
    fn test_emphasis_inside_strong() {
        assert_eq!(
            format("**a *b* c**"),
            "<p><strong>a <em>b</em> c</strong></p>"
        );
    }

    #[test]
    fn test_emphasis_around_strong() {
        assert_eq!(
            format("*a **b** c*"),
            "<p><em>a <strong>b</strong> c</em></p>"
        );
        assert_eq!(
            parse_inline("*a **b** c*"),
            vec![Inline::Emphasis(vec![
                Inline::Text("a ".to_string()),
                Inline::Strong(vec![Inline::Text("b".to_string())]),
                Inline::Text(" c".to_string()),
            ])]
        );
    }

    #[test]
    fn test_crossing_markers_stay_literal() {
        assert_eq!(format("***x***"), "<p><strong>*x</strong>*</p>");
    }

    #[test]
    fn test_empty_markers_stay_literal() {
        assert_eq!(format("** and **"), "<p><strong> and </strong></p>");
        assert_eq!(format("a ** b"), "<p>a ** b</p>");
    }
}
