//! Syntax colouring for code previews.

use std::sync::LazyLock;

use folio_preview::LineModel;
use ratatui::style::Color;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

const THEME_NAME: &str = "base16-ocean.dark";

/// Parse state has to be carried from the top of the file, so lines past
/// this are left uncoloured.
const MAX_HIGHLIGHTED_LINES: usize = 20_000;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

static THEME: LazyLock<Theme> = LazyLock::new(|| {
    let mut theme_set = ThemeSet::load_defaults();
    theme_set
        .themes
        .remove(THEME_NAME)
        .or_else(|| theme_set.themes.into_values().next())
        .unwrap_or_default()
});

/// Foreground colour for bytes `start..end` of a display line.
pub(super) type SyntaxSpan = (usize, usize, Color);

/// Lazily colours the lines of one file, in order, as they are first drawn.
pub(super) struct CodeHighlighter {
    lines: LineModel,
    highlighter: HighlightLines<'static>,
    spans: Vec<Vec<SyntaxSpan>>,
}

impl CodeHighlighter {
    /// `None` when no bundled grammar knows `language`.
    pub(super) fn new(language: &str, lines: LineModel) -> Option<Self> {
        let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
        Some(Self {
            lines,
            highlighter: HighlightLines::new(syntax, &THEME),
            spans: Vec::new(),
        })
    }

    pub(super) fn is_for(&self, lines: &LineModel) -> bool {
        self.lines.same_content(lines)
    }

    /// Colours for `line`, highlighting every line above it first.
    pub(super) fn spans(&mut self, line: usize) -> &[SyntaxSpan] {
        let target = (line + 1)
            .min(self.lines.line_count())
            .min(MAX_HIGHLIGHTED_LINES);
        while self.spans.len() < target {
            let text = self.lines.display_line(self.spans.len()).unwrap_or_default();
            let spans = highlight_line(&mut self.highlighter, text);
            self.spans.push(spans);
        }
        self.spans.get(line).map(Vec::as_slice).unwrap_or_default()
    }
}

fn highlight_line(highlighter: &mut HighlightLines<'static>, text: &str) -> Vec<SyntaxSpan> {
    let with_newline = format!("{text}\n");
    let tokens = match highlighter.highlight_line(&with_newline, &SYNTAX_SET) {
        Ok(tokens) => tokens,
        Err(err) => {
            log::debug!("syntax highlighting failed: {err}");
            return Vec::new();
        }
    };

    let mut spans = Vec::with_capacity(tokens.len());
    let mut start = 0;
    for (style, token) in tokens {
        let end = (start + token.len()).min(text.len());
        if start < end {
            let fg = style.foreground;
            spans.push((start, end, Color::Rgb(fg.r, fg.g, fg.b)));
        }
        start += token.len();
    }
    spans
}
