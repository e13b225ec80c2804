use folio_preview::{
    LineModel, PreviewKind, RenderMode, SurfaceContent, format_file_size, group_thousands,
};
use ratatui::{
    layout::Position,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::highlight::{CodeHighlighter, SyntaxSpan};
use super::scrollbar::{self as preview_scrollbar, PreviewScrollbarLayout};
use super::{DownloadStatus, Panel, PreviewView};
use crate::ui::scrollbar::{self, ScrollbarPaintStyle};

const ACCENT: Color = Color::Rgb(122, 162, 247);
const MUTED: Color = Color::DarkGray;
const BANNER_BG: Color = Color::Rgb(52, 48, 30);
const MATCH_BG: Color = Color::Rgb(90, 80, 30);
const CURRENT_MATCH_BG: Color = Color::Rgb(224, 175, 60);

const SCROLLBAR_STYLE: ScrollbarPaintStyle = ScrollbarPaintStyle {
    track_symbol: "│",
    thumb_symbol: "┃",
    marker_symbol: "━",
    track_style: Style::new().fg(Color::Rgb(60, 60, 80)),
    thumb_style: Style::new().fg(Color::Rgb(150, 150, 170)),
    marker_style: Style::new().fg(Color::Rgb(160, 140, 60)),
    current_marker_style: Style::new().fg(CURRENT_MATCH_BG),
};

/// Where things landed on the last frame, for mouse hit-testing.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct FrameLayout {
    pub(super) content: Rect,
    pub(super) scrollbar: Option<Rect>,
    pub(super) scrollbar_layout: Option<PreviewScrollbarLayout>,
}

impl PreviewView {
    pub fn render(&mut self, f: &mut Frame) {
        let banners = self.banner_lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banners.len() as u16),
                Constraint::Min(0),
                Constraint::Length(u16::from(self.search_open)),
                Constraint::Length(1),
            ])
            .split(f.area());

        self.render_title(f, chunks[0]);
        if !banners.is_empty() {
            let banner = Paragraph::new(banners)
                .style(Style::default().bg(BANNER_BG).fg(Color::Yellow));
            f.render_widget(banner, chunks[1]);
        }

        if matches!(self.panel, Panel::Preview) {
            self.render_content(f, chunks[2]);
        } else {
            self.layout = FrameLayout::default();
            self.render_panel(f, chunks[2]);
        }

        if self.search_open {
            self.render_search_bar(f, chunks[3]);
        }
        self.render_footer(f, chunks[4]);
    }

    fn banner_lines(&self) -> Vec<Line<'static>> {
        if !matches!(self.panel, Panel::Preview) {
            return Vec::new();
        }
        let state = self.surface.state();
        state
            .large_file_banner()
            .into_iter()
            .chain(state.partial_notice())
            .map(|text| Line::from(format!(" {text}")))
            .collect()
    }

    fn render_title(&self, f: &mut Frame, area: Rect) {
        let mut details = Vec::new();
        if let Some(size) = self.metadata.as_ref().and_then(|m| m.file_size) {
            details.push(format_file_size(size));
        }
        match self.kind {
            PreviewKind::Code {
                language: Some(language),
            } => details.push(language.to_string()),
            PreviewKind::Code { language: None } => details.push("code".to_string()),
            PreviewKind::Text => details.push("text".to_string()),
            PreviewKind::Unsupported => {}
        }
        if matches!(self.panel, Panel::Preview) {
            let state = self.surface.state();
            details.push(format!("{} lines", group_thousands(state.line_count() as u64)));
            if state.render_mode() == Some(RenderMode::Virtual) {
                details.push("virtual".to_string());
            }
            if state.word_wrap() {
                details.push("wrap".to_string());
            }
        }
        if self.loading {
            details.push("loading...".to_string());
        }

        let title = Line::from(vec![
            Span::styled(format!(" {} ", self.file_name()), Style::default().fg(ACCENT).bold()),
            Span::styled(details.join(" · "), Style::default().fg(MUTED)),
        ]);
        f.render_widget(Paragraph::new(title), area);
    }

    fn render_content(&mut self, f: &mut Frame, area: Rect) {
        let [text_area, bar_area] = Layout::horizontal([Constraint::Min(0), Constraint::Length(1)])
            .areas(area);
        self.surface.set_viewport_height(f64::from(text_area.height));
        self.measure_wrap(text_area.width);

        let state = self.surface.state();
        let highlighter = &mut self.highlighter;
        refresh_highlighter(highlighter, self.kind, state.lines());
        let mut syntax = |idx: usize| -> Vec<SyntaxSpan> {
            highlighter
                .as_mut()
                .map(|highlighter| highlighter.spans(idx).to_vec())
                .unwrap_or_default()
        };

        let results = self.renderer.search_results();
        let current = results.current().map(|cursor| cursor.record);
        let gutter_width = state.line_count().to_string().len();
        let visible_rows = usize::from(text_area.height);
        let row_height = state.policy().row_height.max(f64::EPSILON);

        let current_on = |idx: usize| {
            current
                .filter(|record| record.line == idx)
                .map(|record| (record.start, record.end))
        };

        let paragraph = match state.content() {
            SurfaceContent::Empty => Paragraph::new(""),
            SurfaceContent::Standard(view) => {
                let lines = view.lines();
                let top_row = (view.scroll_top() / row_height).floor() as usize;
                let (first, skip) = view.line_at_row(top_row);
                // Every line takes at least one row.
                let text: Vec<Line> = (first..lines.line_count())
                    .take(visible_rows + 1)
                    .filter_map(|idx| {
                        let text = lines.display_line(idx)?;
                        Some(highlighted_line(
                            idx,
                            text,
                            gutter_width,
                            &syntax(idx),
                            results.ranges_for_line(idx),
                            current_on(idx),
                        ))
                    })
                    .collect();
                let paragraph = Paragraph::new(text);
                if state.word_wrap() {
                    paragraph
                        .wrap(Wrap { trim: false })
                        .scroll((u16::try_from(skip).unwrap_or(u16::MAX), 0))
                } else {
                    paragraph
                }
            }
            SurfaceContent::Virtual(view) => {
                let window = view.window();
                let skip = ((view.scroll_top() - window.offset_top) / row_height).round() as usize;
                let text: Vec<Line> = view
                    .rows()
                    .iter()
                    .enumerate()
                    .skip(skip)
                    .take(visible_rows)
                    .map(|(offset, row)| {
                        let idx = window.start + offset;
                        highlighted_line(
                            idx,
                            row,
                            gutter_width,
                            &syntax(idx),
                            results.ranges_for_line(idx),
                            current_on(idx),
                        )
                    })
                    .collect();
                Paragraph::new(text)
            }
        };
        f.render_widget(paragraph, text_area);

        let layout = preview_scrollbar::compute_layout(
            state.scroll_top(),
            state.scroll_height(),
            state.viewport_height(),
            state.line_count(),
            f32::from(bar_area.height),
        );
        if let Some(layout) = layout {
            let limit = preview_scrollbar::marker_top_limit(layout.metrics.track_height);
            let marker_tops = preview_scrollbar::deduped_marker_tops(
                results.matches().iter().map(|record| record.line),
                layout.line_count,
                limit,
            );
            let current_top = current.map(|record| {
                preview_scrollbar::marker_top_for_line(record.line, layout.line_count, limit)
            });
            scrollbar::render_vertical(
                f.buffer_mut(),
                bar_area,
                layout.metrics,
                &SCROLLBAR_STYLE,
                &marker_tops,
                current_top,
            );
        }
        drop(state);

        self.layout = FrameLayout {
            content: text_area,
            scrollbar: layout.map(|_| bar_area),
            scrollbar_layout: layout,
        };
    }

    /// Counts the rows each line soft-wraps to when the text width changed
    /// since the last measurement.
    fn measure_wrap(&self, width: u16) {
        let rows: Vec<usize> = {
            let state = self.surface.state();
            let SurfaceContent::Standard(view) = state.content() else {
                return;
            };
            if !state.word_wrap() || view.wrap_width() == Some(usize::from(width)) {
                return;
            }
            let lines = view.lines();
            let gutter_width = lines.line_count().to_string().len();
            (0..lines.line_count())
                .map(|idx| {
                    let text = lines.display_line(idx).unwrap_or_default();
                    Paragraph::new(Line::from(vec![
                        Span::raw(gutter(idx, gutter_width)),
                        Span::raw(text),
                    ]))
                    .wrap(Wrap { trim: false })
                    .line_count(width)
                })
                .collect()
        };
        self.surface.set_wrap_layout(usize::from(width), rows);
    }

    fn render_panel(&self, f: &mut Frame, area: Rect) {
        let hint = |key: &'static str, label: String| {
            Line::from(vec![
                Span::styled(format!("  {key}  "), Style::default().fg(ACCENT).bold()),
                Span::raw(label),
            ])
        };

        let (title, border, lines): (&str, Color, Vec<Line>) = match &self.panel {
            Panel::Preview => return,
            Panel::Loading(message) => (" Loading ", MUTED, vec![Line::from(*message)]),
            Panel::LargeFileWarning { size } => {
                let policy = self.partial_policy();
                (
                    " Large File Warning ",
                    Color::Yellow,
                    vec![
                        Line::from(policy.warning_message(*size)),
                        Line::from("Loading it may be slow."),
                        Line::default(),
                        hint(
                            "p",
                            format!("Quick preview (first {} lines)", policy.line_cap),
                        ),
                        hint("f", "Load the full file anyway".to_string()),
                        hint("d", "Download instead".to_string()),
                    ],
                )
            }
            Panel::Unsupported => (
                " Preview Not Available ",
                MUTED,
                vec![
                    Line::from("This file type can't be previewed as text."),
                    Line::default(),
                    hint("d", "Download the file".to_string()),
                ],
            ),
            Panel::Error(err) => {
                let mut lines = vec![
                    Line::from(Span::styled(err.title(), Style::default().bold())),
                    Line::from(err.to_string()),
                    Line::default(),
                    hint("r", "Retry".to_string()),
                ];
                if !err.is_retryable() {
                    lines.push(hint("d", "Try downloading instead".to_string()));
                }
                (" Error ", Color::Red, lines)
            }
        };

        let height = (lines.len() as u16 + 2).min(area.height);
        let width = area.width.min(72);
        let panel_area = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };

        let panel = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border))
                    .title(title)
                    .title_style(Style::default().bold()),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(panel, panel_area);
    }

    fn render_search_bar(&self, f: &mut Frame, area: Rect) {
        let search = self.renderer.search_state();
        let status = if let Some(err) = search.error() {
            Span::styled(format!(" {err} "), Style::default().fg(Color::Red))
        } else if self.search_input.is_empty() {
            Span::raw("")
        } else {
            match search.results().position() {
                Some((index, total)) => Span::raw(format!(" {index} of {total} ")),
                None => Span::styled(" No matches ", Style::default().fg(MUTED)),
            }
        };
        let flag = |label: &'static str, on: bool| {
            if on {
                Span::styled(label, Style::default().fg(ACCENT).bold())
            } else {
                Span::styled(label, Style::default().fg(MUTED))
            }
        };

        let [input_area, status_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(40)]).areas(area);
        let input = Paragraph::new(Line::from(vec![
            Span::styled("/", Style::default().fg(ACCENT)),
            Span::raw(self.search_input.text()),
        ]));
        f.render_widget(input, input_area);

        let status = Paragraph::new(Line::from(vec![
            status,
            flag("Aa", search.is_case_sensitive()),
            Span::raw(" "),
            flag(".*", search.mode() == folio_search::SearchMode::Regex),
        ]))
        .alignment(Alignment::Right);
        f.render_widget(status, status_area);

        let cursor_x = input_area.x + 1 + self.search_input.cursor_column() as u16;
        f.set_cursor_position(Position::new(
            cursor_x.min(input_area.right().saturating_sub(1)),
            input_area.y,
        ));
    }

    fn render_footer(&self, f: &mut Frame, area: Rect) {
        let text = match &self.download {
            Some(DownloadStatus::InProgress { downloaded, total }) if *total > 0 => format!(
                " Downloading... {} / {}",
                format_file_size(*downloaded),
                format_file_size(*total)
            ),
            Some(DownloadStatus::InProgress { downloaded, .. }) => {
                format!(" Downloading... {}", format_file_size(*downloaded))
            }
            Some(DownloadStatus::Saved { path, bytes }) => {
                format!(" Saved {} ({})", path.display(), format_file_size(*bytes))
            }
            Some(DownloadStatus::Failed(message)) => format!(" Download failed: {message}"),
            None => self.key_hints().to_string(),
        };
        let help = Paragraph::new(text).style(Style::default().fg(MUTED));
        f.render_widget(help, area);
    }

    fn key_hints(&self) -> &'static str {
        if self.search_open {
            return " Enter/Down: Next | Up: Previous | Alt-c: Case | Alt-r: Regex | Esc: Close ";
        }
        match self.panel {
            Panel::Preview => {
                " q: Quit | j/k PgUp/PgDn g/G: Scroll | /: Search | n/N: Next/Prev | w: Wrap | r: Reload | d: Download "
            }
            _ => " q: Quit ",
        }
    }
}

/// Keeps `highlighter` colouring the code currently on the surface.
fn refresh_highlighter(
    highlighter: &mut Option<CodeHighlighter>,
    kind: PreviewKind,
    lines: Option<&LineModel>,
) {
    let (
        PreviewKind::Code {
            language: Some(language),
        },
        Some(lines),
    ) = (kind, lines)
    else {
        *highlighter = None;
        return;
    };
    if !highlighter
        .as_ref()
        .is_some_and(|current| current.is_for(lines))
    {
        *highlighter = CodeHighlighter::new(language, lines.clone());
    }
}

fn gutter(idx: usize, gutter_width: usize) -> String {
    format!("{:>gutter_width$} ", idx + 1)
}

/// A gutter with the 1-based line number, then `text` coloured by `syntax`
/// with match ranges painted over it. All ranges are byte offsets into
/// `text`.
fn highlighted_line<'a>(
    idx: usize,
    text: &'a str,
    gutter_width: usize,
    syntax: &[SyntaxSpan],
    ranges: &[(usize, usize)],
    current: Option<(usize, usize)>,
) -> Line<'a> {
    let mut spans = vec![Span::styled(
        gutter(idx, gutter_width),
        Style::default().fg(MUTED),
    )];

    let mut matches: Vec<SyntaxSpan> = Vec::with_capacity(ranges.len());
    let mut cursor = 0;
    for &(start, end) in ranges {
        let start = start.min(text.len());
        let end = end.min(text.len());
        if start < cursor || start >= end {
            continue;
        }
        let bg = if current == Some((start, end)) {
            CURRENT_MATCH_BG
        } else {
            MATCH_BG
        };
        matches.push((start, end, bg));
        cursor = end;
    }

    let mut cuts: Vec<usize> = syntax
        .iter()
        .chain(&matches)
        .flat_map(|&(start, end, _)| [start, end])
        .chain([0, text.len()])
        .filter(|&cut| cut <= text.len() && text.is_char_boundary(cut))
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let piece = &text[start..end];
        let covers = |&&(from, to, _): &&SyntaxSpan| from <= start && end <= to;
        let span = if let Some(&(_, _, bg)) = matches.iter().find(covers) {
            Span::styled(piece, Style::default().bg(bg).fg(Color::White))
        } else if let Some(&(_, _, fg)) = syntax.iter().find(covers) {
            Span::styled(piece, Style::default().fg(fg))
        } else {
            Span::raw(piece)
        };
        spans.push(span);
    }

    Line::from(spans)
}
