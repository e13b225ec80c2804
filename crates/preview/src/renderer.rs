use std::sync::Arc;

use folio_fetch::{ContentSource, FetchError, FetchMode, FileId};
use folio_search::{MatchCursor, SearchResults, SearchState};

use crate::error::PreviewError;
use crate::lines::LineModel;
use crate::policy::PartialPreviewPolicy;
use crate::surface::PreviewSurface;
use crate::viewport::{RenderMode, ViewportPolicy};

const MISSING_CONTAINER: &str = "Container element is required";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Ask the server for the leading lines only.
    pub partial: bool,
}

/// A render that has been issued but not fetched yet.
///
/// The ticket is `Send`, so the fetch can run on any thread. Hand the result
/// back to [`TextRenderer::complete`] on the thread that owns the renderer.
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    file_id: FileId,
    fetch_mode: FetchMode,
    surface: PreviewSurface,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_id(&self) -> FileId {
        self.file_id
    }

    pub fn is_partial(&self) -> bool {
        matches!(self.fetch_mode, FetchMode::Partial { .. })
    }

    pub fn fetch(self, source: &dyn ContentSource) -> FetchedContent {
        let result = source.fetch_content(self.file_id, self.fetch_mode);
        FetchedContent {
            ticket: self,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FetchedContent {
    ticket: RenderTicket,
    result: Result<String, FetchError>,
}

impl FetchedContent {
    pub fn generation(&self) -> u64 {
        self.ticket.generation
    }

    pub fn file_id(&self) -> FileId {
        self.ticket.file_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Applied { mode: RenderMode, line_count: usize },
    /// A newer render was issued while this one was in flight.
    Discarded { generation: u64 },
}

/// Fetches a file's text and lays it out on a [`PreviewSurface`], with
/// search over the rendered lines.
pub struct TextRenderer {
    source: Arc<dyn ContentSource>,
    viewport: ViewportPolicy,
    partial: PartialPreviewPolicy,
    issued: u64,
    lines: Option<LineModel>,
    mode: Option<RenderMode>,
    surface: Option<PreviewSurface>,
    search: SearchState,
}

impl TextRenderer {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            viewport: ViewportPolicy::default(),
            partial: PartialPreviewPolicy::default(),
            issued: 0,
            lines: None,
            mode: None,
            surface: None,
            search: SearchState::new(),
        }
    }

    pub fn with_viewport_policy(mut self, viewport: ViewportPolicy) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_partial_policy(mut self, partial: PartialPreviewPolicy) -> Self {
        self.partial = partial;
        self
    }

    pub fn source(&self) -> Arc<dyn ContentSource> {
        Arc::clone(&self.source)
    }

    pub fn viewport_policy(&self) -> &ViewportPolicy {
        &self.viewport
    }

    pub fn partial_policy(&self) -> &PartialPreviewPolicy {
        &self.partial
    }

    /// Fetches and renders in one blocking call.
    pub fn render(
        &mut self,
        file_id: FileId,
        container: Option<&PreviewSurface>,
        options: RenderOptions,
    ) -> Result<RenderOutcome, PreviewError> {
        let ticket = self.begin_render(file_id, container, options)?;
        let fetched = ticket.fetch(self.source.as_ref());
        self.complete(fetched)
    }

    pub fn render_partial(
        &mut self,
        file_id: FileId,
        container: Option<&PreviewSurface>,
    ) -> Result<RenderOutcome, PreviewError> {
        self.render(file_id, container, RenderOptions { partial: true })
    }

    /// Issues a new render and makes every earlier one stale.
    pub fn begin_render(
        &mut self,
        file_id: FileId,
        container: Option<&PreviewSurface>,
        options: RenderOptions,
    ) -> Result<RenderTicket, PreviewError> {
        let surface = container
            .ok_or_else(|| PreviewError::InvalidArgument(MISSING_CONTAINER.to_string()))?;

        self.issued += 1;
        log::debug!(
            "render #{} issued for file {} (partial: {})",
            self.issued,
            file_id,
            options.partial
        );

        Ok(RenderTicket {
            generation: self.issued,
            file_id,
            fetch_mode: self.partial.fetch_mode(options.partial),
            surface: surface.clone(),
        })
    }

    pub fn is_latest(&self, generation: u64) -> bool {
        generation == self.issued
    }

    /// Applies a finished fetch.
    ///
    /// Fetch failures are returned whether or not the render is still the
    /// latest, and leave the surface untouched. A successful fetch that has
    /// been superseded is dropped.
    pub fn complete(&mut self, fetched: FetchedContent) -> Result<RenderOutcome, PreviewError> {
        let FetchedContent { ticket, result } = fetched;
        let content = result.inspect_err(|err| {
            log::warn!(
                "render #{} of file {} failed: {err}",
                ticket.generation,
                ticket.file_id
            );
        })?;

        if !self.is_latest(ticket.generation) {
            log::debug!(
                "discarding render #{} of file {}, #{} is newer",
                ticket.generation,
                ticket.file_id,
                self.issued
            );
            return Ok(RenderOutcome::Discarded {
                generation: ticket.generation,
            });
        }

        let partial = ticket.is_partial();
        let lines = LineModel::new(content);
        let line_count = lines.line_count();
        let mode = self.viewport.mode_for(line_count);
        let banner = (mode == RenderMode::Virtual)
            .then(|| self.partial.large_file_banner(line_count, partial));
        let notice = partial.then(|| self.partial.partial_notice());

        ticket
            .surface
            .install(lines.clone(), mode, self.viewport, banner, notice);
        log::info!(
            "rendered file {} ({line_count} lines, {mode:?})",
            ticket.file_id
        );

        self.search.clear();
        self.lines = Some(lines);
        self.mode = Some(mode);
        self.surface = Some(ticket.surface);

        Ok(RenderOutcome::Applied { mode, line_count })
    }

    pub fn line_model(&self) -> Option<&LineModel> {
        self.lines.as_ref()
    }

    pub fn render_mode(&self) -> Option<RenderMode> {
        self.mode
    }

    pub fn surface(&self) -> Option<&PreviewSurface> {
        self.surface.as_ref()
    }

    /// Replaces the match records for `query`. Returns the number of matches.
    pub fn search(&mut self, query: &str) -> usize {
        let lines = self.lines.as_ref();
        let line_count = lines.map_or(0, LineModel::line_count);
        self.search.search(query, line_count, |idx| {
            lines.and_then(|lines| lines.display_line(idx))
        })
    }

    pub fn next_match(&mut self) -> Option<MatchCursor> {
        self.search.next_match()
    }

    pub fn previous_match(&mut self) -> Option<MatchCursor> {
        self.search.previous_match()
    }

    pub fn current_match(&self) -> Option<MatchCursor> {
        self.search.current_match()
    }

    /// Makes the first match at or after `line` current.
    pub fn jump_to_nearest(&mut self, line: usize) -> Option<MatchCursor> {
        self.search.jump_to_nearest(line)
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn search_results(&self) -> &SearchResults {
        self.search.results()
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    /// Flips case sensitivity and re-runs the active query.
    pub fn toggle_case_sensitive(&mut self) -> usize {
        self.search.toggle_case_sensitive();
        self.rerun_search()
    }

    /// Flips regex matching and re-runs the active query.
    pub fn toggle_regex_mode(&mut self) -> usize {
        self.search.toggle_regex_mode();
        self.rerun_search()
    }

    fn rerun_search(&mut self) -> usize {
        let query = self.search.query().to_string();
        if query.is_empty() {
            return 0;
        }
        self.search(&query)
    }

    /// Scrolls the surface so the current match is visible.
    pub fn reveal_current_match(&self) -> bool {
        match (self.current_match(), &self.surface) {
            (Some(cursor), Some(surface)) => surface.reveal_line(cursor.record.line),
            _ => false,
        }
    }
}
