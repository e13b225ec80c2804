use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::lines::LineModel;
use crate::viewport::{FrameThrottle, RenderMode, ViewportPolicy, VirtualWindow};

const DEFAULT_VIEWPORT_HEIGHT: f64 = 600.0;

/// Visual rows per line once soft-wrapped at `width` columns.
///
/// `tops[i]` is the first row of line `i`; the final entry is the total.
#[derive(Debug, Clone)]
struct WrapLayout {
    width: usize,
    tops: Vec<usize>,
}

impl WrapLayout {
    fn new(width: usize, rows_per_line: impl IntoIterator<Item = usize>) -> Self {
        let mut tops = vec![0];
        let mut total = 0usize;
        for rows in rows_per_line {
            total = total.saturating_add(rows.max(1));
            tops.push(total);
        }
        Self { width, tops }
    }

    fn total_rows(&self) -> usize {
        self.tops.last().copied().unwrap_or(0)
    }
}

/// Whole-file rendering.
///
/// Scroll positions count visual rows. Until a wrap layout is measured every
/// line is one row tall.
#[derive(Debug, Clone)]
pub struct StandardView {
    lines: LineModel,
    scroll_top: f64,
    wrap: Option<WrapLayout>,
}

impl StandardView {
    fn new(lines: LineModel) -> Self {
        Self {
            lines,
            scroll_top: 0.0,
            wrap: None,
        }
    }

    pub fn lines(&self) -> &LineModel {
        &self.lines
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Column width the current wrap layout was measured at.
    pub fn wrap_width(&self) -> Option<usize> {
        self.wrap.as_ref().map(|layout| layout.width)
    }

    pub fn row_count(&self) -> usize {
        match &self.wrap {
            Some(layout) => layout.total_rows(),
            None => self.lines.line_count(),
        }
    }

    /// First visual row of `line`.
    pub fn line_top(&self, line: usize) -> usize {
        match &self.wrap {
            Some(layout) => layout.tops[line.min(layout.tops.len() - 1)],
            None => line.min(self.lines.line_count()),
        }
    }

    /// Visual rows `line` occupies.
    pub fn line_rows(&self, line: usize) -> usize {
        match &self.wrap {
            Some(layout) if line + 1 < layout.tops.len() => {
                layout.tops[line + 1] - layout.tops[line]
            }
            _ => 1,
        }
    }

    /// The line covering visual `row` and how many of its rows lie above
    /// `row`. Rows past the end map to the last line.
    pub fn line_at_row(&self, row: usize) -> (usize, usize) {
        let last = self.lines.line_count().saturating_sub(1);
        match &self.wrap {
            Some(layout) => {
                let line = layout
                    .tops
                    .partition_point(|&top| top <= row)
                    .saturating_sub(1)
                    .min(last);
                let within = row.saturating_sub(layout.tops[line]);
                (line, within.min(self.line_rows(line) - 1))
            }
            None => (row.min(last), 0),
        }
    }
}

/// Windowed rendering of a large file.
///
/// `rows` is a pool of line buffers reused across scrolls; only the first
/// `visible` entries belong to the current window.
#[derive(Debug)]
pub struct VirtualView {
    lines: LineModel,
    window: VirtualWindow,
    scroll_top: f64,
    rows: Vec<String>,
    visible: usize,
}

impl VirtualView {
    fn new(lines: LineModel, policy: &ViewportPolicy, viewport_height: f64) -> Self {
        let mut view = Self {
            lines,
            window: VirtualWindow {
                start: 0,
                end: 0,
                offset_top: 0.0,
            },
            scroll_top: 0.0,
            rows: Vec::new(),
            visible: 0,
        };
        view.refill(policy, 0.0, viewport_height, true);
        view
    }

    pub fn lines(&self) -> &LineModel {
        &self.lines
    }

    pub fn window(&self) -> VirtualWindow {
        self.window
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    /// Text of the lines in [`VirtualView::window`], in order.
    pub fn rows(&self) -> &[String] {
        &self.rows[..self.visible]
    }

    /// Recomputes the window and replaces the visible rows. Returns whether
    /// the window moved.
    fn refill(
        &mut self,
        policy: &ViewportPolicy,
        scroll_top: f64,
        viewport_height: f64,
        force: bool,
    ) -> bool {
        let line_count = self.lines.line_count();
        self.scroll_top = policy.clamp_scroll_top(scroll_top, line_count, viewport_height);
        let window = policy.window(self.scroll_top, viewport_height, line_count);
        if !force && window == self.window {
            return false;
        }

        self.window = window;
        self.visible = 0;
        for line_idx in window.start..window.end {
            let text = self.lines.display_line(line_idx).unwrap_or_default();
            match self.rows.get_mut(self.visible) {
                Some(row) => {
                    row.clear();
                    row.push_str(text);
                }
                None => self.rows.push(text.to_string()),
            }
            self.visible += 1;
        }
        true
    }
}

#[derive(Debug, Default)]
pub enum SurfaceContent {
    #[default]
    Empty,
    Standard(StandardView),
    Virtual(VirtualView),
}

#[derive(Debug)]
pub struct SurfaceState {
    content: SurfaceContent,
    policy: ViewportPolicy,
    large_file_banner: Option<String>,
    partial_notice: Option<String>,
    word_wrap: bool,
    viewport_height: f64,
    throttle: FrameThrottle,
    /// Set by scrolling to the end; geometry changes keep the view there.
    pinned_to_bottom: bool,
}

impl SurfaceState {
    fn new(word_wrap: bool) -> Self {
        Self {
            content: SurfaceContent::Empty,
            policy: ViewportPolicy::default(),
            large_file_banner: None,
            partial_notice: None,
            word_wrap,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            throttle: FrameThrottle::default(),
            pinned_to_bottom: false,
        }
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    pub fn render_mode(&self) -> Option<RenderMode> {
        match self.content {
            SurfaceContent::Empty => None,
            SurfaceContent::Standard(_) => Some(RenderMode::Standard),
            SurfaceContent::Virtual(_) => Some(RenderMode::Virtual),
        }
    }

    pub fn lines(&self) -> Option<&LineModel> {
        match &self.content {
            SurfaceContent::Empty => None,
            SurfaceContent::Standard(view) => Some(&view.lines),
            SurfaceContent::Virtual(view) => Some(&view.lines),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines().map_or(0, LineModel::line_count)
    }

    pub fn scroll_top(&self) -> f64 {
        match &self.content {
            SurfaceContent::Empty => 0.0,
            SurfaceContent::Standard(view) => view.scroll_top,
            SurfaceContent::Virtual(view) => view.scroll_top,
        }
    }

    /// Visual rows in the scrollable region. Differs from
    /// [`SurfaceState::line_count`] only for wrapped standard content.
    pub fn row_count(&self) -> usize {
        match &self.content {
            SurfaceContent::Standard(view) => view.row_count(),
            _ => self.line_count(),
        }
    }

    /// The line at the top edge of the viewport.
    pub fn first_visible_line(&self) -> usize {
        let row = (self.scroll_top() / self.policy.row_height.max(f64::EPSILON)).floor() as usize;
        match &self.content {
            SurfaceContent::Empty => 0,
            SurfaceContent::Standard(view) => view.line_at_row(row).0,
            SurfaceContent::Virtual(view) => row.min(view.lines.line_count().saturating_sub(1)),
        }
    }

    /// Height of the scrollable region. In virtual mode this is the spacer.
    pub fn scroll_height(&self) -> f64 {
        self.policy.spacer_height(self.row_count())
    }

    fn max_scroll_top(&self) -> f64 {
        self.policy.max_scroll_top(self.row_count(), self.viewport_height)
    }

    pub fn policy(&self) -> &ViewportPolicy {
        &self.policy
    }

    pub fn large_file_banner(&self) -> Option<&str> {
        self.large_file_banner.as_deref()
    }

    pub fn partial_notice(&self) -> Option<&str> {
        self.partial_notice.as_deref()
    }

    pub fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Falls back to one row per line, keeping the top line in place.
    fn drop_wrap_layout(&mut self) {
        let anchor = self.first_visible_line();
        let row_height = self.policy.row_height.max(f64::EPSILON);
        if let SurfaceContent::Standard(view) = &mut self.content
            && view.wrap.take().is_some()
        {
            self.throttle.take();
            self.settle(anchor as f64 * row_height);
        }
    }

    /// Re-applies a scroll position after the geometry changed.
    fn settle(&mut self, scroll_top: f64) -> bool {
        if self.pinned_to_bottom {
            self.apply_scroll(f64::MAX)
        } else {
            self.apply_scroll(scroll_top)
        }
    }

    fn apply_scroll(&mut self, scroll_top: f64) -> bool {
        let max = self.max_scroll_top();
        self.pinned_to_bottom = scroll_top > max || (max > 0.0 && scroll_top >= max);
        let policy = self.policy;
        let viewport_height = self.viewport_height;
        match &mut self.content {
            SurfaceContent::Empty => false,
            SurfaceContent::Standard(view) => {
                let clamped =
                    policy.clamp_scroll_top(scroll_top, view.row_count(), viewport_height);
                let changed = clamped != view.scroll_top;
                view.scroll_top = clamped;
                changed
            }
            SurfaceContent::Virtual(view) => {
                let before = view.scroll_top;
                let moved = view.refill(&policy, scroll_top, viewport_height, false);
                moved || view.scroll_top != before
            }
        }
    }
}

/// Render target owned by one renderer at a time. Cloning yields another
/// handle to the same surface.
#[derive(Debug, Clone)]
pub struct PreviewSurface {
    inner: Arc<Mutex<SurfaceState>>,
}

impl Default for PreviewSurface {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PreviewSurface {
    pub fn new(word_wrap: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SurfaceState::new(word_wrap))),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, SurfaceState> {
        self.inner.lock()
    }

    pub fn same_surface(&self, other: &PreviewSurface) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn render_mode(&self) -> Option<RenderMode> {
        self.state().render_mode()
    }

    pub fn large_file_banner(&self) -> Option<String> {
        self.state().large_file_banner.clone()
    }

    pub fn partial_notice(&self) -> Option<String> {
        self.state().partial_notice.clone()
    }

    /// Resizes the viewport and re-renders the window immediately.
    pub fn set_viewport_height(&self, viewport_height: f64) {
        let mut state = self.state();
        let viewport_height = viewport_height.max(0.0);
        if state.viewport_height == viewport_height {
            return;
        }
        state.viewport_height = viewport_height;
        let scroll_top = if state.pinned_to_bottom {
            f64::MAX
        } else {
            state.scroll_top()
        };
        let policy = state.policy;
        if let SurfaceContent::Virtual(view) = &mut state.content {
            view.refill(&policy, scroll_top, viewport_height, true);
        } else {
            state.apply_scroll(scroll_top);
        }
    }

    /// Queues a scroll position. It takes effect on the next
    /// [`PreviewSurface::flush_frame`].
    pub fn on_scroll(&self, scroll_top: f64) {
        self.state().throttle.record(scroll_top);
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.state().throttle.has_pending()
    }

    /// Applies the latest queued scroll position, if any. Returns whether
    /// anything visible changed.
    pub fn flush_frame(&self) -> bool {
        let mut state = self.state();
        match state.throttle.take() {
            Some(scroll_top) => state.apply_scroll(scroll_top),
            None => false,
        }
    }

    /// Scrolls immediately, bypassing the frame throttle.
    pub fn scroll_to(&self, scroll_top: f64) -> bool {
        let mut state = self.state();
        state.throttle.take();
        state.apply_scroll(scroll_top)
    }

    /// Queues a relative scroll on top of any pending one.
    pub fn scroll_by(&self, delta: f64) {
        let mut state = self.state();
        let pending = state.throttle.take();
        let base = pending.unwrap_or_else(|| state.scroll_top());
        let max = state.max_scroll_top();
        state.throttle.record((base + delta).clamp(0.0, max));
    }

    /// Scrolls just enough to show `line`, including all of its wrapped rows
    /// when they fit.
    pub fn reveal_line(&self, line: usize) -> bool {
        let mut state = self.state();
        state.throttle.take();
        let (first_row, span) = match &state.content {
            SurfaceContent::Standard(view) => (view.line_top(line), view.line_rows(line)),
            _ => (line, 1),
        };
        let target = state.policy.scroll_top_revealing_rows(
            first_row,
            span,
            state.scroll_top(),
            state.viewport_height,
            state.row_count(),
        );
        state.apply_scroll(target)
    }

    /// Installs the visual row count of every line of standard content
    /// soft-wrapped at `width` columns. The line at the top of the viewport
    /// stays there; a view scrolled to the end stays at the end.
    ///
    /// Ignored while word wrap is off or in virtual mode.
    pub fn set_wrap_layout(&self, width: usize, rows_per_line: impl IntoIterator<Item = usize>) {
        let mut state = self.state();
        if !state.word_wrap {
            return;
        }
        let anchor = state.first_visible_line();
        let row_height = state.policy.row_height.max(f64::EPSILON);

        let SurfaceContent::Standard(view) = &mut state.content else {
            return;
        };
        let layout = WrapLayout::new(width, rows_per_line);
        if layout.tops.len() != view.lines.line_count() + 1 {
            log::warn!(
                "Ignoring wrap layout for {} lines, content has {}",
                layout.tops.len() - 1,
                view.lines.line_count()
            );
            return;
        }
        view.wrap = Some(layout);
        let target = view.line_top(anchor) as f64 * row_height;
        state.settle(target);
    }

    pub fn set_word_wrap(&self, word_wrap: bool) {
        let mut state = self.state();
        if state.word_wrap != word_wrap {
            state.word_wrap = word_wrap;
            state.drop_wrap_layout();
        }
    }

    pub fn toggle_word_wrap(&self) -> bool {
        let mut state = self.state();
        state.word_wrap = !state.word_wrap;
        state.drop_wrap_layout();
        state.word_wrap
    }

    pub fn clear(&self) {
        let mut state = self.state();
        state.content = SurfaceContent::Empty;
        state.pinned_to_bottom = false;
        state.large_file_banner = None;
        state.partial_notice = None;
        state.throttle.take();
    }

    /// Replaces everything on the surface with `lines` in `mode`.
    pub(crate) fn install(
        &self,
        lines: LineModel,
        mode: RenderMode,
        policy: ViewportPolicy,
        large_file_banner: Option<String>,
        partial_notice: Option<String>,
    ) {
        let mut state = self.state();
        let viewport_height = state.viewport_height;
        state.policy = policy;
        state.throttle.take();
        state.pinned_to_bottom = false;
        state.content = match mode {
            RenderMode::Standard => SurfaceContent::Standard(StandardView {
                lines,
                scroll_top: 0.0,
                wrap: None,
            }),
            RenderMode::Virtual => {
                SurfaceContent::Virtual(VirtualView::new(lines, &policy, viewport_height))
            }
        };
        state.large_file_banner = large_file_banner;
        state.partial_notice = partial_notice;
    }
}
