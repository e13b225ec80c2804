//! Render-mode selection and virtual window geometry.
//!
//! Heights are in layout units (pixels for a graphical host, cells for a
//! terminal). Only ratios matter.

pub const DEFAULT_VIRTUAL_SCROLL_THRESHOLD: usize = 1000;
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;
pub const DEFAULT_OVERSCAN_ROWS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Every line rendered in one block.
    Standard,
    /// Only the rows inside the viewport are rendered.
    Virtual,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportPolicy {
    /// Line counts above this switch to [`RenderMode::Virtual`].
    pub threshold: usize,
    pub row_height: f64,
    /// Rows rendered beyond each edge of the visible window.
    pub overscan_rows: usize,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_VIRTUAL_SCROLL_THRESHOLD,
            row_height: DEFAULT_ROW_HEIGHT,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
        }
    }
}

/// Lines `start..end` are materialized and drawn `offset_top` from the top
/// of the scroll region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VirtualWindow {
    pub start: usize,
    pub end: usize,
    pub offset_top: f64,
}

impl VirtualWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end
    }
}

impl ViewportPolicy {
    pub fn mode_for(&self, line_count: usize) -> RenderMode {
        if line_count > self.threshold {
            RenderMode::Virtual
        } else {
            RenderMode::Standard
        }
    }

    fn row_height(&self) -> f64 {
        self.row_height.max(f64::EPSILON)
    }

    /// Full height of all lines, as if every one were rendered.
    pub fn spacer_height(&self, line_count: usize) -> f64 {
        line_count as f64 * self.row_height()
    }

    pub fn max_scroll_top(&self, line_count: usize, viewport_height: f64) -> f64 {
        (self.spacer_height(line_count) - viewport_height.max(0.0)).max(0.0)
    }

    pub fn clamp_scroll_top(&self, scroll_top: f64, line_count: usize, viewport_height: f64) -> f64 {
        if !scroll_top.is_finite() {
            return 0.0;
        }
        scroll_top.clamp(0.0, self.max_scroll_top(line_count, viewport_height))
    }

    /// Rows that fit in the viewport, rounded up so a partially visible
    /// bottom row is still rendered.
    pub fn visible_rows(&self, viewport_height: f64) -> usize {
        ((viewport_height.max(0.0) / self.row_height()).ceil() as usize).max(1)
    }

    pub fn window(&self, scroll_top: f64, viewport_height: f64, line_count: usize) -> VirtualWindow {
        let scroll_top = self.clamp_scroll_top(scroll_top, line_count, viewport_height);
        let first_visible = ((scroll_top / self.row_height()).floor() as usize).min(line_count);
        let start = first_visible.saturating_sub(self.overscan_rows);
        let end = first_visible
            .saturating_add(self.visible_rows(viewport_height))
            .saturating_add(self.overscan_rows)
            .min(line_count);

        VirtualWindow {
            start,
            end,
            offset_top: start as f64 * self.row_height(),
        }
    }

    /// Scroll position that brings `line` into view, moving as little as
    /// possible. Returns `current` when the line is already fully visible.
    pub fn scroll_top_revealing(
        &self,
        line: usize,
        current: f64,
        viewport_height: f64,
        line_count: usize,
    ) -> f64 {
        self.scroll_top_revealing_rows(line, 1, current, viewport_height, line_count)
    }

    /// Like [`ViewportPolicy::scroll_top_revealing`] for a block `span` rows
    /// tall starting at `first_row`, out of `row_count` rows. A block taller
    /// than the viewport is aligned to its top.
    pub fn scroll_top_revealing_rows(
        &self,
        first_row: usize,
        span: usize,
        current: f64,
        viewport_height: f64,
        row_count: usize,
    ) -> f64 {
        let row_height = self.row_height();
        let top = first_row as f64 * row_height;
        let bottom = top + span.max(1) as f64 * row_height;
        let target = if top < current || bottom - top > viewport_height {
            top
        } else if bottom > current + viewport_height {
            bottom - viewport_height
        } else {
            current
        };
        self.clamp_scroll_top(target, row_count, viewport_height)
    }
}

/// Coalesces scroll events so the window is recomputed at most once per
/// frame. Only the latest position survives.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameThrottle {
    pending: Option<f64>,
}

impl FrameThrottle {
    pub fn record(&mut self, scroll_top: f64) {
        self.pending = Some(scroll_top);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take(&mut self) -> Option<f64> {
        self.pending.take()
    }
}
