use ratatui::{buffer::Buffer, layout::Rect, style::Style};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarRange {
    pub offset: f32,
    pub max_offset: f32,
    pub viewport_extent: f32,
    pub track_extent: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarMetrics {
    pub thumb_top: f32,
    pub thumb_height: f32,
    pub travel: f32,
    pub track_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollbarPaintStyle {
    pub track_symbol: &'static str,
    pub thumb_symbol: &'static str,
    pub marker_symbol: &'static str,
    pub track_style: Style,
    pub thumb_style: Style,
    pub marker_style: Style,
    pub current_marker_style: Style,
}

pub fn compute_metrics(range: ScrollbarRange, min_thumb_height: f32) -> Option<ScrollbarMetrics> {
    let viewport_extent = range.viewport_extent;
    let track_extent = range.track_extent;
    if viewport_extent <= f32::EPSILON || track_extent <= f32::EPSILON {
        return None;
    }

    let max_offset = range.max_offset.max(0.0);
    if max_offset <= f32::EPSILON {
        return None;
    }

    let offset = range.offset.clamp(0.0, max_offset);
    let content_extent = viewport_extent + max_offset;
    let thumb_height = ((viewport_extent / content_extent) * track_extent)
        .clamp(min_thumb_height.max(1.0).min(track_extent), track_extent);
    let travel = (track_extent - thumb_height).max(0.0);
    let thumb_top = if travel <= f32::EPSILON {
        0.0
    } else {
        (offset / max_offset) * travel
    };

    Some(ScrollbarMetrics {
        thumb_top,
        thumb_height,
        travel,
        track_height: track_extent,
    })
}

pub fn offset_from_track_click(
    click_y: f32,
    range: ScrollbarRange,
    metrics: ScrollbarMetrics,
) -> f32 {
    let top = (click_y - (metrics.thumb_height * 0.5)).clamp(0.0, metrics.travel);
    offset_from_thumb_top(top, range, metrics)
}

pub fn offset_from_thumb_top(
    thumb_top: f32,
    range: ScrollbarRange,
    metrics: ScrollbarMetrics,
) -> f32 {
    let max_offset = range.max_offset.max(0.0);
    if max_offset <= f32::EPSILON || metrics.travel <= f32::EPSILON {
        return 0.0;
    }

    (thumb_top.clamp(0.0, metrics.travel) / metrics.travel) * max_offset
}

/// Paints a one-column scrollbar into `area`. Marker tops are track-relative
/// cell rows; the current marker is drawn last so it wins ties.
pub fn render_vertical(
    buf: &mut Buffer,
    area: Rect,
    metrics: ScrollbarMetrics,
    style: &ScrollbarPaintStyle,
    marker_tops: &[f32],
    current_marker_top: Option<f32>,
) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let x = area.x;
    let thumb_start = metrics.thumb_top.round() as u16;
    let thumb_end = (metrics.thumb_top + metrics.thumb_height).round().max(1.0) as u16;

    for row in 0..area.height {
        let (symbol, cell_style) = if row >= thumb_start && row < thumb_end {
            (style.thumb_symbol, style.thumb_style)
        } else {
            (style.track_symbol, style.track_style)
        };
        buf[(x, area.y + row)].set_symbol(symbol).set_style(cell_style);
    }

    let max_row = area.height - 1;
    for top in marker_tops {
        let row = (top.round() as u16).min(max_row);
        buf[(x, area.y + row)]
            .set_symbol(style.marker_symbol)
            .set_style(style.marker_style);
    }
    if let Some(top) = current_marker_top {
        let row = (top.round() as u16).min(max_row);
        buf[(x, area.y + row)]
            .set_symbol(style.marker_symbol)
            .set_style(style.current_marker_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_none_without_overflow() {
        let range = ScrollbarRange {
            offset: 0.0,
            max_offset: 0.0,
            viewport_extent: 40.0,
            track_extent: 40.0,
        };
        assert!(compute_metrics(range, 1.0).is_none());
    }

    #[test]
    fn metrics_enforce_min_thumb_height() {
        let range = ScrollbarRange {
            offset: 100.0,
            max_offset: 10_000.0,
            viewport_extent: 20.0,
            track_extent: 20.0,
        };
        let metrics = compute_metrics(range, 2.0).expect("expected metrics");
        assert!(metrics.thumb_height >= 2.0);
        assert!(metrics.thumb_top >= 0.0);
        assert!(metrics.thumb_top <= metrics.travel);
    }

    #[test]
    fn thumb_reaches_the_bottom_at_max_offset() {
        let range = ScrollbarRange {
            offset: 1_480.0,
            max_offset: 1_480.0,
            viewport_extent: 20.0,
            track_extent: 20.0,
        };
        let metrics = compute_metrics(range, 1.0).expect("expected metrics");
        assert_eq!(metrics.thumb_top + metrics.thumb_height, 20.0);
    }

    #[test]
    fn click_and_drag_offsets_clamp_to_range() {
        let range = ScrollbarRange {
            offset: 0.0,
            max_offset: 300.0,
            viewport_extent: 24.0,
            track_extent: 24.0,
        };
        let metrics = compute_metrics(range, 1.0).expect("expected metrics");

        let from_click = offset_from_track_click(1_000.0, range, metrics);
        assert!(from_click <= range.max_offset);

        let from_drag = offset_from_thumb_top(-20.0, range, metrics);
        assert!(from_drag >= 0.0);
    }

    #[test]
    fn paints_thumb_and_markers() {
        let area = Rect::new(0, 0, 1, 10);
        let mut buf = Buffer::empty(area);
        let metrics = ScrollbarMetrics {
            thumb_top: 0.0,
            thumb_height: 2.0,
            travel: 8.0,
            track_height: 10.0,
        };
        let style = ScrollbarPaintStyle {
            track_symbol: "│",
            thumb_symbol: "█",
            marker_symbol: "─",
            track_style: Style::default(),
            thumb_style: Style::default(),
            marker_style: Style::default(),
            current_marker_style: Style::default(),
        };

        render_vertical(&mut buf, area, metrics, &style, &[5.0, 42.0], None);

        assert_eq!(buf[(0, 0)].symbol(), "█");
        assert_eq!(buf[(0, 1)].symbol(), "█");
        assert_eq!(buf[(0, 2)].symbol(), "│");
        assert_eq!(buf[(0, 5)].symbol(), "─");
        assert_eq!(buf[(0, 9)].symbol(), "─");
    }
}
