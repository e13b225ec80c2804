use crate::ui::scrollbar;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct PreviewScrollbarLayout {
    pub(super) range: scrollbar::ScrollbarRange,
    pub(super) metrics: scrollbar::ScrollbarMetrics,
    pub(super) line_count: usize,
}

/// Scrollbar geometry for a surface, or `None` when nothing overflows.
/// Surface geometry is narrowed to cell precision here.
pub(super) fn compute_layout(
    scroll_top: f64,
    scroll_height: f64,
    viewport_height: f64,
    line_count: usize,
    track_height: f32,
) -> Option<PreviewScrollbarLayout> {
    if line_count == 0 || track_height <= f32::EPSILON || viewport_height <= f64::EPSILON {
        return None;
    }

    let range = scrollbar::ScrollbarRange {
        offset: scroll_top as f32,
        max_offset: (scroll_height - viewport_height).max(0.0) as f32,
        viewport_extent: viewport_height as f32,
        track_extent: track_height,
    };
    let metrics = scrollbar::compute_metrics(range, 1.0)?;

    Some(PreviewScrollbarLayout {
        range,
        metrics,
        line_count,
    })
}

pub(super) fn marker_top_limit(track_height: f32) -> f32 {
    (track_height - 1.0).max(0.0)
}

pub(super) fn marker_top_for_line(line: usize, line_count: usize, marker_top_limit: f32) -> f32 {
    if marker_top_limit <= f32::EPSILON {
        return 0.0;
    }

    let max_index = line_count.saturating_sub(1) as f32;
    if max_index <= f32::EPSILON {
        return 0.0;
    }

    (line.min(line_count.saturating_sub(1)) as f32 / max_index) * marker_top_limit
}

/// One marker per track cell, however many matches land on it.
pub(super) fn deduped_marker_tops<I>(lines: I, line_count: usize, marker_top_limit: f32) -> Vec<f32>
where
    I: IntoIterator<Item = usize>,
{
    let mut marker_tops = Vec::new();
    let mut last_bucket = None;

    for line in lines {
        let top = marker_top_for_line(line, line_count, marker_top_limit);
        let bucket = top.round() as i32;
        if last_bucket == Some(bucket) {
            continue;
        }
        last_bucket = Some(bucket);
        marker_tops.push(top);
    }

    marker_tops
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_preview::SearchMatch;
    use folio_search::SearchResults;

    #[test]
    fn no_layout_without_overflow() {
        assert!(compute_layout(0.0, 20.0, 40.0, 20, 40.0).is_none());
        assert!(compute_layout(0.0, 2000.0, 40.0, 2000, 40.0).is_some());
    }

    #[test]
    fn marker_top_for_line_maps_bounds() {
        let limit = 39.0;
        assert_eq!(marker_top_for_line(0, 1500, limit), 0.0);
        assert_eq!(marker_top_for_line(1499, 1500, limit), limit);
        assert_eq!(marker_top_for_line(9999, 1500, limit), limit);
        assert_eq!(marker_top_for_line(0, 1, limit), 0.0);
    }

    #[test]
    fn marker_top_follows_current_after_jump_to_nearest() {
        let mut results = SearchResults::from_matches(vec![
            SearchMatch::new(40, 0, 1),
            SearchMatch::new(800, 0, 1),
            SearchMatch::new(1200, 0, 1),
        ]);
        results.jump_to_nearest(900);
        let current = results.current().expect("current match expected");

        let limit = 30.0;
        assert_eq!(
            marker_top_for_line(current.record.line, 1500, limit),
            marker_top_for_line(1200, 1500, limit)
        );
    }

    #[test]
    fn deduped_marker_tops_collapse_adjacent_lines() {
        let tops = deduped_marker_tops([10, 11, 12, 900], 1500, 20.0);
        assert_eq!(tops.len(), 2);
    }
}
