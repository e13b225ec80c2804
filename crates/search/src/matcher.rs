/// One located occurrence. `start` and `end` are byte offsets into the line,
/// `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl SearchMatch {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    pub fn contains(&self, line: usize, offset: usize) -> bool {
        self.line == line && offset >= self.start && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Position of the active match, as returned by navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCursor {
    pub index: usize,
    pub total: usize,
    pub record: SearchMatch,
}

/// Matches in document order plus the active one.
///
/// `spans` mirrors `matches` so a line's highlight ranges can be handed out
/// as a slice without another allocation per frame.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    matches: Vec<SearchMatch>,
    spans: Vec<(usize, usize)>,
    current_index: Option<usize>,
}

impl SearchResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds results from matches already in (line, start) order. The first
    /// match becomes current.
    pub fn from_matches(matches: Vec<SearchMatch>) -> Self {
        let spans = matches.iter().map(|m| (m.start, m.end)).collect();
        let current_index = (!matches.is_empty()).then_some(0);
        Self {
            matches,
            spans,
            current_index,
        }
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current(&self) -> Option<MatchCursor> {
        self.cursor_at(self.current_index?)
    }

    /// 1-based position and total, for "3 of 12" style labels.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current_index.map(|i| (i + 1, self.count()))
    }

    /// Advances to the next match, wrapping from the last to the first.
    pub fn next(&mut self) -> Option<MatchCursor> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        self.jump_to(self.current_index.map_or(0, |i| (i + 1) % total))
    }

    /// Steps back one match, wrapping from the first to the last.
    pub fn previous(&mut self) -> Option<MatchCursor> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        self.jump_to(self.current_index.map_or(total - 1, |i| (i + total - 1) % total))
    }

    pub fn jump_to(&mut self, index: usize) -> Option<MatchCursor> {
        let cursor = self.cursor_at(index)?;
        self.current_index = Some(index);
        Some(cursor)
    }

    /// Selects the first match on or after `target_line`, wrapping to the
    /// first match when none follows.
    pub fn jump_to_nearest(&mut self, target_line: usize) -> Option<MatchCursor> {
        if self.is_empty() {
            return None;
        }
        let index = self.first_on_or_after(target_line);
        self.jump_to(if index < self.count() { index } else { 0 })
    }

    /// Byte ranges of every match on `line`, left to right.
    pub fn ranges_for_line(&self, line: usize) -> &[(usize, usize)] {
        &self.spans[self.first_on_or_after(line)..self.first_on_or_after(line + 1)]
    }

    /// Matches on lines `min_line..=max_line`.
    pub fn matches_in_range(&self, min_line: usize, max_line: usize) -> &[SearchMatch] {
        if min_line > max_line {
            return &[];
        }
        &self.matches[self.first_on_or_after(min_line)..self.first_on_or_after(max_line + 1)]
    }

    fn first_on_or_after(&self, line: usize) -> usize {
        self.matches.partition_point(|m| m.line < line)
    }

    fn cursor_at(&self, index: usize) -> Option<MatchCursor> {
        self.matches.get(index).map(|record| MatchCursor {
            index,
            total: self.count(),
            record: *record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_matches() -> SearchResults {
        SearchResults::from_matches(vec![
            SearchMatch::new(0, 0, 5),
            SearchMatch::new(1, 10, 15),
            SearchMatch::new(2, 5, 10),
        ])
    }

    #[test]
    fn test_search_match_contains() {
        let m = SearchMatch::new(5, 10, 15);
        assert!(m.contains(5, 10));
        assert!(m.contains(5, 14));
        assert!(!m.contains(5, 15));
        assert!(!m.contains(5, 9));
        assert!(!m.contains(4, 12));
    }

    #[test]
    fn test_empty_results() {
        let mut results = SearchResults::new();
        assert!(results.is_empty());
        assert_eq!(results.count(), 0);
        assert!(results.current().is_none());
        assert!(results.position().is_none());
        assert!(results.next().is_none());
        assert!(results.previous().is_none());
        assert!(results.current_index().is_none());
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut results = three_matches();

        assert_eq!(results.position(), Some((1, 3)));
        assert_eq!(results.current().unwrap().record.line, 0);

        assert_eq!(results.next().unwrap().index, 1);
        assert_eq!(results.next().unwrap().index, 2);
        assert_eq!(results.next().unwrap().index, 0);

        let prev = results.previous().unwrap();
        assert_eq!(prev.index, 2);
        assert_eq!(prev.total, 3);
        assert_eq!(prev.record, SearchMatch::new(2, 5, 10));
    }

    #[test]
    fn test_next_cycles_back_after_count_steps() {
        for total in 1..6 {
            let matches = (0..total).map(|line| SearchMatch::new(line, 0, 1)).collect();
            let mut results = SearchResults::from_matches(matches);
            let mut last = None;
            for _ in 0..total {
                last = results.next();
            }
            assert_eq!(last.unwrap().index, 0);
        }
    }

    #[test]
    fn test_jump_to_nearest() {
        let mut results = SearchResults::from_matches(vec![
            SearchMatch::new(2, 0, 5),
            SearchMatch::new(5, 0, 5),
            SearchMatch::new(9, 0, 5),
        ]);

        assert_eq!(results.jump_to_nearest(3).unwrap().record.line, 5);
        assert_eq!(results.jump_to_nearest(9).unwrap().record.line, 9);
        assert_eq!(results.jump_to_nearest(100).unwrap().record.line, 2);
    }

    #[test]
    fn test_ranges_for_line() {
        let results = SearchResults::from_matches(vec![
            SearchMatch::new(1, 0, 2),
            SearchMatch::new(1, 4, 6),
            SearchMatch::new(3, 1, 2),
        ]);

        assert_eq!(results.ranges_for_line(1), &[(0, 2), (4, 6)]);
        assert!(results.ranges_for_line(2).is_empty());
        assert!(results.current().unwrap().record.contains(1, 1));
        assert_eq!(results.matches_in_range(2, 3).len(), 1);
    }
}
