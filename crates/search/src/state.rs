use crate::engine::{SearchConfig, SearchEngine, SearchMode};
use crate::matcher::{MatchCursor, SearchResults};

/// The query, its compiled engine and the matches it produced over the
/// current document.
pub struct SearchState {
    engine: SearchEngine,
    results: SearchResults,
    query: String,
    error: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            engine: SearchEngine::new(SearchConfig::default()),
            results: SearchResults::new(),
            query: String::new(),
            error: None,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Runs `query` over `line_count` lines and replaces the results.
    ///
    /// Never fails: a blank query or a pattern that does not compile leaves
    /// zero matches (the compile error is kept for display).
    pub fn search<'a, F>(&mut self, query: &str, line_count: usize, line_provider: F) -> usize
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        if query.trim().is_empty() {
            self.clear();
            return 0;
        }

        self.query = query.to_string();
        self.error = self.engine.set_pattern(query).err();
        self.results = self.engine.search(line_count, line_provider);
        self.results.count()
    }

    /// Drops every match and the query. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.query.clear();
        let _ = self.engine.set_pattern("");
        self.results = SearchResults::new();
        self.error = None;
    }

    pub fn results(&self) -> &SearchResults {
        &self.results
    }

    /// Why the last regex query did not compile.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Flips case sensitivity. Results go stale; callers re-run `search`.
    pub fn toggle_case_sensitive(&mut self) {
        let mut config = self.config();
        config.case_sensitive = !config.case_sensitive;
        self.apply_config(config);
    }

    /// Flips between literal and regex matching. Results go stale; callers
    /// re-run `search`.
    pub fn toggle_regex_mode(&mut self) {
        let mut config = self.config();
        config.mode = match config.mode {
            SearchMode::Literal => SearchMode::Regex,
            SearchMode::Regex => SearchMode::Literal,
        };
        self.apply_config(config);
    }

    fn apply_config(&mut self, config: SearchConfig) {
        self.error = self.engine.set_config(config).err();
    }

    pub fn config(&self) -> SearchConfig {
        self.engine.config()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.engine.config().case_sensitive
    }

    pub fn mode(&self) -> SearchMode {
        self.engine.config().mode
    }

    pub fn current_match(&self) -> Option<MatchCursor> {
        self.results.current()
    }

    pub fn next_match(&mut self) -> Option<MatchCursor> {
        self.results.next()
    }

    pub fn previous_match(&mut self) -> Option<MatchCursor> {
        self.results.previous()
    }

    pub fn jump_to_nearest(&mut self, line: usize) -> Option<MatchCursor> {
        self.results.jump_to_nearest(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINES: [&str; 3] = ["Test one", "nothing here", "test TEST tEsT"];

    fn run(state: &mut SearchState, query: &str) -> usize {
        state.search(query, LINES.len(), |idx| LINES.get(idx).copied())
    }

    #[test]
    fn search_is_case_insensitive() {
        let mut state = SearchState::new();
        let upper = run(&mut state, "TEST");
        let lower = run(&mut state, "test");
        assert_eq!(upper, 4);
        assert_eq!(upper, lower);
        assert_eq!(state.current_match().unwrap().index, 0);
    }

    #[test]
    fn blank_query_clears_previous_results() {
        let mut state = SearchState::new();
        assert_eq!(run(&mut state, "test"), 4);
        assert_eq!(run(&mut state, "   "), 0);
        assert!(state.results().is_empty());
        assert!(state.current_match().is_none());
        assert_eq!(state.query(), "");
    }

    #[test]
    fn no_match_leaves_no_current() {
        let mut state = SearchState::new();
        assert_eq!(run(&mut state, "nonexistentword12345"), 0);
        assert!(state.current_match().is_none());
        assert!(state.next_match().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut state = SearchState::new();
        run(&mut state, "test");
        state.clear();
        let once = (state.results().count(), state.results().current_index());
        state.clear();
        let twice = (state.results().count(), state.results().current_index());
        assert_eq!(once, (0, None));
        assert_eq!(once, twice);
    }

    #[test]
    fn invalid_regex_degrades_to_zero_matches() {
        let mut state = SearchState::new();
        state.toggle_regex_mode();
        assert_eq!(state.mode(), SearchMode::Regex);
        assert_eq!(run(&mut state, "[oops"), 0);
        assert!(state.error().is_some());
        assert_eq!(run(&mut state, "t.st"), 4);
        assert!(state.error().is_none());
    }

    #[test]
    fn toggle_case_sensitive_is_reported() {
        let mut state = SearchState::new();
        assert!(!state.is_case_sensitive());
        state.toggle_case_sensitive();
        assert!(state.is_case_sensitive());
        assert_eq!(run(&mut state, "test"), 1);
    }
}
