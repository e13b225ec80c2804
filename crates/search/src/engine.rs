use regex::{Regex, RegexBuilder};

use crate::matcher::{SearchMatch, SearchResults};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Literal,
    Regex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            mode: SearchMode::Literal,
        }
    }
}

/// Compiles a query once and runs it over lines of text.
pub struct SearchEngine {
    config: SearchConfig,
    pattern: String,
    matcher: Option<Regex>,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            pattern: String::new(),
            matcher: None,
        }
    }

    /// Compiles `pattern` for subsequent searches.
    ///
    /// Blank patterns (empty or whitespace only) leave the engine without a
    /// pattern, so every search yields nothing.
    pub fn set_pattern(&mut self, pattern: &str) -> Result<(), String> {
        let blank = pattern.trim().is_empty();
        if pattern == self.pattern && (blank || self.matcher.is_some()) {
            return Ok(());
        }

        self.pattern = pattern.to_string();
        self.matcher = None;
        if blank {
            return Ok(());
        }

        self.matcher = Some(compile(pattern, self.config).map_err(|err| err.to_string())?);
        Ok(())
    }

    /// Switches case or mode and recompiles the current pattern.
    pub fn set_config(&mut self, config: SearchConfig) -> Result<(), String> {
        if self.config == config {
            return Ok(());
        }

        self.config = config;
        let pattern = std::mem::take(&mut self.pattern);
        self.set_pattern(&pattern)
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn has_pattern(&self) -> bool {
        self.matcher.is_some()
    }

    /// Finds every non-overlapping occurrence in one line, left to right.
    /// Zero-width regex matches are skipped.
    pub fn search_line(&self, line_idx: usize, text: &str) -> Vec<SearchMatch> {
        self.matcher
            .iter()
            .flat_map(|matcher| matcher.find_iter(text))
            .filter(|found| !found.is_empty())
            .map(|found| SearchMatch::new(line_idx, found.start(), found.end()))
            .collect()
    }

    /// Scans lines `0..line_count` in order and collects all matches.
    pub fn search<'a, F>(&self, line_count: usize, line_provider: F) -> SearchResults
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        if !self.has_pattern() {
            return SearchResults::new();
        }

        let matches = (0..line_count)
            .filter_map(|idx| line_provider(idx).map(|text| (idx, text)))
            .flat_map(|(idx, text)| self.search_line(idx, text))
            .collect();
        SearchResults::from_matches(matches)
    }
}

/// Literal queries are escaped so they can share the regex matcher.
fn compile(pattern: &str, config: SearchConfig) -> Result<Regex, regex::Error> {
    let source = match config.mode {
        SearchMode::Literal => regex::escape(pattern),
        SearchMode::Regex => pattern.to_string(),
    };
    RegexBuilder::new(&source)
        .case_insensitive(!config.case_sensitive)
        .build()
}
