//! Incremental text search for Folio previews.

mod engine;
mod matcher;
mod state;

pub use engine::{SearchConfig, SearchEngine, SearchMode};
pub use matcher::{MatchCursor, SearchMatch, SearchResults};
pub use state::SearchState;
