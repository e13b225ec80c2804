use folio_fetch::{FetchError, FetchErrorKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// The caller broke the renderer's contract (for example no container).
    #[error("{0}")]
    InvalidArgument(String),
    /// Fetch failures pass through unchanged.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl PreviewError {
    pub fn fetch_kind(&self) -> Option<FetchErrorKind> {
        match self {
            Self::Fetch(err) => Some(err.kind()),
            Self::InvalidArgument(_) => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Fetch(err) => err.title(),
            Self::InvalidArgument(_) => "Preview Error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(err) if err.is_retryable())
    }
}
