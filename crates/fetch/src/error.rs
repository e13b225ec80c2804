/// Which endpoint a failure came from. Canned messages differ slightly
/// between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Content,
    Metadata,
    Download,
}

impl Resource {
    fn not_found_message(self) -> &'static str {
        "File not found - it may have been deleted"
    }

    fn permission_message(self) -> &'static str {
        match self {
            Self::Content | Self::Download => "You don't have permission to view this file",
            Self::Metadata => "You don't have permission to preview this file",
        }
    }

    fn service_message(self) -> &'static str {
        match self {
            Self::Content | Self::Download => "Service unavailable - please try again later",
            Self::Metadata => "Server error occurred while loading file metadata",
        }
    }

    pub(crate) fn envelope_failure_message(self) -> &'static str {
        match self {
            Self::Content => "Failed to load file content",
            Self::Metadata => "Failed to load file metadata",
            Self::Download => "Download failed",
        }
    }
}

pub(crate) const NETWORK_MESSAGE: &str = "Network error - unable to connect to server";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NotFound,
    Permission,
    Service,
    Network,
    Api,
    Io,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// HTTP 404.
    #[error("{message}")]
    NotFound { message: String },
    /// HTTP 403.
    #[error("{message}")]
    Permission { message: String },
    /// HTTP 5xx.
    #[error("{message}")]
    Service { status: u16, message: String },
    /// No HTTP response at all (refused, DNS, TLS, timeout).
    #[error("{message}")]
    Network { message: String, detail: String },
    /// Any other non-2xx status, a `success: false` envelope, or a body
    /// that could not be decoded.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },
    /// Local write failure while saving a download.
    #[error("failed to write {path}: {message}")]
    Io { path: String, message: String },
}

impl FetchError {
    /// Maps a non-2xx status to its error. `server_message` is the
    /// `message` field of the error body, when one could be read.
    pub fn from_status(resource: Resource, status: u16, server_message: Option<String>) -> Self {
        if let Some(message) = &server_message {
            log::debug!("server rejected {resource:?} request with {status}: {message}");
        }

        match status {
            404 => Self::NotFound {
                message: resource.not_found_message().to_string(),
            },
            403 => Self::Permission {
                message: resource.permission_message().to_string(),
            },
            500..=599 => Self::Service {
                status,
                message: resource.service_message().to_string(),
            },
            _ => Self::Api {
                status: Some(status),
                message: server_message.unwrap_or_else(|| format!("HTTP {status}")),
            },
        }
    }

    pub fn network(detail: impl Into<String>) -> Self {
        Self::Network {
            message: NETWORK_MESSAGE.to_string(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NotFound { .. } => FetchErrorKind::NotFound,
            Self::Permission { .. } => FetchErrorKind::Permission,
            Self::Service { .. } => FetchErrorKind::Service,
            Self::Network { .. } => FetchErrorKind::Network,
            Self::Api { .. } => FetchErrorKind::Api,
            Self::Io { .. } => FetchErrorKind::Io,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Permission { .. } => Some(403),
            Self::Service { status, .. } => Some(*status),
            Self::Api { status, .. } => *status,
            Self::Network { .. } | Self::Io { .. } => None,
        }
    }

    /// Short heading for error panels.
    pub fn title(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::Network => "Connection Error",
            FetchErrorKind::Permission => "Access Denied",
            FetchErrorKind::NotFound => "File Not Found",
            FetchErrorKind::Service => "Service Unavailable",
            FetchErrorKind::Api | FetchErrorKind::Io => "Preview Error",
        }
    }

    /// Whether retrying the same request can plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FetchErrorKind::Network | FetchErrorKind::Service
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classified_statuses_use_canned_messages() {
        let err = FetchError::from_status(Resource::Content, 404, Some("gone".to_string()));
        assert_eq!(err.kind(), FetchErrorKind::NotFound);
        assert_eq!(err.to_string(), "File not found - it may have been deleted");

        let err = FetchError::from_status(Resource::Content, 403, None);
        assert_eq!(err.kind(), FetchErrorKind::Permission);
        assert_eq!(err.to_string(), "You don't have permission to view this file");

        let err = FetchError::from_status(Resource::Content, 503, None);
        assert_eq!(err.kind(), FetchErrorKind::Service);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Service unavailable - please try again later");
    }

    #[test]
    fn metadata_messages_differ() {
        let err = FetchError::from_status(Resource::Metadata, 500, None);
        assert_eq!(
            err.to_string(),
            "Server error occurred while loading file metadata"
        );
    }

    #[test]
    fn unclassified_status_prefers_server_message() {
        let err = FetchError::from_status(Resource::Content, 409, Some("Locked".to_string()));
        assert_eq!(err.kind(), FetchErrorKind::Api);
        assert_eq!(err.to_string(), "Locked");

        let err = FetchError::from_status(Resource::Content, 418, None);
        assert_eq!(err.to_string(), "HTTP 418");
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn network_errors_have_no_status() {
        let err = FetchError::network("connection refused");
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert_eq!(err.status(), None);
        assert_eq!(err.title(), "Connection Error");
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "Network error - unable to connect to server");
    }

    #[test]
    fn permission_is_not_retryable() {
        let err = FetchError::from_status(Resource::Content, 403, None);
        assert!(!err.is_retryable());
        assert_eq!(err.title(), "Access Denied");
    }
}
