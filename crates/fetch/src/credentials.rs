use std::path::PathBuf;

/// Environment variable holding a session-scoped bearer token.
pub const SESSION_TOKEN_VAR: &str = "FOLIO_TOKEN";

/// Supplies the bearer token for a request, if one is available.
///
/// Called once per request and never cached, so a token refreshed elsewhere
/// is picked up by the next call.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Two storage scopes: a persistent token file, then a session variable.
/// The persistent scope wins when both hold a token.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    token_file: Option<PathBuf>,
    session_var: String,
}

impl StoredCredentials {
    pub fn new(token_file: Option<PathBuf>) -> Self {
        Self {
            token_file,
            session_var: SESSION_TOKEN_VAR.to_string(),
        }
    }

    pub fn with_session_var(mut self, name: impl Into<String>) -> Self {
        self.session_var = name.into();
        self
    }

    fn persistent_token(&self) -> Option<String> {
        let path = self.token_file.as_ref()?;
        match std::fs::read_to_string(path) {
            Ok(contents) => non_blank(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                log::warn!("Failed to read token file {}: {}", path.display(), err);
                None
            }
        }
    }

    fn session_token(&self) -> Option<String> {
        std::env::var(&self.session_var)
            .ok()
            .and_then(|value| non_blank(&value))
    }
}

impl CredentialProvider for StoredCredentials {
    fn token(&self) -> Option<String> {
        self.persistent_token().or_else(|| self.session_token())
    }
}

/// Fixed token, mainly for tests and one-off commands.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(pub Option<String>);

impl CredentialProvider for StaticCredentials {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistent_token_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  abc123\n").unwrap();

        let creds = StoredCredentials::new(Some(path)).with_session_var("FOLIO_TEST_UNSET_VAR_1");
        assert_eq!(creds.token().as_deref(), Some("abc123"));
    }

    #[test]
    fn persistent_scope_wins_over_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "persistent").unwrap();

        let var = "FOLIO_TEST_SESSION_VAR_2";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "session") };

        let creds = StoredCredentials::new(Some(path.clone())).with_session_var(var);
        assert_eq!(creds.token().as_deref(), Some("persistent"));

        std::fs::remove_file(&path).unwrap();
        assert_eq!(creds.token().as_deref(), Some("session"));

        unsafe { std::env::remove_var(var) };
        assert_eq!(creds.token(), None);
    }

    #[test]
    fn blank_file_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "\n  \n").unwrap();

        let creds = StoredCredentials::new(Some(path)).with_session_var("FOLIO_TEST_UNSET_VAR_3");
        assert_eq!(creds.token(), None);
    }

    #[test]
    fn token_is_read_fresh_each_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let creds =
            StoredCredentials::new(Some(path.clone())).with_session_var("FOLIO_TEST_UNSET_VAR_4");
        assert_eq!(creds.token(), None);

        std::fs::write(&path, "fresh").unwrap();
        assert_eq!(creds.token().as_deref(), Some("fresh"));
    }
}
