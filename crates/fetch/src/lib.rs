//! REST access to the archive's file explorer endpoints.

mod api;
mod client;
mod credentials;
mod error;

pub use api::{ApiEnvelope, FileMetadata};
pub use client::{ContentClient, ContentSource, FetchMode, FileId, unique_path};
pub use credentials::{CredentialProvider, SESSION_TOKEN_VAR, StaticCredentials, StoredCredentials};
pub use error::{FetchError, FetchErrorKind, Resource};
