use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{FetchError, Resource};

/// The `{ success, data, message }` wrapper every JSON endpoint returns.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn into_data(self, resource: Resource, status: u16) -> Result<T, FetchError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(FetchError::Api {
                status: Some(status),
                message: self
                    .message
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or_else(|| resource.envelope_failure_message().to_string()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: u64,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub uploader_name: Option<String>,
    #[serde(default)]
    pub uploader_email: Option<String>,
    #[serde(default)]
    pub department_name: Option<String>,
    #[serde(default)]
    pub previewable: bool,
    #[serde(default)]
    pub preview_type: Option<String>,
}

impl FileMetadata {
    /// Best name to show: display name, then the uploaded name.
    pub fn display_name(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .or(self.original_filename.as_deref())
    }

    /// A file name that is safe to create in the current directory.
    pub fn suggested_file_name(&self) -> String {
        let cleaned: String = self
            .display_name()
            .unwrap_or_default()
            .chars()
            .map(|ch| match ch {
                '/' | '\\' | ':' | '\0' => '_',
                other => other,
            })
            .collect();
        let cleaned = cleaned.trim().trim_start_matches('.');
        if cleaned.is_empty() {
            format!("file-{}", self.id)
        } else {
            cleaned.to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<NestedError>,
}

#[derive(Debug, Deserialize)]
struct NestedError {
    #[serde(default)]
    message: Option<String>,
}

/// Pulls a human message out of an error response body, if it has one.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .message
        .or_else(|| parsed.error.and_then(|nested| nested.message))
        .filter(|message| !message.trim().is_empty())
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(
    resource: Resource,
    status: u16,
    body: &str,
) -> Result<T, FetchError> {
    let envelope: ApiEnvelope<T> = serde_json::from_str(body).map_err(|err| {
        log::warn!("undecodable {resource:?} response: {err}");
        FetchError::Api {
            status: Some(status),
            message: format!("Invalid response from server: {err}"),
        }
    })?;
    envelope.into_data(resource, status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchErrorKind;

    #[test]
    fn successful_envelope_yields_data() {
        let text: String =
            decode_envelope(Resource::Content, 200, r#"{"success":true,"data":"a\nb"}"#).unwrap();
        assert_eq!(text, "a\nb");
    }

    #[test]
    fn empty_content_is_still_content() {
        let text: String =
            decode_envelope(Resource::Content, 200, r#"{"success":true,"data":""}"#).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn failed_envelope_uses_server_message() {
        let err = decode_envelope::<String>(
            Resource::Content,
            200,
            r#"{"success":false,"message":"File is archived"}"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Api);
        assert_eq!(err.to_string(), "File is archived");
    }

    #[test]
    fn failed_envelope_without_message_uses_fallback() {
        let err = decode_envelope::<String>(Resource::Content, 200, r#"{"success":false}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to load file content");

        let err = decode_envelope::<String>(Resource::Content, 200, r#"{"success":true}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to load file content");
    }

    #[test]
    fn garbage_body_is_an_api_error() {
        let err = decode_envelope::<String>(Resource::Content, 200, "<html>").unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Api);
        assert!(err.to_string().starts_with("Invalid response from server"));
    }

    #[test]
    fn metadata_decodes_camel_case() {
        let body = r#"{"success":true,"data":{
            "id":42,"fileName":"notes.txt","mimeType":"text/plain",
            "fileSize":7340032,"previewable":true,"previewType":"text"
        }}"#;
        let meta: FileMetadata = decode_envelope(Resource::Metadata, 200, body).unwrap();
        assert_eq!(meta.id, 42);
        assert_eq!(meta.display_name(), Some("notes.txt"));
        assert_eq!(meta.mime_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.file_size, Some(7_340_032));
        assert!(meta.previewable);
        assert!(meta.uploader_name.is_none());
    }

    #[test]
    fn suggested_file_names_stay_local() {
        let named = |name: Option<&str>| FileMetadata {
            id: 7,
            file_name: name.map(str::to_string),
            original_filename: None,
            mime_type: None,
            file_size: None,
            upload_date: None,
            uploader_name: None,
            uploader_email: None,
            department_name: None,
            previewable: true,
            preview_type: None,
        };
        assert_eq!(named(Some("report.txt")).suggested_file_name(), "report.txt");
        assert_eq!(named(Some("../etc/passwd")).suggested_file_name(), "_etc_passwd");
        assert_eq!(named(Some("a\\b:c")).suggested_file_name(), "a_b_c");
        assert_eq!(named(Some(" .. ")).suggested_file_name(), "file-7");
        assert_eq!(named(None).suggested_file_name(), "file-7");
    }

    #[test]
    fn error_message_extraction() {
        assert_eq!(
            extract_error_message(r#"{"message":"nope"}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"nested"}}"#).as_deref(),
            Some("nested")
        );
        assert_eq!(extract_error_message(r#"{"message":""}"#), None);
        assert_eq!(extract_error_message("not json"), None);
    }
}
