use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::api::{FileMetadata, decode_envelope, extract_error_message};
use crate::credentials::CredentialProvider;
use crate::error::{FetchError, Resource};

pub type FileId = u64;

const USER_AGENT: &str = concat!("Folio/", env!("CARGO_PKG_VERSION"));
const FILES_PATH: &str = "/api/file-explorer/files";

/// How much of a file to ask the server for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Full,
    /// Server-side cap on the number of leading lines returned.
    Partial { max_lines: usize },
}

/// Anything that can produce the text content of a file.
pub trait ContentSource: Send + Sync {
    fn fetch_content(&self, file_id: FileId, mode: FetchMode) -> Result<String, FetchError>;
}

pub struct ContentClient {
    base_url: String,
    agent: ureq::Agent,
    credentials: Arc<dyn CredentialProvider>,
}

impl ContentClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .user_agent(USER_AGENT)
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn file_url(&self, file_id: FileId, endpoint: &str) -> String {
        format!("{}{}/{}/{}", self.base_url, FILES_PATH, file_id, endpoint)
    }

    fn request(&self, url: &str) -> ureq::Request {
        let request = self.agent.get(url).set("Accept", "application/json");
        match self.credentials.token() {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(&self, request: ureq::Request, resource: Resource) -> Result<ureq::Response, FetchError> {
        let url = request.url().to_string();
        log::debug!("GET {url}");

        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let server_message = response
                    .into_string()
                    .ok()
                    .and_then(|body| extract_error_message(&body));
                log::warn!("GET {url} failed with HTTP {status}");
                Err(FetchError::from_status(resource, status, server_message))
            }
            Err(ureq::Error::Transport(transport)) => {
                log::warn!("GET {url} failed: {transport}");
                Err(FetchError::network(transport.to_string()))
            }
        }
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        request: ureq::Request,
        resource: Resource,
    ) -> Result<T, FetchError> {
        let response = self.send(request, resource)?;
        let status = response.status();
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|err| FetchError::network(format!("Failed to read response body: {err}")))?;
        decode_envelope(resource, status, &body)
    }

    pub fn fetch_metadata(&self, file_id: FileId) -> Result<FileMetadata, FetchError> {
        let request = self.request(&self.file_url(file_id, "metadata"));
        self.get_json(request, Resource::Metadata)
    }

    /// Streams the raw file to `dest`, replacing whatever is there, and
    /// reports `(downloaded, total)` bytes. `total` is 0 when the server
    /// sends no Content-Length.
    ///
    /// Bytes land in a temporary file next to `dest`, which only takes
    /// `dest`'s name once the whole body has arrived.
    pub fn download_to(
        &self,
        file_id: FileId,
        dest: &Path,
        progress_tx: Option<flume::Sender<(u64, u64)>>,
    ) -> Result<u64, FetchError> {
        let (temp, downloaded) = self.download_to_temp(file_id, dest, progress_tx)?;
        temp.persist(dest).map_err(|err| io_error(dest, err.error))?;

        log::info!("Downloaded file {} ({} bytes) to {}", file_id, downloaded, dest.display());
        Ok(downloaded)
    }

    /// Like [`ContentClient::download_to`], but never replaces an existing
    /// file: the first free name out of `suggested`, `stem (1).ext`,
    /// `stem (2).ext`... is used. Returns where the file was saved.
    pub fn download_new(
        &self,
        file_id: FileId,
        suggested: &Path,
        progress_tx: Option<flume::Sender<(u64, u64)>>,
    ) -> Result<(PathBuf, u64), FetchError> {
        let (mut temp, downloaded) = self.download_to_temp(file_id, suggested, progress_tx)?;
        loop {
            let dest = unique_path(suggested);
            match temp.persist_noclobber(&dest) {
                Ok(_) => {
                    log::info!(
                        "Downloaded file {} ({} bytes) to {}",
                        file_id,
                        downloaded,
                        dest.display()
                    );
                    return Ok((dest, downloaded));
                }
                // Someone else took the name in the meantime.
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => temp = err.file,
                Err(err) => return Err(io_error(&dest, err.error)),
            }
        }
    }

    /// Dropping the returned file deletes it.
    fn download_to_temp(
        &self,
        file_id: FileId,
        dest: &Path,
        progress_tx: Option<flume::Sender<(u64, u64)>>,
    ) -> Result<(NamedTempFile, u64), FetchError> {
        let request = self
            .request(&self.file_url(file_id, "download"))
            .set("Accept", "*/*");
        let response = self.send(request, Resource::Download)?;

        let total: u64 = response
            .header("Content-Length")
            .and_then(|h| h.parse().ok())
            .unwrap_or(0);

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".folio-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|err| io_error(dest, err))?;

        let mut reader = response.into_reader();
        let mut downloaded: u64 = 0;
        let mut buf = [0u8; 65536];

        loop {
            let n = reader
                .read(&mut buf)
                .map_err(|err| FetchError::network(format!("Failed to read download stream: {err}")))?;
            if n == 0 {
                break;
            }
            temp.write_all(&buf[..n]).map_err(|err| io_error(dest, err))?;
            downloaded += n as u64;
            if let Some(tx) = &progress_tx {
                let _ = tx.try_send((downloaded, total));
            }
        }
        temp.flush().map_err(|err| io_error(dest, err))?;

        Ok((temp, downloaded))
    }
}

fn io_error(path: &Path, err: io::Error) -> FetchError {
    FetchError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// `path` when nothing exists there yet, otherwise the first free
/// `stem (n).ext` next to it.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned());

    (1..u32::MAX)
        .map(|n| {
            path.with_file_name(match &extension {
                Some(ext) => format!("{stem} ({n}).{ext}"),
                None => format!("{stem} ({n})"),
            })
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

impl ContentSource for ContentClient {
    fn fetch_content(&self, file_id: FileId, mode: FetchMode) -> Result<String, FetchError> {
        let mut request = self.request(&self.file_url(file_id, "content"));
        if let FetchMode::Partial { max_lines } = mode {
            request = request
                .query("partial", "true")
                .query("lines", &max_lines.to_string());
        }
        self.get_json(request, Resource::Content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::StaticCredentials;
    use crate::error::FetchErrorKind;
    use std::io::{BufRead, BufReader};
    use std::net::TcpListener;

    /// Serves exactly one canned HTTP response and hands back the raw
    /// request head it received.
    fn serve_once(status_line: &str, body: &str) -> (String, flume::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let (tx, rx) = flume::bounded(1);

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });

        (format!("http://{addr}"), rx)
    }

    fn client(base_url: &str, token: Option<&str>) -> ContentClient {
        ContentClient::new(
            base_url,
            Duration::from_secs(5),
            Arc::new(StaticCredentials(token.map(str::to_string))),
        )
    }

    #[test]
    fn fetches_content_with_bearer_token() {
        let (base, requests) = serve_once("200 OK", r#"{"success":true,"data":"Line 1\nLine 2"}"#);
        let content = client(&base, Some("tok"))
            .fetch_content(7, FetchMode::Full)
            .unwrap();
        assert_eq!(content, "Line 1\nLine 2");

        let head = requests.recv().unwrap();
        assert!(head.starts_with("GET /api/file-explorer/files/7/content HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains("authorization: bearer tok"));
    }

    #[test]
    fn omits_authorization_without_token() {
        let (base, requests) = serve_once("200 OK", r#"{"success":true,"data":"x"}"#);
        client(&base, None).fetch_content(1, FetchMode::Full).unwrap();
        let head = requests.recv().unwrap();
        assert!(!head.to_ascii_lowercase().contains("authorization"));
    }

    #[test]
    fn partial_mode_adds_query_parameters() {
        let (base, requests) = serve_once("200 OK", r#"{"success":true,"data":"head"}"#);
        client(&base, None)
            .fetch_content(3, FetchMode::Partial { max_lines: 500 })
            .unwrap();
        let head = requests.recv().unwrap();
        assert!(head.starts_with("GET /api/file-explorer/files/3/content?partial=true&lines=500 "));
    }

    #[test]
    fn http_404_maps_to_not_found() {
        let (base, _requests) = serve_once("404 Not Found", r#"{"success":false,"message":"x"}"#);
        let err = client(&base, None)
            .fetch_content(9, FetchMode::Full)
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::NotFound);
        assert_eq!(err.to_string(), "File not found - it may have been deleted");
    }

    #[test]
    fn unclassified_status_keeps_server_message() {
        let (base, _requests) = serve_once("400 Bad Request", r#"{"message":"Bad file id"}"#);
        let err = client(&base, None)
            .fetch_content(9, FetchMode::Full)
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Api);
        assert_eq!(err.to_string(), "Bad file id");
    }

    #[test]
    fn refused_connection_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"), None)
            .fetch_content(1, FetchMode::Full)
            .unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn fetches_metadata() {
        let (base, requests) = serve_once(
            "200 OK",
            r#"{"success":true,"data":{"id":5,"fileName":"a.rs","mimeType":"text/x-rust","fileSize":12}}"#,
        );
        let meta = client(&base, None).fetch_metadata(5).unwrap();
        assert_eq!(meta.file_size, Some(12));
        assert!(requests.recv().unwrap().starts_with("GET /api/file-explorer/files/5/metadata "));
    }

    #[test]
    fn downloads_with_progress() {
        let (base, _requests) = serve_once("200 OK", "raw bytes here");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");
        let (tx, rx) = flume::unbounded();

        let written = client(&base, None).download_to(5, &dest, Some(tx)).unwrap();
        assert_eq!(written, 14);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "raw bytes here");
        let last = rx.drain().last().unwrap();
        assert_eq!(last, (14, 14));
    }

    /// Promises more body than it sends, then hangs up.
    fn serve_truncated(declared: usize, sent: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n"
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(sent.as_bytes()).unwrap();
            stream.shutdown(std::net::Shutdown::Both).unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn interrupted_download_leaves_no_file() {
        let base = serve_truncated(4096, "only the first part");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.txt");

        let err = client(&base, None).download_to(5, &dest, None).unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn interrupted_download_keeps_the_previous_file() {
        let base = serve_truncated(4096, "partial");
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("report.txt");
        std::fs::write(&dest, "previous copy").unwrap();

        assert!(client(&base, None).download_to(5, &dest, None).is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "previous copy");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn new_downloads_pick_a_free_name() {
        let (base, _requests) = serve_once("200 OK", "fresh");
        let dir = tempfile::tempdir().unwrap();
        let suggested = dir.path().join("report.txt");
        std::fs::write(&suggested, "keep me").unwrap();
        std::fs::write(dir.path().join("report (1).txt"), "and me").unwrap();

        let (saved, bytes) = client(&base, None)
            .download_new(5, &suggested, None)
            .unwrap();
        assert_eq!(saved, dir.path().join("report (2).txt"));
        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read_to_string(&saved).unwrap(), "fresh");
        assert_eq!(std::fs::read_to_string(&suggested).unwrap(), "keep me");
    }

    #[test]
    fn unique_path_handles_missing_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("file-7");
        assert_eq!(unique_path(&bare), bare);
        std::fs::write(&bare, "").unwrap();
        assert_eq!(unique_path(&bare), dir.path().join("file-7 (1)"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = client("http://example.test/", None);
        assert_eq!(c.base_url(), "http://example.test");
        assert_eq!(
            c.file_url(1, "content"),
            "http://example.test/api/file-explorer/files/1/content"
        );
    }
}
