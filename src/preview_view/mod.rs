use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use flume::{Receiver, Sender};
use folio_fetch::{ContentClient, FetchError, FileId, FileMetadata};
use folio_preview::{
    FetchedContent, PartialPreviewPolicy, PreviewError, PreviewKind, PreviewSurface,
    RenderOptions, RenderOutcome, TextRenderer,
};

use crate::text_input::TextInputState;

mod highlight;
mod interaction;
mod render;
mod scrollbar;
mod search;

/// One UI tick. Queued scroll positions are applied at most once per tick.
pub(crate) const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Clone, Debug, Default)]
pub struct LaunchOptions {
    pub file_id: FileId,
    pub partial: bool,
    /// Render straight away using these hints instead of asking the server.
    pub skip_metadata: bool,
    pub name: Option<String>,
    pub mime_type: Option<String>,
}

enum Message {
    Metadata(Result<FileMetadata, FetchError>),
    Content(FetchedContent),
    DownloadFinished(Result<(PathBuf, u64), FetchError>),
}

#[derive(Debug)]
pub(crate) enum Panel {
    Loading(&'static str),
    Preview,
    LargeFileWarning { size: u64 },
    Unsupported,
    Error(PreviewError),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DownloadStatus {
    InProgress { downloaded: u64, total: u64 },
    Saved { path: PathBuf, bytes: u64 },
    Failed(String),
}

pub struct PreviewView {
    options: LaunchOptions,
    client: Arc<ContentClient>,
    renderer: TextRenderer,
    surface: PreviewSurface,
    highlighter: Option<highlight::CodeHighlighter>,
    metadata: Option<FileMetadata>,
    kind: PreviewKind,
    panel: Panel,
    loading: bool,
    partial: bool,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    search_open: bool,
    search_input: TextInputState,
    download: Option<DownloadStatus>,
    download_rx: Option<Receiver<(u64, u64)>>,
    layout: render::FrameLayout,
    dragging_scrollbar: bool,
    should_quit: bool,
}

impl PreviewView {
    pub fn new(
        options: LaunchOptions,
        client: Arc<ContentClient>,
        renderer: TextRenderer,
        word_wrap: bool,
    ) -> Self {
        let (tx, rx) = flume::unbounded();
        let kind = PreviewKind::for_file(options.mime_type.as_deref(), options.name.as_deref());
        let partial = options.partial;

        let mut view = Self {
            options,
            client,
            renderer,
            surface: PreviewSurface::new(word_wrap),
            highlighter: None,
            metadata: None,
            kind,
            panel: Panel::Loading("Loading file details..."),
            loading: false,
            partial,
            tx,
            rx,
            search_open: false,
            search_input: TextInputState::default(),
            download: None,
            download_rx: None,
            layout: render::FrameLayout::default(),
            dragging_scrollbar: false,
            should_quit: false,
        };
        view.reload();
        view
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Applies the scroll queued since the last frame.
    pub fn flush_frame(&self) -> bool {
        self.surface.flush_frame()
    }

    fn partial_policy(&self) -> &PartialPreviewPolicy {
        self.renderer.partial_policy()
    }

    fn file_name(&self) -> String {
        self.metadata
            .as_ref()
            .and_then(FileMetadata::display_name)
            .or(self.options.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("File {}", self.options.file_id))
    }

    /// Starts over from metadata when it has not been loaded, otherwise
    /// re-renders in the current mode.
    pub(crate) fn reload(&mut self) {
        if self.metadata.is_none() && !self.options.skip_metadata {
            self.request_metadata();
        } else {
            self.start_render(self.partial);
        }
    }

    fn request_metadata(&mut self) {
        self.panel = Panel::Loading("Loading file details...");
        self.loading = true;

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let file_id = self.options.file_id;
        std::thread::spawn(move || {
            let _ = tx.send(Message::Metadata(client.fetch_metadata(file_id)));
        });
    }

    pub(crate) fn start_render(&mut self, partial: bool) {
        self.partial = partial;
        let ticket = match self.renderer.begin_render(
            self.options.file_id,
            Some(&self.surface),
            RenderOptions { partial },
        ) {
            Ok(ticket) => ticket,
            Err(err) => {
                self.panel = Panel::Error(err);
                return;
            }
        };

        // Whatever is on screen stays there until the new content lands.
        if !matches!(self.panel, Panel::Preview) {
            self.panel = Panel::Loading(if partial {
                "Loading partial preview..."
            } else {
                "Loading preview..."
            });
        }
        self.loading = true;

        let source = self.renderer.source();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let _ = tx.send(Message::Content(ticket.fetch(source.as_ref())));
        });
    }

    pub(crate) fn start_download(&mut self) {
        if matches!(self.download, Some(DownloadStatus::InProgress { .. })) {
            return;
        }

        let dest = PathBuf::from(match &self.metadata {
            Some(metadata) => metadata.suggested_file_name(),
            None => format!("file-{}", self.options.file_id),
        });
        let (progress_tx, progress_rx) = flume::unbounded();
        self.download = Some(DownloadStatus::InProgress {
            downloaded: 0,
            total: 0,
        });
        self.download_rx = Some(progress_rx);

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let file_id = self.options.file_id;
        std::thread::spawn(move || {
            let result = client.download_new(file_id, &dest, Some(progress_tx));
            let _ = tx.send(Message::DownloadFinished(result));
        });
    }

    /// Applies everything the background threads have reported since the
    /// last tick.
    pub fn drain_messages(&mut self) {
        if let Some(progress_rx) = &self.download_rx {
            if let Some((downloaded, total)) = progress_rx.try_iter().last() {
                self.download = Some(DownloadStatus::InProgress { downloaded, total });
            }
        }

        while let Ok(message) = self.rx.try_recv() {
            match message {
                Message::Metadata(result) => self.handle_metadata(result),
                Message::Content(fetched) => self.handle_content(fetched),
                Message::DownloadFinished(result) => {
                    self.download_rx = None;
                    self.download = Some(match result {
                        Ok((path, bytes)) => DownloadStatus::Saved { path, bytes },
                        Err(err) => DownloadStatus::Failed(err.to_string()),
                    });
                }
            }
        }
    }

    fn handle_metadata(&mut self, result: Result<FileMetadata, FetchError>) {
        self.loading = false;
        let metadata = match result {
            Ok(metadata) => metadata,
            Err(err) => {
                self.panel = Panel::Error(err.into());
                return;
            }
        };

        self.kind = PreviewKind::for_file(metadata.mime_type.as_deref(), metadata.display_name());
        let file_size = metadata.file_size;
        log::debug!(
            "file {} is {:?} ({:?} bytes)",
            metadata.id,
            self.kind,
            file_size
        );
        self.metadata = Some(metadata);

        if !self.kind.is_previewable() {
            self.panel = Panel::Unsupported;
        } else if !self.partial && self.partial_policy().needs_warning(file_size) {
            self.panel = Panel::LargeFileWarning {
                size: file_size.unwrap_or_default(),
            };
        } else {
            self.start_render(self.partial);
        }
    }

    fn handle_content(&mut self, fetched: FetchedContent) {
        let generation = fetched.generation();
        match self.renderer.complete(fetched) {
            Ok(RenderOutcome::Applied { .. }) => {
                self.loading = false;
                self.panel = Panel::Preview;
                if self.search_open && !self.search_input.is_empty() {
                    self.perform_search();
                }
            }
            Ok(RenderOutcome::Discarded { .. }) => {}
            Err(err) if self.renderer.is_latest(generation) => {
                self.loading = false;
                self.panel = Panel::Error(err);
            }
            Err(err) => log::debug!("ignoring failure of superseded render: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use folio_fetch::{ContentSource, FetchMode, StaticCredentials};
    use folio_preview::ViewportPolicy;
    use ratatui::{Terminal, backend::TestBackend};
    use std::time::Instant;

    struct FixedSource(String);

    impl ContentSource for FixedSource {
        fn fetch_content(&self, _file_id: FileId, _mode: FetchMode) -> Result<String, FetchError> {
            Ok(self.0.clone())
        }
    }

    /// A view already showing `text`, rendered with one cell per row.
    fn showing(text: &str, row_height: f64, word_wrap: bool) -> PreviewView {
        let client = Arc::new(ContentClient::new(
            "http://127.0.0.1:9",
            Duration::from_millis(200),
            Arc::new(StaticCredentials(None)),
        ));
        let renderer = TextRenderer::new(Arc::new(FixedSource(text.to_string())))
            .with_viewport_policy(ViewportPolicy {
                threshold: 1000,
                row_height,
                overscan_rows: 2,
            });
        let mut view = PreviewView::new(
            LaunchOptions {
                file_id: 1,
                skip_metadata: true,
                name: Some("notes.txt".to_string()),
                ..Default::default()
            },
            client,
            renderer,
            word_wrap,
        );
        wait_for_idle(&mut view);
        assert!(matches!(view.panel, Panel::Preview), "{:?}", view.panel);
        view
    }

    /// Ten lines too wide for a 40 column terminal, then a short last one.
    fn long_lines_then_tail() -> String {
        let mut lines: Vec<String> = (0..10)
            .map(|n| format!("{n}{}", "abcdefghij ".repeat(6)).chars().take(61).collect())
            .collect();
        lines.push("TAILMARKER".to_string());
        lines.join("\n")
    }

    fn press(view: &mut PreviewView, code: KeyCode) {
        view.handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    /// Flushes queued scrolling, draws a 40x10 frame and returns its rows.
    fn draw(view: &mut PreviewView) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        view.flush_frame();
        terminal.draw(|f| view.render(f)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect()
    }

    fn body_contains(rows: &[String], needle: &str) -> bool {
        // Title on the first row, footer on the last.
        rows[1..rows.len() - 1].iter().any(|row| row.contains(needle))
    }

    #[test]
    fn end_reaches_the_last_wrapped_row() {
        let mut view = showing(&long_lines_then_tail(), 1.0, true);
        press(&mut view, KeyCode::Char('G'));
        let rows = draw(&mut view);
        assert!(body_contains(&rows, "TAILMARKER"), "{rows:#?}");

        // Drawn once already, then asked again.
        let mut view = showing(&long_lines_then_tail(), 1.0, true);
        assert!(!body_contains(&draw(&mut view), "TAILMARKER"));
        press(&mut view, KeyCode::End);
        let rows = draw(&mut view);
        assert!(body_contains(&rows, "TAILMARKER"), "{rows:#?}");
        assert!(!body_contains(&rows, "0abcdefghij"));
    }

    #[test]
    fn end_without_wrap_shows_the_last_lines() {
        let mut view = showing(&long_lines_then_tail(), 1.0, false);
        press(&mut view, KeyCode::Char('G'));
        let rows = draw(&mut view);
        assert!(body_contains(&rows, "TAILMARKER"), "{rows:#?}");
        assert!(body_contains(&rows, " 4 3abcdefghij"), "{rows:#?}");
        assert!(!body_contains(&rows, " 3 2abcdefghij"), "{rows:#?}");
    }

    #[test]
    fn search_reveals_a_match_on_the_last_wrapped_line() {
        let mut view = showing(&long_lines_then_tail(), 1.0, true);
        press(&mut view, KeyCode::Char('/'));
        assert!(!body_contains(&draw(&mut view), "TAILMARKER"));

        for ch in "TAILMARKER".chars() {
            press(&mut view, KeyCode::Char(ch));
        }
        assert_eq!(view.renderer.search_results().count(), 1);
        let rows = draw(&mut view);
        // The search bar sits above the footer.
        let body = &rows[..rows.len() - 2];
        assert!(body.iter().any(|row| row.contains("11 TAILMARKER")), "{rows:#?}");
    }

    #[test]
    fn row_height_scales_standard_scrolling() {
        let text: Vec<String> = (1..=30).map(|n| format!("entry {n}")).collect();
        let mut view = showing(&text.join("\n"), 2.0, false);
        press(&mut view, KeyCode::Char('G'));
        let rows = draw(&mut view);
        assert!(body_contains(&rows, "entry 27"), "{rows:#?}");
        assert!(body_contains(&rows, "entry 30"), "{rows:#?}");
        assert!(!body_contains(&rows, "entry 26"), "{rows:#?}");
    }

    fn offline_view(options: LaunchOptions) -> PreviewView {
        let client = Arc::new(ContentClient::new(
            "http://127.0.0.1:9",
            Duration::from_millis(200),
            Arc::new(StaticCredentials(None)),
        ));
        let renderer = TextRenderer::new(client.clone());
        PreviewView::new(options, client, renderer, true)
    }

    fn wait_for_idle(view: &mut PreviewView) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while view.loading && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
            view.drain_messages();
        }
    }

    #[test]
    fn unreachable_server_shows_retryable_error() {
        let mut view = offline_view(LaunchOptions {
            file_id: 1,
            ..Default::default()
        });
        wait_for_idle(&mut view);

        match &view.panel {
            Panel::Error(err) => {
                assert_eq!(err.title(), "Connection Error");
                assert!(err.is_retryable());
            }
            other => panic!("expected error panel, got {other:?}"),
        }
    }

    #[test]
    fn hints_pick_the_kind_without_metadata() {
        let view = offline_view(LaunchOptions {
            file_id: 1,
            skip_metadata: true,
            name: Some("main.rs".to_string()),
            ..Default::default()
        });
        assert_eq!(
            view.kind,
            PreviewKind::Code {
                language: Some("rust")
            }
        );
        assert!(matches!(view.panel, Panel::Loading(_)));
    }

    #[test]
    fn large_files_wait_for_a_choice() {
        let mut view = offline_view(LaunchOptions {
            file_id: 1,
            skip_metadata: true,
            ..Default::default()
        });
        wait_for_idle(&mut view);
        view.handle_metadata(Ok(FileMetadata {
            id: 1,
            file_name: Some("huge.log".to_string()),
            original_filename: None,
            mime_type: Some("text/plain".to_string()),
            file_size: Some(7_340_032),
            upload_date: None,
            uploader_name: None,
            uploader_email: None,
            department_name: None,
            previewable: true,
            preview_type: Some("text".to_string()),
        }));

        assert!(matches!(
            view.panel,
            Panel::LargeFileWarning { size: 7_340_032 }
        ));
        assert!(!view.loading);
    }
}
