use std::sync::Arc;

use folio_config::AppConfig;
use folio_fetch::{ContentClient, StoredCredentials};
use folio_preview::{PartialPreviewPolicy, PreviewError, TextRenderer, ViewportPolicy};

pub fn load() -> AppConfig {
    let config = AppConfig::load_or_create();
    log::debug!("using {}", config.base_url);
    config
}

pub fn client(config: &AppConfig) -> ContentClient {
    let credentials = Arc::new(StoredCredentials::new(config.token_file.clone()));
    ContentClient::new(&config.base_url, config.request_timeout, credentials)
}

/// Renderer over the configured server. Rows are one line tall.
pub fn renderer(config: &AppConfig) -> TextRenderer {
    TextRenderer::new(Arc::new(client(config)))
        .with_viewport_policy(ViewportPolicy {
            threshold: config.virtual_scroll_threshold,
            row_height: 1.0,
            overscan_rows: config.overscan_rows,
        })
        .with_partial_policy(PartialPreviewPolicy {
            line_cap: config.partial_line_cap,
            warning_bytes: config.large_file_warning_bytes,
        })
}

/// `Title: message`, the way the preview panel shows it.
pub fn describe(err: &PreviewError) -> anyhow::Error {
    anyhow::anyhow!("{}: {}", err.title(), err)
}
