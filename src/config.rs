use std::sync::Arc;

use folio_config::AppConfig;
use folio_fetch::{ContentClient, StoredCredentials};
use folio_preview::{PartialPreviewPolicy, TextRenderer, ViewportPolicy};

/// Terminal rows are one cell tall.
const ROW_HEIGHT: f64 = 1.0;

pub fn client(config: &AppConfig) -> ContentClient {
    let credentials = Arc::new(StoredCredentials::new(config.token_file.clone()));
    ContentClient::new(&config.base_url, config.request_timeout, credentials)
}

pub fn renderer(config: &AppConfig, client: Arc<ContentClient>) -> TextRenderer {
    TextRenderer::new(client)
        .with_viewport_policy(ViewportPolicy {
            threshold: config.virtual_scroll_threshold,
            row_height: ROW_HEIGHT,
            overscan_rows: config.overscan_rows,
        })
        .with_partial_policy(PartialPreviewPolicy {
            line_cap: config.partial_line_cap,
            warning_bytes: config.large_file_warning_bytes,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_preview::RenderMode;

    #[test]
    fn config_values_reach_the_renderer() {
        let config = AppConfig::from_contents(
            "base_url = http://archive.local/\n\
             virtual_scroll_threshold = 10\n\
             partial_line_cap = 50\n",
        );
        let client = Arc::new(client(&config));
        assert_eq!(client.base_url(), "http://archive.local");

        let renderer = renderer(&config, client);
        assert_eq!(renderer.viewport_policy().mode_for(11), RenderMode::Virtual);
        assert_eq!(renderer.viewport_policy().row_height, 1.0);
        assert_eq!(renderer.partial_policy().line_cap, 50);
    }
}
