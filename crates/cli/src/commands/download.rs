use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use folio_preview::{PreviewError, format_file_size};

use crate::config::{self, describe};

pub fn run(file_id: u64, output: Option<PathBuf>) -> Result<()> {
    let config = config::load();
    let client = Arc::new(config::client(&config));

    // An explicit --output is overwritten; a name picked from the metadata
    // never replaces an existing file.
    let (dest, replace) = match output {
        Some(path) => (path, true),
        None => {
            let metadata = client
                .fetch_metadata(file_id)
                .map_err(|err| describe(&PreviewError::from(err)))?;
            (PathBuf::from(metadata.suggested_file_name()), false)
        }
    };

    println!("Downloading file {} to {}", file_id, dest.display());

    let (progress_tx, progress_rx) = flume::unbounded();
    let worker = {
        let client = Arc::clone(&client);
        let dest = dest.clone();
        std::thread::spawn(move || {
            if replace {
                client
                    .download_to(file_id, &dest, Some(progress_tx))
                    .map(|bytes| (dest, bytes))
            } else {
                client.download_new(file_id, &dest, Some(progress_tx))
            }
        })
    };

    // The sender is dropped when the worker returns, which ends this loop.
    let mut stdout = std::io::stdout();
    for (downloaded, total) in progress_rx.iter() {
        if total > 0 {
            let percent = downloaded.saturating_mul(100) / total;
            let _ = write!(
                stdout,
                "\r  {} / {} ({}%)",
                format_file_size(downloaded),
                format_file_size(total),
                percent
            );
        } else {
            let _ = write!(stdout, "\r  {}", format_file_size(downloaded));
        }
        let _ = stdout.flush();
    }
    println!();

    let (saved, bytes) = worker
        .join()
        .map_err(|_| anyhow::anyhow!("Download thread panicked"))?
        .map_err(|err| describe(&PreviewError::from(err)))
        .with_context(|| format!("Failed to download file {file_id}"))?;

    println!("Saved {} ({})", saved.display(), format_file_size(bytes));
    Ok(())
}
