use anyhow::Result;
use folio_preview::{PartialPreviewPolicy, PreviewError, PreviewKind, format_file_size};

use crate::config::{self, describe};

pub fn run(file_id: u64) -> Result<()> {
    let config = config::load();
    let metadata = config::client(&config)
        .fetch_metadata(file_id)
        .map_err(|err| describe(&PreviewError::from(err)))?;

    let field = |value: Option<&str>| value.unwrap_or("-").to_string();

    println!("ID:         {}", metadata.id);
    println!("Name:       {}", field(metadata.display_name()));
    println!("Type:       {}", field(metadata.mime_type.as_deref()));
    println!(
        "Size:       {}",
        metadata
            .file_size
            .map(format_file_size)
            .unwrap_or_else(|| "-".to_string())
    );
    println!("Uploaded:   {}", field(metadata.upload_date.as_deref()));
    println!("Uploader:   {}", field(metadata.uploader_name.as_deref()));
    println!("Department: {}", field(metadata.department_name.as_deref()));

    let kind = PreviewKind::for_file(metadata.mime_type.as_deref(), metadata.display_name());
    let preview = match kind {
        PreviewKind::Text => "text".to_string(),
        PreviewKind::Code {
            language: Some(language),
        } => format!("code ({language})"),
        PreviewKind::Code { language: None } => "code".to_string(),
        PreviewKind::Unsupported => "not available (download instead)".to_string(),
    };
    println!("Preview:    {preview}");

    let policy = PartialPreviewPolicy {
        line_cap: config.partial_line_cap,
        warning_bytes: config.large_file_warning_bytes,
    };
    if kind.is_previewable()
        && let Some(size) = metadata.file_size.filter(|size| policy.needs_warning(Some(*size)))
    {
        println!();
        println!("{}", policy.warning_message(size));
        println!("Use `print --partial {file_id}` for the first {} lines.", policy.line_cap);
    }
    Ok(())
}
