use anyhow::Result;
use folio_preview::{PreviewSurface, RenderOptions};

use crate::config::{self, describe};

pub fn run(file_id: u64, partial: bool, line_numbers: bool) -> Result<()> {
    let config = config::load();
    let mut renderer = config::renderer(&config);
    let surface = PreviewSurface::new(config.word_wrap);

    renderer
        .render(file_id, Some(&surface), RenderOptions { partial })
        .map_err(|err| describe(&err))?;

    if let Some(banner) = surface.large_file_banner() {
        eprintln!("# {banner}");
    }

    let Some(lines) = renderer.line_model() else {
        return Ok(());
    };
    let width = lines.line_count().to_string().len();
    for idx in 0..lines.line_count() {
        let line = lines.display_line(idx).unwrap_or_default();
        if line_numbers {
            println!("{:>width$}  {}", idx + 1, line);
        } else {
            println!("{line}");
        }
    }

    if let Some(notice) = surface.partial_notice() {
        eprintln!("# {notice}");
    }
    Ok(())
}
