use anyhow::{Result, bail};
use folio_preview::{PreviewSurface, RenderOptions};

use crate::config::{self, describe};

pub fn run(file_id: u64, query: &str, case_sensitive: bool, regex: bool, partial: bool) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query is empty");
    }

    let config = config::load();
    let mut renderer = config::renderer(&config);
    let surface = PreviewSurface::new(config.word_wrap);

    renderer
        .render(file_id, Some(&surface), RenderOptions { partial })
        .map_err(|err| describe(&err))?;

    if case_sensitive {
        renderer.toggle_case_sensitive();
    }
    if regex {
        renderer.toggle_regex_mode();
    }

    let count = renderer.search(query);
    if let Some(err) = renderer.search_state().error() {
        bail!("Invalid pattern: {err}");
    }

    let Some(lines) = renderer.line_model() else {
        return Ok(());
    };
    for record in renderer.search_results().matches() {
        let text = lines.display_line(record.line).unwrap_or_default();
        println!("{}:{}: {}", record.line + 1, record.start + 1, text);
    }

    println!();
    match count {
        0 => println!("No matches"),
        1 => println!("1 match"),
        n => println!("{n} matches"),
    }
    if let Some(notice) = surface.partial_notice() {
        println!("{notice}");
    }
    Ok(())
}
