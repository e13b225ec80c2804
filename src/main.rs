use std::io::{self, Stdout, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use folio_config::AppConfig;
use ratatui::prelude::*;

mod config;
mod preview_view;
mod text_input;
mod ui;

use preview_view::{FRAME_INTERVAL, LaunchOptions, PreviewView};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Preview archived text files in the terminal", long_about = None)]
#[command(version)]
struct Args {
    /// Numeric id of the file to preview
    file_id: u64,

    /// Start with a partial preview of the leading lines
    #[arg(long)]
    partial: bool,

    /// Don't ask the server for metadata; use --name/--mime instead
    #[arg(long)]
    skip_metadata: bool,

    /// File name hint, used for language detection
    #[arg(long)]
    name: Option<String>,

    /// MIME type hint
    #[arg(long = "mime")]
    mime_type: Option<String>,

    /// Override the configured server
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut app_config = AppConfig::load_or_create();
    if let Some(base_url) = args.base_url {
        app_config.base_url = base_url;
    }
    log::debug!("using {}", app_config.base_url);

    let client = Arc::new(config::client(&app_config));
    let renderer = config::renderer(&app_config, Arc::clone(&client));
    let view = PreviewView::new(
        LaunchOptions {
            file_id: args.file_id,
            partial: args.partial,
            skip_metadata: args.skip_metadata,
            name: args.name,
            mime_type: args.mime_type,
        },
        client,
        renderer,
        app_config.word_wrap,
    );

    run_tui(view).context("terminal UI failed")
}

fn run_tui(mut view: PreviewView) -> io::Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;

    let result = Terminal::new(CrosstermBackend::new(stdout()))
        .and_then(|mut terminal| event_loop(&mut terminal, &mut view));

    disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    view: &mut PreviewView,
) -> io::Result<()> {
    loop {
        view.drain_messages();
        view.flush_frame();
        terminal.draw(|f| view.render(f))?;

        if event::poll(FRAME_INTERVAL)? {
            view.handle_event(event::read()?);
            // Everything already queued lands in this frame.
            while event::poll(Duration::ZERO)? {
                view.handle_event(event::read()?);
            }
        }

        if view.should_quit() {
            return Ok(());
        }
    }
}
