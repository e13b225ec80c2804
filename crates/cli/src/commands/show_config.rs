use anyhow::{Context, Result};
use folio_config::{AppConfig, config_path, default_config_contents};

pub fn run() -> Result<()> {
    let path = config_path().context("Could not determine config directory")?;

    if !path.exists() {
        println!("# Config file: {} (not created yet)", path.display());
        println!("# Using default configuration");
        println!();
        print!("{}", default_config_contents());
        println!();
        print_effective(&AppConfig::default());
        return Ok(());
    }

    println!("# Config file: {}", path.display());
    println!();

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    if contents.trim().is_empty() {
        println!("# (empty file - using defaults)");
    } else {
        print!("{}", contents);
        if !contents.ends_with('\n') {
            println!();
        }
    }

    println!();
    print_effective(&AppConfig::from_contents(&contents));
    Ok(())
}

fn print_effective(config: &AppConfig) {
    println!("# Effective values:");
    println!("base_url = {}", config.base_url);
    println!("virtual_scroll_threshold = {}", config.virtual_scroll_threshold);
    println!("overscan_rows = {}", config.overscan_rows);
    println!("partial_line_cap = {}", config.partial_line_cap);
    println!(
        "large_file_warning_mb = {}",
        config.large_file_warning_bytes / (1024 * 1024)
    );
    println!("word_wrap = {}", config.word_wrap);
    println!("request_timeout_secs = {}", config.request_timeout.as_secs());
    match &config.token_file {
        Some(path) => println!("token_file = {}", path.display()),
        None => println!("# token_file is not set"),
    }
}
