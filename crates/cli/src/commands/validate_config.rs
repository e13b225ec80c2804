use anyhow::{Context, Result};
use folio_config::{AppConfig, ConfigIssue, config_path};

pub fn run() -> Result<()> {
    let path = config_path().context("Could not determine config directory")?;

    println!("Config file: {}", path.display());

    if !path.exists() {
        println!("Status: File does not exist (using defaults)");
        println!("Result: Valid");
        return Ok(());
    }

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            println!("Status: Failed to read file");
            println!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (_, issues) = AppConfig::parse(&contents);
    let (errors, warnings): (Vec<&ConfigIssue>, Vec<&ConfigIssue>) =
        issues.iter().partition(|issue| issue.is_error());

    if issues.is_empty() {
        println!("Status: Valid");
        return Ok(());
    }

    if !errors.is_empty() {
        println!();
        println!("Errors:");
        for error in &errors {
            println!("  {}", error);
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("  {}", warning);
        }
    }

    println!();
    if errors.is_empty() {
        println!("Result: Valid (with warnings)");
    } else {
        println!("Result: Invalid");
        std::process::exit(1);
    }
    Ok(())
}
