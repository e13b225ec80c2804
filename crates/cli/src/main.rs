use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio file preview CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Print a file's text content
    Print {
        file_id: u64,
        /// Fetch only the leading lines
        #[arg(long)]
        partial: bool,
        /// Prefix each line with its number
        #[arg(short = 'n', long)]
        line_numbers: bool,
    },

    /// Search a file's text content
    Search {
        file_id: u64,
        query: String,
        #[arg(short = 'c', long)]
        case_sensitive: bool,
        /// Treat the query as a regular expression
        #[arg(short = 'r', long)]
        regex: bool,
        #[arg(long)]
        partial: bool,
    },

    /// Show file metadata and how it would be previewed
    Metadata { file_id: u64 },

    /// Save the original file to disk
    Download {
        file_id: u64,
        /// Destination path (defaults to the file's name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display current configuration
    ShowConfig,

    /// Validate configuration file
    ValidateConfig,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.action {
        Some(Action::Print {
            file_id,
            partial,
            line_numbers,
        }) => commands::print::run(file_id, partial, line_numbers),
        Some(Action::Search {
            file_id,
            query,
            case_sensitive,
            regex,
            partial,
        }) => commands::search::run(file_id, &query, case_sensitive, regex, partial),
        Some(Action::Metadata { file_id }) => commands::metadata::run(file_id),
        Some(Action::Download { file_id, output }) => commands::download::run(file_id, output),
        Some(Action::ShowConfig) => commands::show_config::run(),
        Some(Action::ValidateConfig) => commands::validate_config::run(),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().map_err(Into::into)
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
