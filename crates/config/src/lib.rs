use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_VIRTUAL_SCROLL_THRESHOLD: usize = 1000;
const DEFAULT_OVERSCAN_ROWS: usize = 2;
const MAX_OVERSCAN_ROWS: usize = 500;
const DEFAULT_PARTIAL_LINE_CAP: usize = 500;
const DEFAULT_LARGE_FILE_WARNING_MB: u64 = 5;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
const TOKEN_FILE_NAME: &str = "token";

const DEFAULT_CONFIG: &str = "# Archive server the previewer talks to\n\
base_url = http://localhost:8080\n\
# Files with more lines than this are rendered with a virtual viewport\n\
# virtual_scroll_threshold = 1000\n\
# Extra rows rendered above and below the visible window\n\
# overscan_rows = 2\n\
# Lines requested by a partial preview\n\
# partial_line_cap = 500\n\
# Files larger than this (in MB) ask before loading\n\
# large_file_warning_mb = 5\n\
# Wrap long lines in the standard view\n\
word_wrap = true\n\
# Connect/read timeout for API requests\n\
# request_timeout_secs = 30\n\
# Persistent bearer token location (FOLIO_TOKEN is the session fallback)\n\
# token_file = ~/.config/folio/token\n";

const VALID_KEYS: &[&str] = &[
    "base_url",
    "virtual_scroll_threshold",
    "overscan_rows",
    "partial_line_cap",
    "large_file_warning_mb",
    "word_wrap",
    "request_timeout_secs",
    "token_file",
];

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub virtual_scroll_threshold: usize,
    pub overscan_rows: usize,
    pub partial_line_cap: usize,
    pub large_file_warning_bytes: u64,
    pub word_wrap: bool,
    pub request_timeout: Duration,
    pub token_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            virtual_scroll_threshold: DEFAULT_VIRTUAL_SCROLL_THRESHOLD,
            overscan_rows: DEFAULT_OVERSCAN_ROWS,
            partial_line_cap: DEFAULT_PARTIAL_LINE_CAP,
            large_file_warning_bytes: DEFAULT_LARGE_FILE_WARNING_MB * 1024 * 1024,
            word_wrap: true,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            token_file: default_token_path(),
        }
    }
}

/// A problem found while reading the config file. Warnings are ignored at
/// load time; errors fall back to the default for that key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    Warning { line: usize, message: String },
    Error { line: usize, message: String },
}

impl ConfigIssue {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning { line, message } | Self::Error { line, message } => {
                write!(f, "Line {}: {}", line, message)
            }
        }
    }
}

impl AppConfig {
    pub fn load_or_create() -> Self {
        let Some(path) = ensure_config_file() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let (config, issues) = Self::parse(&contents);
                for issue in issues {
                    log::warn!("{}: {}", path.display(), issue);
                }
                config
            }
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_contents(contents: &str) -> Self {
        Self::parse(contents).0
    }

    /// Parses `key = value` lines, keeping defaults for anything missing or
    /// invalid, and reports what was skipped.
    pub fn parse(contents: &str) -> (Self, Vec<ConfigIssue>) {
        let mut config = Self::default();
        let mut issues = Vec::new();

        for (line_number, line) in contents.lines().enumerate() {
            let line_number = line_number + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                issues.push(ConfigIssue::Error {
                    line: line_number,
                    message: "Invalid syntax. Expected 'key = value'".to_string(),
                });
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            if !VALID_KEYS.contains(&key.as_str()) {
                issues.push(ConfigIssue::Warning {
                    line: line_number,
                    message: format!("Unknown key '{}'", key),
                });
                continue;
            }

            let mut invalid = |expected: &str| {
                issues.push(ConfigIssue::Error {
                    line: line_number,
                    message: format!("{} must be {}", key, expected),
                });
            };

            match key.as_str() {
                "base_url" => match parse_string_value(value) {
                    Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                        config.base_url = url;
                    }
                    _ => invalid("an http:// or https:// URL"),
                },
                "virtual_scroll_threshold" => match value.parse::<usize>() {
                    Ok(threshold) if threshold > 0 => config.virtual_scroll_threshold = threshold,
                    _ => invalid("a positive integer"),
                },
                "overscan_rows" => match value.parse::<usize>() {
                    Ok(rows) => config.overscan_rows = rows.min(MAX_OVERSCAN_ROWS),
                    Err(_) => invalid("a non-negative integer"),
                },
                "partial_line_cap" => match value.parse::<usize>() {
                    Ok(cap) if cap > 0 => config.partial_line_cap = cap,
                    _ => invalid("a positive integer"),
                },
                "large_file_warning_mb" => match value.parse::<u64>() {
                    Ok(mb) => config.large_file_warning_bytes = mb.saturating_mul(1024 * 1024),
                    Err(_) => invalid("a non-negative integer"),
                },
                "word_wrap" => match parse_bool(value) {
                    Some(wrap) => config.word_wrap = wrap,
                    None => invalid("'true' or 'false'"),
                },
                "request_timeout_secs" => match value.parse::<u64>() {
                    Ok(secs) => {
                        config.request_timeout = Duration::from_secs(
                            secs.clamp(MIN_REQUEST_TIMEOUT_SECS, MAX_REQUEST_TIMEOUT_SECS),
                        )
                    }
                    Err(_) => invalid("a number of seconds"),
                },
                "token_file" => match parse_string_value(value) {
                    Some(path) => config.token_file = Some(expand_home(&path)),
                    None => invalid("a path"),
                },
                _ => {}
            }
        }

        (config, issues)
    }
}

pub fn valid_keys() -> &'static [&'static str] {
    VALID_KEYS
}

pub fn default_config_contents() -> &'static str {
    DEFAULT_CONFIG
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_string_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unquoted = if trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')))
    {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let unquoted = unquoted.trim();
    if unquoted.is_empty() {
        return None;
    }

    Some(unquoted.to_string())
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

pub fn ensure_config_file() -> Option<PathBuf> {
    let path = config_path()?;
    if !path.exists() {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let _ = fs::write(&path, DEFAULT_CONFIG);
    }
    Some(path)
}

fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME")
        && !xdg_config_home.trim().is_empty()
    {
        return Some(Path::new(&xdg_config_home).join("folio"));
    }

    dirs::home_dir().map(|home| home.join(".config").join("folio"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.txt"))
}

fn default_token_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(TOKEN_FILE_NAME))
}
