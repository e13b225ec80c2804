use folio_fetch::FetchMode;

pub const DEFAULT_PARTIAL_LINE_CAP: usize = 500;
pub const DEFAULT_LARGE_FILE_WARNING_BYTES: u64 = 5 * 1024 * 1024;

/// When to skip a full load, and how much to ask for instead.
///
/// The line cap is enforced by the server. The client never trims what it
/// gets back, and the partial notice is shown whatever the returned length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartialPreviewPolicy {
    pub line_cap: usize,
    pub warning_bytes: u64,
}

impl Default for PartialPreviewPolicy {
    fn default() -> Self {
        Self {
            line_cap: DEFAULT_PARTIAL_LINE_CAP,
            warning_bytes: DEFAULT_LARGE_FILE_WARNING_BYTES,
        }
    }
}

impl PartialPreviewPolicy {
    pub fn fetch_mode(&self, partial: bool) -> FetchMode {
        if partial {
            FetchMode::Partial {
                max_lines: self.line_cap,
            }
        } else {
            FetchMode::Full
        }
    }

    /// Whether a file of `file_size` bytes should ask before loading.
    /// Unknown sizes load directly.
    pub fn needs_warning(&self, file_size: Option<u64>) -> bool {
        file_size.is_some_and(|size| size > self.warning_bytes)
    }

    pub fn partial_notice(&self) -> String {
        format!(
            "Showing first {} lines only. Download file to view complete content.",
            self.line_cap
        )
    }

    pub fn large_file_banner(&self, line_count: usize, partial: bool) -> String {
        let mut banner = format!(
            "Large file: {} lines (virtual scrolling enabled)",
            group_thousands(line_count as u64)
        );
        if partial {
            banner.push_str(&format!(" (partial preview - first {} lines)", self.line_cap));
        }
        banner
    }

    pub fn warning_message(&self, file_size: u64) -> String {
        format!(
            "This file is {}, which exceeds the recommended preview size of {}.",
            format_file_size(file_size),
            format_file_size(self.warning_bytes)
        )
    }
}

/// `1500` -> `"1,500"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Human file size with up to two decimals: `1536` -> `"1.5 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}
