/// How a file can be previewed in a text surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewKind {
    Text,
    Code { language: Option<&'static str> },
    /// PDFs, office documents, images and binaries. Download instead.
    Unsupported,
}

const CODE_MIME_TYPES: &[&str] = &[
    "text/javascript",
    "application/javascript",
    "text/x-java-source",
    "text/x-python",
    "text/x-c",
    "text/x-c++",
    "text/x-csharp",
    "text/x-php",
    "text/x-ruby",
    "text/x-go",
    "text/x-rust",
    "text/x-swift",
    "text/x-kotlin",
    "text/x-scala",
    "text/css",
    "text/html",
    "application/xhtml+xml",
    "text/x-sql",
];

const TEXT_MIME_TYPES: &[&str] = &["application/json", "application/xml"];

const TEXT_EXTENSIONS: &[&str] = &["txt", "log", "csv", "tsv", "ini", "cfg", "conf", "toml"];

impl PreviewKind {
    /// Picks a renderer from the MIME type, falling back to the file
    /// extension when the MIME type is missing or generic.
    pub fn for_file(mime_type: Option<&str>, file_name: Option<&str>) -> Self {
        let language = file_name.and_then(detect_language);
        let mime = mime_type
            .map(|m| m.split(';').next().unwrap_or(m).trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty() && m != "application/octet-stream");

        if let Some(mime) = mime {
            if CODE_MIME_TYPES.contains(&mime.as_str()) {
                return Self::Code { language };
            }
            if TEXT_MIME_TYPES.contains(&mime.as_str()) || mime.starts_with("text/") {
                return Self::Text;
            }
            return Self::Unsupported;
        }

        match (language, file_name.and_then(extension)) {
            (Some("markdown" | "json" | "xml" | "yaml"), _) => Self::Text,
            (Some(language), _) => Self::Code {
                language: Some(language),
            },
            (None, Some(ext)) if TEXT_EXTENSIONS.contains(&ext.as_str()) => Self::Text,
            _ => Self::Unsupported,
        }
    }

    pub fn is_previewable(self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

fn extension(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Language name for a file's extension, if it is a known source type.
pub fn detect_language(file_name: &str) -> Option<&'static str> {
    let ext = extension(file_name)?;
    let language = match ext.as_str() {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "py" => "python",
        "rb" => "ruby",
        "php" => "php",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "go" => "go",
        "rs" => "rust",
        "swift" => "swift",
        "kt" => "kotlin",
        "scala" => "scala",
        "css" => "css",
        "scss" => "scss",
        "sass" => "sass",
        "less" => "less",
        "html" => "html",
        "xml" => "xml",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "sql" => "sql",
        "sh" | "bash" | "zsh" => "bash",
        "ps1" => "powershell",
        "r" => "r",
        "matlab" | "m" => "matlab",
        "md" | "markdown" => "markdown",
        _ => return None,
    };
    Some(language)
}
