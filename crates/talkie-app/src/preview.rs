//! File preview metadata.
//!
//! Derived on demand from a [`FileAttachment`]; nothing here touches the
//! network or session state.

use talkie_proto::FileAttachment;

/// Language labels by lowercase extension.
const LANGUAGES: &[(&str, &str)] = &[
    ("c", "C"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("cxx", "C++"),
    ("h", "C/C++ Header"),
    ("hpp", "C++ Header"),
    ("py", "Python"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("jsx", "React JSX"),
    ("tsx", "React TSX"),
    ("java", "Java"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("json", "JSON"),
    ("xml", "XML"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("sql", "SQL"),
    ("sh", "Shell Script"),
    ("bat", "Batch"),
    ("md", "Markdown"),
    ("txt", "Text"),
];

/// Label used when the extension is missing or unknown.
pub const FALLBACK_LANGUAGE: &str = "File";

/// Summary of a file for display before or after transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePreview {
    /// File name.
    pub name: String,
    /// Language label derived from the extension.
    pub language: &'static str,
    /// Size in KB, two decimals.
    pub size_kb: String,
    /// Number of lines. A trailing newline starts an (empty) final line.
    pub line_count: usize,
}

impl FilePreview {
    /// Build the preview for `file`.
    pub fn of(file: &FileAttachment) -> Self {
        Self {
            name: file.name.clone(),
            language: language_for(&file.name),
            size_kb: format_kb(file.size),
            line_count: file.content.split('\n').count(),
        }
    }
}

/// Language label for a file name.
pub fn language_for(name: &str) -> &'static str {
    known_language(name).unwrap_or(FALLBACK_LANGUAGE)
}

/// Whether files named like `name` may be sent.
///
/// Only extensions with a language label are accepted, compared
/// case-insensitively.
pub fn is_supported(name: &str) -> bool {
    known_language(name).is_some()
}

fn known_language(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    LANGUAGES.iter().find(|(e, _)| *e == ext).map(|(_, label)| *label)
}

fn format_kb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / 1024.0)
}
