//! Language detection from file extensions
//!
//! Used for the per-language statistics breakdown and for tagging fenced
//! code blocks in markdown output.

use std::path::Path;

use crate::file_utils::extension;

/// Languages and file kinds recognized by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Go,
    Rust,
    Python,
    JavaScript,
    TypeScript,
    C,
    Cpp,
    CSharp,
    Java,
    Kotlin,
    Scala,
    Groovy,
    Swift,
    Ruby,
    PHP,
    Shell,
    Html,
    Css,
    Json,
    Yaml,
    Xml,
    Toml,
    Csv,
    Markdown,
    Text,
    Config,
    Document,
    Image,
    Audio,
    Video,
    Archive,
}

impl Language {
    /// Detect the language from a bare extension (no dot).
    ///
    /// # Examples
    ///
    /// ```
    /// use codectx::language::Language;
    ///
    /// assert_eq!(Language::from_extension("rs"), Some(Language::Rust));
    /// assert_eq!(Language::from_extension("YML"), Some(Language::Yaml));
    /// assert_eq!(Language::from_extension("unknown"), None);
    /// ```
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lang = match ext.to_lowercase().as_str() {
            "go" => Language::Go,
            "rs" => Language::Rust,
            "py" | "pyc" | "pyd" | "pyo" | "pyw" => Language::Python,
            "js" | "jsx" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "c" | "h" => Language::C,
            "cpp" | "hpp" | "cc" | "cxx" | "c++" => Language::Cpp,
            "cs" => Language::CSharp,
            "java" => Language::Java,
            "kt" | "kts" => Language::Kotlin,
            "scala" => Language::Scala,
            "groovy" => Language::Groovy,
            "swift" => Language::Swift,
            "rb" | "erb" => Language::Ruby,
            "php" => Language::PHP,
            "sh" | "bash" | "zsh" => Language::Shell,
            "html" | "htm" => Language::Html,
            "css" | "scss" | "sass" | "less" => Language::Css,
            "json" => Language::Json,
            "yaml" | "yml" => Language::Yaml,
            "xml" => Language::Xml,
            "toml" => Language::Toml,
            "csv" | "tsv" => Language::Csv,
            "md" | "markdown" => Language::Markdown,
            "txt" | "rst" => Language::Text,
            "ini" | "cfg" | "conf" => Language::Config,
            "pdf" | "doc" | "docx" | "odt" => Language::Document,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" | "ico" => Language::Image,
            "mp3" | "wav" | "ogg" => Language::Audio,
            "mp4" | "webm" | "avi" => Language::Video,
            "zip" | "tar" | "gz" | "rar" | "7z" => Language::Archive,
            _ => return None,
        };
        Some(lang)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(&extension(path)?)
    }

    /// Human-readable name used in statistics.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Go => "Go",
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::Scala => "Scala",
            Language::Groovy => "Groovy",
            Language::Swift => "Swift",
            Language::Ruby => "Ruby",
            Language::PHP => "PHP",
            Language::Shell => "Shell",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Json => "JSON",
            Language::Yaml => "YAML",
            Language::Xml => "XML",
            Language::Toml => "TOML",
            Language::Csv => "CSV",
            Language::Markdown => "Markdown",
            Language::Text => "Text",
            Language::Config => "Config",
            Language::Document => "Document",
            Language::Image => "Image",
            Language::Audio => "Audio",
            Language::Video => "Video",
            Language::Archive => "Archive",
        }
    }
}

/// Info string for a fenced code block holding a file with this extension.
///
/// Unknown extensions are used as-is; no extension gives an empty tag.
pub fn fence_tag(ext: Option<&str>) -> String {
    let Some(ext) = ext else {
        return String::new();
    };
    let ext = ext.to_lowercase();
    let tag = match ext.as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "cc" | "cxx" | "hpp" => "cpp",
        "h" => "c",
        "cs" => "csharp",
        "rb" => "ruby",
        "rs" => "rust",
        "kt" => "kotlin",
        "sh" | "bash" | "zsh" | "fish" => "bash",
        "ps1" => "powershell",
        "htm" => "html",
        "yml" => "yaml",
        "cfg" | "conf" => "ini",
        "md" => "markdown",
        "txt" | "log" => "text",
        _ => return ext,
    };
    tag.to_string()
}
