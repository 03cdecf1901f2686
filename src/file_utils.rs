//! Shared file inspection utilities
//!
//! Text/binary sniffing, extension handling and line counting used by the
//! scanner, the output formatters and the statistics collector.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Number of leading bytes inspected when sniffing file content.
pub const SNIFF_LEN: u64 = 512;

/// Extensions always treated as text without reading the file.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "asciidoc", "json", "xml", "yaml", "yml", "toml", "ini",
    "cfg", "conf", "log", "csv", "tsv", "sql", "html", "htm", "css", "js", "ts", "jsx", "tsx",
    "go", "py", "java", "c", "cpp", "h", "hpp", "cs", "php", "rb", "rs", "kt", "swift", "sh",
    "bash", "zsh", "fish", "ps1", "bat", "cmd", "dockerfile", "gitignore", "gitattributes",
];

/// Minimum share of bytes that must decode as UTF-8.
const MIN_VALID_UTF8_RATIO: f64 = 0.8;
/// Maximum share of non-whitespace control bytes.
const MAX_CONTROL_RATIO: f64 = 0.3;

/// Lowercased extension without the dot.
///
/// Dotfiles such as `.gitignore` use the part after the dot, so they can
/// be recognized by name.
pub fn extension(path: &Path) -> Option<String> {
    if let Some(ext) = path.extension() {
        return Some(ext.to_string_lossy().to_lowercase());
    }
    let name = path.file_name()?.to_string_lossy();
    name.strip_prefix('.')
        .filter(|rest| !rest.is_empty())
        .map(|rest| rest.to_lowercase())
}

pub fn has_text_extension(path: &Path) -> bool {
    extension(path).is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// Decide whether a file holds text.
///
/// Known text extensions short-circuit. Otherwise the first
/// [`SNIFF_LEN`] bytes are inspected; empty files count as text.
pub fn is_text_file(path: &Path) -> io::Result<bool> {
    if has_text_extension(path) {
        return Ok(true);
    }

    let mut sample = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut sample)?;
    Ok(looks_like_text(&sample))
}

/// Content heuristic behind [`is_text_file`].
pub fn looks_like_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return true;
    }
    if content_inspector::inspect(sample).is_binary() {
        return false;
    }

    let total = sample.len() as f64;
    if (valid_utf8_len(sample) as f64) / total < MIN_VALID_UTF8_RATIO {
        return false;
    }

    let control = sample
        .iter()
        .filter(|&&b| b < 0x20 && !is_text_whitespace(b))
        .count();
    (control as f64) / total <= MAX_CONTROL_RATIO
}

/// Count bytes belonging to valid UTF-8 sequences. A sequence cut off at
/// the end of the sample still counts as valid.
fn valid_utf8_len(mut bytes: &[u8]) -> usize {
    let mut valid = 0;
    loop {
        match std::str::from_utf8(bytes) {
            Ok(s) => return valid + s.len(),
            Err(e) => {
                valid += e.valid_up_to();
                match e.error_len() {
                    Some(bad) => bytes = &bytes[e.valid_up_to() + bad..],
                    None => return valid + (bytes.len() - e.valid_up_to()),
                }
            }
        }
    }
}

fn is_text_whitespace(b: u8) -> bool {
    matches!(b, b'\n' | b'\r' | b'\t' | 0x0c | 0x0b | 0x08)
}

/// Count lines, including a final line without a trailing newline.
pub fn count_lines(content: &[u8]) -> usize {
    scan_lines(content).map_or(0, |(count, _)| count)
}

/// Line count and whether the last byte is `\n`, read in chunks so the
/// whole stream is never held in memory.
pub fn scan_lines<R: Read>(mut reader: R) -> io::Result<(usize, bool)> {
    let mut buf = [0u8; 8192];
    let mut newlines = 0;
    let mut last = None;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        newlines += buf[..n].iter().filter(|&&b| b == b'\n').count();
        last = Some(buf[n - 1]);
    }

    let ends_with_newline = last == Some(b'\n');
    let count = if last.is_none() || ends_with_newline {
        newlines
    } else {
        newlines + 1
    };
    Ok((count, ends_with_newline))
}

/// Whether a file or directory name is hidden by the dotfile convention.
pub fn is_dotfile(name: &str) -> bool {
    name.starts_with('.')
}
