//! JSON output
//!
//! Everything is collected in memory and written as one pretty-printed
//! document by `finish`. The metadata totals come from the run's
//! statistics collector, not from the emitted records.

use std::io::{self, Write};

use chrono::Local;
use serde::Serialize;

use crate::git::GitInfo;
use crate::stats::{CodebaseStats, format_elapsed};

use super::{ContentOutput, FileEntry, ScanSummary};

/// Options echoed into the document's metadata.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanOptions {
    pub include_line_numbers: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions_filter: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,
    pub format: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_file_size: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub character_limit: u64,
    pub include_dotfiles: bool,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

#[derive(Debug, Serialize)]
struct Document {
    metadata: Metadata,
    directory_tree: String,
    files: Vec<FileRecord>,
}

#[derive(Debug, Serialize)]
struct Metadata {
    target_directory: String,
    scan_time: String,
    total_files: usize,
    total_directories: usize,
    total_size_bytes: u64,
    estimated_tokens: usize,
    text_files: usize,
    binary_files: usize,
    processing_time: String,
    options: ScanOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    git_info: Option<GitInfo>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    truncated: bool,
}

#[derive(Debug, Serialize)]
struct FileRecord {
    path: String,
    relative_path: String,
    #[serde(rename = "type")]
    kind: &'static str,
    size_bytes: u64,
    line_count: usize,
    extension: String,
    content: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    skipped: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    skip_reason: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    truncated: bool,
}

pub struct JsonOutput {
    options: ScanOptions,
    scan_time: String,
    tree: String,
    git: Option<GitInfo>,
    files: Vec<FileRecord>,
    current: Option<(FileRecord, bool)>,
}

impl JsonOutput {
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            scan_time: Local::now().to_rfc3339(),
            tree: String::new(),
            git: None,
            files: Vec::new(),
            current: None,
        }
    }
}

impl ContentOutput for JsonOutput {
    fn begin(
        &mut self,
        _out: &mut dyn Write,
        tree: &str,
        git: Option<&GitInfo>,
    ) -> io::Result<()> {
        self.tree = tree.to_string();
        self.git = git.cloned();
        Ok(())
    }

    fn begin_file(&mut self, _out: &mut dyn Write, file: &FileEntry) -> io::Result<()> {
        let record = FileRecord {
            path: file.path.display().to_string(),
            relative_path: file.relative.to_string(),
            kind: "text",
            size_bytes: file.size,
            line_count: file.line_count,
            extension: file.extension.clone().unwrap_or_default(),
            content: String::new(),
            skipped: false,
            skip_reason: String::new(),
            truncated: false,
        };
        self.current = Some((record, file.ends_with_newline));
        Ok(())
    }

    fn line(&mut self, _out: &mut dyn Write, _number: usize, line: &str) -> io::Result<()> {
        if let Some((record, _)) = &mut self.current {
            record.content.push_str(line);
            record.content.push('\n');
        }
        Ok(())
    }

    fn skipped(&mut self, _out: &mut dyn Write, reason: &str) -> io::Result<()> {
        if let Some((record, _)) = &mut self.current {
            record.skipped = true;
            record.skip_reason = reason.to_string();
        }
        Ok(())
    }

    fn truncated(&mut self, _out: &mut dyn Write, _message: &str) -> io::Result<()> {
        if let Some((record, _)) = &mut self.current {
            record.truncated = true;
        }
        Ok(())
    }

    fn end_file(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        if let Some((mut record, ends_with_newline)) = self.current.take() {
            if !ends_with_newline && !record.truncated {
                record.content.pop();
            }
            self.files.push(record);
        }
        Ok(())
    }

    fn finish(&mut self, out: &mut dyn Write, summary: &ScanSummary) -> io::Result<()> {
        let stats = &summary.stats;
        let document = Document {
            metadata: Metadata {
                target_directory: summary.target_directory.clone(),
                scan_time: self.scan_time.clone(),
                total_files: stats.files,
                total_directories: stats.directories,
                total_size_bytes: stats.total_size,
                estimated_tokens: stats.estimated_tokens,
                text_files: stats.text_files,
                binary_files: stats.binary_files,
                processing_time: format_elapsed(stats.processing_time),
                options: self.options.clone(),
                git_info: self.git.clone(),
                truncated: self.files.iter().any(|f| f.truncated),
            },
            directory_tree: std::mem::take(&mut self.tree),
            files: std::mem::take(&mut self.files),
        };

        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::path::Path;
    use std::time::Duration;

    fn entry<'a>(relative: &'a str, ends_with_newline: bool) -> FileEntry<'a> {
        FileEntry {
            path: Path::new(relative),
            relative,
            size: 10,
            extension: Some("go".to_string()),
            line_count: 2,
            ends_with_newline,
        }
    }

    fn finish(json: &mut JsonOutput) -> Value {
        let mut out = Vec::new();
        let summary = ScanSummary {
            target_directory: "/p".to_string(),
            stats: CodebaseStats {
                files: 2,
                directories: 3,
                total_size: 74,
                text_files: 1,
                binary_files: 1,
                estimated_tokens: 9,
                processing_time: Duration::from_millis(5),
                by_language: Vec::new(),
                advanced: None,
            },
        };
        json.finish(&mut out, &summary).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_document_fields() {
        let mut sink = Vec::new();
        let mut json = JsonOutput::new(ScanOptions {
            include_line_numbers: true,
            format: "json".to_string(),
            ..Default::default()
        });
        json.begin(&mut sink, "└── a.go\n", None).unwrap();
        json.begin_file(&mut sink, &entry("a.go", false)).unwrap();
        json.line(&mut sink, 1, "package a").unwrap();
        json.line(&mut sink, 2, "func A() {}").unwrap();
        json.end_file(&mut sink).unwrap();
        assert!(sink.is_empty());

        let doc = finish(&mut json);
        let meta = &doc["metadata"];
        assert_eq!(meta["target_directory"], "/p");
        assert_eq!(meta["total_files"], 2);
        assert_eq!(meta["total_directories"], 3);
        assert_eq!(meta["total_size_bytes"], 74);
        assert_eq!(meta["binary_files"], 1);
        assert_eq!(meta["text_files"], 1);
        assert_eq!(meta["estimated_tokens"], 9);
        assert_eq!(meta["processing_time"], "5ms");
        assert_eq!(meta["options"]["format"], "json");
        assert!(meta["options"].get("character_limit").is_none());
        assert!(meta.get("git_info").is_none());
        assert!(meta.get("truncated").is_none());

        assert_eq!(doc["directory_tree"], "└── a.go\n");
        let file = &doc["files"][0];
        assert_eq!(file["relative_path"], "a.go");
        assert_eq!(file["type"], "text");
        assert_eq!(file["extension"], "go");
        assert_eq!(file["content"], "package a\nfunc A() {}");
        assert!(file.get("skipped").is_none());
    }

    #[test]
    fn test_skipped_and_truncated_files() {
        let mut sink = Vec::new();
        let mut json = JsonOutput::new(ScanOptions::default());
        json.begin(&mut sink, "", None).unwrap();

        json.begin_file(&mut sink, &entry("big.go", true)).unwrap();
        json.skipped(&mut sink, "[File too large]").unwrap();
        json.end_file(&mut sink).unwrap();

        json.begin_file(&mut sink, &entry("cut.go", true)).unwrap();
        json.line(&mut sink, 1, "kept").unwrap();
        json.truncated(&mut sink, "[Output truncated]").unwrap();
        json.end_file(&mut sink).unwrap();

        let doc = finish(&mut json);
        assert_eq!(doc["metadata"]["truncated"], true);
        assert_eq!(doc["files"].as_array().unwrap().len(), 2);
        assert_eq!(doc["files"][0]["skipped"], true);
        assert_eq!(doc["files"][0]["skip_reason"], "[File too large]");
        assert_eq!(doc["files"][1]["content"], "kept\n");
        assert_eq!(doc["files"][1]["truncated"], true);
    }
}
