//! HTML output
//!
//! A single self-contained page with inline CSS. All file content and
//! paths are escaped.

use std::io::{self, Write};

use crate::git::GitInfo;

use super::{ContentOutput, FileEntry, ScanSummary};

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Project Structure</title>
    <style>
        body {
            font-family: 'Courier New', monospace;
            line-height: 1.6;
            margin: 0;
            padding: 20px;
            background-color: #f8f9fa;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            padding: 20px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #007acc;
            padding-bottom: 10px;
        }
        .tree {
            background: #f5f5f5;
            padding: 15px;
            border-radius: 4px;
            border-left: 4px solid #007acc;
            margin: 20px 0;
            font-size: 14px;
        }
        .file {
            margin: 20px 0;
            border: 1px solid #ddd;
            border-radius: 4px;
            overflow: hidden;
        }
        .file-header {
            background: #e9ecef;
            padding: 10px 15px;
            font-weight: bold;
            color: #495057;
            border-bottom: 1px solid #ddd;
        }
        .file-content {
            background: #f8f9fa;
            padding: 15px;
            white-space: pre-wrap;
            font-family: 'Courier New', monospace;
            font-size: 13px;
            line-height: 1.5;
            overflow-x: auto;
        }
        .line-number {
            color: #6c757d;
            margin-right: 15px;
            user-select: none;
            display: inline-block;
            width: 30px;
            text-align: right;
        }
        .line {
            display: block;
        }
        .notice {
            color: #b00020;
            font-style: italic;
        }
        .metadata {
            background: #e3f2fd;
            padding: 10px;
            border-radius: 4px;
            margin: 20px 0;
            font-size: 12px;
            color: #666;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Project Structure</h1>
"#;

const PAGE_FOOT: &str = "        </div>
    </div>
</body>
</html>
";

pub struct HtmlOutput {
    line_numbers: bool,
}

impl HtmlOutput {
    pub fn new(line_numbers: bool) -> Self {
        Self { line_numbers }
    }
}

/// Escape `& < > " '` for use in element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl ContentOutput for HtmlOutput {
    fn begin(
        &mut self,
        out: &mut dyn Write,
        tree: &str,
        git: Option<&GitInfo>,
    ) -> io::Result<()> {
        out.write_all(PAGE_HEAD.as_bytes())?;
        if let Some(git) = git {
            writeln!(out, "        <div class=\"metadata\">")?;
            writeln!(out, "            Branch: {}<br>", escape_html(&git.branch))?;
            writeln!(out, "            Commit: {}<br>", escape_html(&git.commit_hash))?;
            writeln!(out, "            Author: {}<br>", escape_html(&git.author))?;
            writeln!(
                out,
                "            Commit date: {}<br>",
                git.commit_date.to_rfc3339()
            )?;
            write!(out, "            Repository state: {}", git.state())?;
            if !git.repository_url.is_empty() {
                write!(out, "<br>\n            Remote: {}", escape_html(&git.repository_url))?;
            }
            writeln!(out, "\n        </div>")?;
        }
        writeln!(
            out,
            "        <div class=\"tree\">{}</div>",
            escape_html(tree).replace('\n', "<br>")
        )?;
        writeln!(out, "        <div class=\"files\">")
    }

    fn begin_file(&mut self, out: &mut dyn Write, file: &FileEntry) -> io::Result<()> {
        writeln!(out, "        <div class=\"file\">")?;
        writeln!(
            out,
            "            <div class=\"file-header\">{}</div>",
            escape_html(file.relative)
        )?;
        writeln!(out, "            <div class=\"file-content\">")
    }

    fn line(&mut self, out: &mut dyn Write, number: usize, line: &str) -> io::Result<()> {
        if self.line_numbers {
            writeln!(
                out,
                "<span class=\"line\"><span class=\"line-number\">{}</span>{}</span>",
                number,
                escape_html(line)
            )
        } else {
            writeln!(out, "<span class=\"line\">{}</span>", escape_html(line))
        }
    }

    fn skipped(&mut self, out: &mut dyn Write, reason: &str) -> io::Result<()> {
        writeln!(
            out,
            "<span class=\"line notice\">{}</span>",
            escape_html(reason)
        )
    }

    fn truncated(&mut self, out: &mut dyn Write, message: &str) -> io::Result<()> {
        self.skipped(out, message)
    }

    fn end_file(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "            </div>")?;
        writeln!(out, "        </div>")
    }

    fn finish(&mut self, out: &mut dyn Write, _summary: &ScanSummary) -> io::Result<()> {
        out.write_all(PAGE_FOOT.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&#34;x&#34;&gt;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_page_structure() {
        let mut out = Vec::new();
        let mut html = HtmlOutput::new(true);
        html.begin(&mut out, "├── <a>/\n└── b\n", None).unwrap();
        let file = FileEntry {
            path: Path::new("/p/x&y.html"),
            relative: "x&y.html",
            size: 0,
            extension: Some("html".to_string()),
            line_count: 1,
            ends_with_newline: true,
        };
        html.begin_file(&mut out, &file).unwrap();
        html.line(&mut out, 1, "<p>hi</p>").unwrap();
        html.end_file(&mut out).unwrap();
        html.finish(&mut out, &ScanSummary::default()).unwrap();

        let page = String::from_utf8(out).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<div class=\"tree\">├── &lt;a&gt;/<br>└── b<br></div>"));
        assert!(page.contains("<div class=\"file-header\">x&amp;y.html</div>"));
        assert!(page.contains(
            "<span class=\"line\"><span class=\"line-number\">1</span>&lt;p&gt;hi&lt;/p&gt;</span>"
        ));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_lines_without_numbers() {
        let mut out = Vec::new();
        HtmlOutput::new(false).line(&mut out, 3, "a < b").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "<span class=\"line\">a &lt; b</span>\n"
        );
    }
}
