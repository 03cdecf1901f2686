//! Project health check

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorSpec, WriteColor};
use tracing::debug;

use crate::error::{Error, Result};
use crate::file_utils::is_text_file;
use crate::gitignore::{GITIGNORE_FILE, normalize};

use super::walk;

/// Files above this size (10MB) are reported as large.
pub const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024;

const MB: f64 = 1024.0 * 1024.0;

const README_NAMES: &[&str] = &["README.md", "readme.md"];
const LICENSE_NAMES: &[&str] = &["LICENSE", "license"];
const TEST_DIRS: &[&str] = &["tests", "test"];

/// Result of [`check_health`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthCheck {
    pub has_readme: bool,
    pub has_license: bool,
    pub has_gitignore: bool,
    pub has_tests: bool,
    /// `path (N.NNMB)` for every file above the threshold.
    pub large_files: Vec<String>,
    pub empty_directories: Vec<String>,
    pub binary_files: usize,
    pub warnings: Vec<String>,
}

/// Inspect the project under `root`.
///
/// Tests count as present when `tests/` or `test/` exists at the root or
/// any file is named like a test (`*_test.*`, `test_*`, `*.test.*`,
/// `*.spec.*`).
pub fn check_health(root: &Path, large_file_threshold: u64) -> Result<HealthCheck> {
    let mut health = HealthCheck {
        has_readme: any_file(root, README_NAMES),
        has_license: any_file(root, LICENSE_NAMES),
        has_gitignore: any_file(root, &[GITIGNORE_FILE]),
        has_tests: TEST_DIRS.iter().any(|dir| root.join(dir).is_dir()),
        ..Default::default()
    };

    for entry in walk(root) {
        let entry = entry.map_err(|e| Error::Walk(e.to_string()))?;
        if entry.depth() == 0 {
            continue;
        }
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        let relative = normalize(root, path).unwrap_or_else(|| path.display().to_string());

        if file_type.is_dir() {
            if is_empty_dir(path).map_err(|e| Error::io(path, e))? {
                health.empty_directories.push(relative);
            }
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        if is_test_name(&entry.file_name().to_string_lossy()) {
            health.has_tests = true;
        }

        let size = entry
            .metadata()
            .map_err(|e| Error::Walk(e.to_string()))?
            .len();
        if size > large_file_threshold {
            health
                .large_files
                .push(format!("{} ({:.2}MB)", relative, size as f64 / MB));
        }

        match is_text_file(path) {
            Ok(true) => {}
            Ok(false) => health.binary_files += 1,
            Err(e) => debug!("failed to check if {} is text: {}", relative, e),
        }
    }

    health.warnings = warnings(&health);
    Ok(health)
}

fn warnings(health: &HealthCheck) -> Vec<String> {
    let mut warnings = Vec::new();
    if !health.has_readme {
        warnings.push("No README.md file found".to_string());
    }
    if !health.has_license {
        warnings.push("No LICENSE file found".to_string());
    }
    if !health.has_gitignore {
        warnings.push("No .gitignore file found".to_string());
    }
    if !health.has_tests {
        warnings.push("No tests found".to_string());
    }
    if !health.large_files.is_empty() {
        warnings.push(format!("Large files detected: {}", health.large_files.len()));
    }
    if !health.empty_directories.is_empty() {
        warnings.push(format!(
            "Empty directories: {}",
            health.empty_directories.len()
        ));
    }
    if health.binary_files > 0 {
        warnings.push(format!(
            "Binary files: {} (consider adding to .gitignore)",
            health.binary_files
        ));
    }
    warnings
}

fn any_file(root: &Path, names: &[&str]) -> bool {
    names.iter().any(|name| root.join(name).is_file())
}

fn is_empty_dir(path: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

fn is_test_name(name: &str) -> bool {
    name.starts_with("test_")
        || name.contains("_test.")
        || name.contains(".test.")
        || name.contains(".spec.")
}

pub fn print_health<W: WriteColor>(out: &mut W, health: &HealthCheck) -> io::Result<()> {
    let mut bold = ColorSpec::new();
    bold.set_bold(true);
    let mut warn = ColorSpec::new();
    warn.set_fg(Some(Color::Yellow));

    writeln!(out)?;
    out.set_color(&bold)?;
    writeln!(out, "Project Health Check:")?;
    out.reset()?;

    if !health.warnings.is_empty() {
        writeln!(out, "  Warnings:")?;
        for warning in &health.warnings {
            write!(out, "    ")?;
            out.set_color(&warn)?;
            write!(out, "!")?;
            out.reset()?;
            writeln!(out, " {}", warning)?;
        }
    }

    writeln!(out, "  Checks:")?;
    print_check(out, health.has_readme, "README.md present")?;
    print_check(out, health.has_license, "LICENSE file present")?;
    print_check(out, health.has_gitignore, ".gitignore configured")?;
    print_check(out, health.has_tests, "Tests present")?;

    if !health.large_files.is_empty() {
        writeln!(out, "  Large files:")?;
        for file in &health.large_files {
            writeln!(out, "    {}", file)?;
        }
    }
    if !health.empty_directories.is_empty() {
        writeln!(out, "  Empty directories:")?;
        for dir in &health.empty_directories {
            writeln!(out, "    {}", dir)?;
        }
    }
    Ok(())
}

fn print_check<W: WriteColor>(out: &mut W, passed: bool, label: &str) -> io::Result<()> {
    let (mark, color) = if passed {
        ("✓", Color::Green)
    } else {
        ("✗", Color::Red)
    };
    write!(out, "    ")?;
    out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    write!(out, "{}", mark)?;
    out.reset()?;
    writeln!(out, " {}", label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use termcolor::NoColor;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_bare_project_warns_about_everything() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.go", b"package main\n");

        let health = check_health(dir.path(), LARGE_FILE_THRESHOLD).unwrap();
        assert!(!health.has_readme && !health.has_license);
        assert!(!health.has_gitignore && !health.has_tests);
        assert_eq!(
            health.warnings,
            [
                "No README.md file found",
                "No LICENSE file found",
                "No .gitignore file found",
                "No tests found",
            ]
        );
    }

    #[test]
    fn test_healthy_project() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "README.md", b"# project\n");
        write(root, "LICENSE", b"MIT\n");
        write(root, ".gitignore", b"target/\n");
        write(root, "tests/cli.rs", b"#[test] fn t() {}\n");

        let health = check_health(root, LARGE_FILE_THRESHOLD).unwrap();
        assert!(health.has_readme && health.has_license);
        assert!(health.has_gitignore && health.has_tests);
        assert!(health.warnings.is_empty(), "{:?}", health.warnings);
    }

    #[test]
    fn test_test_file_names_count_as_tests() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "pkg/parser_test.go", b"package pkg\n");

        let health = check_health(dir.path(), LARGE_FILE_THRESHOLD).unwrap();
        assert!(health.has_tests);
        assert!(is_test_name("test_utils.py"));
        assert!(is_test_name("app.spec.ts"));
        assert!(!is_test_name("contest.rs"));
    }

    #[test]
    fn test_large_empty_and_binary() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "data/big.txt", &[b'a'; 2048]);
        write(root, "logo.bin", &[0u8; 16]);
        fs::create_dir_all(root.join("empty/inner")).unwrap();
        fs::create_dir_all(root.join(".git/objects")).unwrap();

        let health = check_health(root, 1024).unwrap();
        assert_eq!(health.large_files, ["data/big.txt (0.00MB)"]);
        assert_eq!(health.empty_directories, ["empty/inner"]);
        assert_eq!(health.binary_files, 1);
        assert!(health.warnings.contains(&"Large files detected: 1".to_string()));
        assert!(health.warnings.contains(&"Empty directories: 1".to_string()));
        assert!(
            health
                .warnings
                .contains(&"Binary files: 1 (consider adding to .gitignore)".to_string())
        );
    }

    #[test]
    fn test_print_health() {
        let health = HealthCheck {
            has_readme: true,
            empty_directories: vec!["empty".to_string()],
            warnings: vec!["No LICENSE file found".to_string()],
            ..Default::default()
        };

        let mut out = NoColor::new(Vec::new());
        print_health(&mut out, &health).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();

        assert!(text.contains("Project Health Check:\n"));
        assert!(text.contains("    ! No LICENSE file found\n"));
        assert!(text.contains("    ✓ README.md present\n"));
        assert!(text.contains("    ✗ Tests present\n"));
        assert!(text.contains("  Empty directories:\n    empty\n"));
    }
}
