//! CLI entry point for codectx

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use codectx::analysis::LARGE_FILE_THRESHOLD;
use codectx::{
    Error, FileFilter, FileOutcome, Formatter, GitRepo, GitignoreRules, OutputConfig,
    OutputFormat, Result, ScanOptions, ScanSummary, SizeLimiter, StatsCollector, StatsConfig,
    TreeWalker, WalkerConfig, analyze_complexity, check_health, gitignore::normalize,
    is_text_file, parse_size, print_complexity, print_health, print_stats, print_status,
    render_tree,
};
use termcolor::{ColorChoice, StandardStream};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to color a stream based on mode and environment.
fn should_use_color(mode: ColorMode, is_terminal: bool) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // https://no-color.org/
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            is_terminal
        }
    }
}

fn color_choice(use_color: bool) -> ColorChoice {
    if use_color {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    }
}

#[derive(Parser, Debug)]
#[command(name = "codectx")]
#[command(about = "Pack a directory tree and its file contents into one document")]
#[command(version)]
struct Args {
    /// Directory to scan
    #[arg(default_value = ".")]
    target_dir: PathBuf,

    /// Output format: text, markdown, html, json
    #[arg(short = 'f', long = "format", default_value = "text")]
    format: String,

    /// Only emit files with these extensions (comma separated, e.g. "go,rs")
    #[arg(short = 'e', long = "extensions", default_value = "")]
    extensions: String,

    /// Skip files matching these glob patterns (comma separated)
    #[arg(short = 'x', long = "exclude", default_value = "")]
    exclude: String,

    /// Include files and directories whose name starts with a dot
    #[arg(long = "include-dotfiles")]
    include_dotfiles: bool,

    /// Stop emitting content after this many characters (0 = no limit)
    #[arg(short = 'l', long = "limit", default_value = "0")]
    limit: u64,

    /// Skip files larger than SIZE. Use suffixes: K, M, G (e.g. 500KB, 2M)
    #[arg(long = "max-file-size", value_name = "SIZE", default_value = "1MB")]
    max_file_size: String,

    /// Print statistics to stderr after the document
    #[arg(long = "stats")]
    stats: bool,

    /// Break statistics down by language (implies --stats)
    #[arg(long = "language-stats")]
    language_stats: bool,

    /// Report missing README, LICENSE, .gitignore or tests, large files,
    /// empty directories and binary files
    #[arg(long = "health-check")]
    health_check: bool,

    /// Report code, comment and blank lines and list complex files
    #[arg(long = "complexity-analysis")]
    complexity_analysis: bool,

    /// Write the document to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit file content without line numbers
    #[arg(short = 'n', long = "no-line-numbers")]
    no_line_numbers: bool,

    /// Log every filtering decision
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// List the files that would be emitted without emitting them
    #[arg(long = "dry-run")]
    dry_run: bool,

    /// Only emit files tracked by git
    #[arg(long = "git-only")]
    git_only: bool,

    /// Skip files excluded by .gitignore files under the target
    #[arg(long = "respect-gitignore")]
    respect_gitignore: bool,

    /// Do not apply .gitignore files, even with --respect-gitignore
    #[arg(long = "ignore-gitignore")]
    ignore_gitignore: bool,

    /// Add repository metadata to the document
    #[arg(long = "include-git-info")]
    include_git_info: bool,

    /// Print a git status summary
    #[arg(long = "git-status")]
    git_status: bool,

    /// Descend only N levels deep
    #[arg(short = 'L', long = "level")]
    level: Option<usize>,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal())
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("codectx: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    let max_file_size = parse_size(&args.max_file_size)?;

    let meta = std::fs::metadata(&args.target_dir).map_err(|e| Error::io(&args.target_dir, e))?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory(args.target_dir));
    }
    let root = args
        .target_dir
        .canonicalize()
        .map_err(|e| Error::io(&args.target_dir, e))?;

    let stats_requested = args.stats || args.language_stats;
    let analysis_requested = args.health_check || args.complexity_analysis;
    // The collector always runs: the JSON metadata totals come from it.
    let mut stats = StatsCollector::new(StatsConfig {
        language_stats: args.language_stats,
        advanced: stats_requested && (analysis_requested || args.language_stats),
    });

    if args.git_status {
        // Alone, the status is the whole output.
        let status_only =
            !stats_requested && !analysis_requested && !args.git_only && !args.include_git_info;
        if let Err(e) = show_git_status(&root, args.color, status_only) {
            warn!("failed to get git status: {}", e);
        }
        if status_only {
            return Ok(());
        }
    }

    let tracked = if args.git_only {
        match GitRepo::discover(&root).and_then(|repo| repo.tracked_files()) {
            Ok(tracked) if tracked.is_empty() => {
                warn!("no git-tracked files found, continuing without git filter");
                None
            }
            Ok(tracked) => Some(tracked),
            Err(e) => {
                warn!("failed to get git tracked files: {}", e);
                warn!("continuing without git tracking filter");
                None
            }
        }
    } else {
        None
    };

    let git_info = if args.include_git_info {
        match GitRepo::discover(&root).and_then(|repo| repo.info()) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("failed to get git info: {}", e);
                None
            }
        }
    } else {
        None
    };

    if args.respect_gitignore && args.ignore_gitignore {
        debug!("--ignore-gitignore overrides --respect-gitignore");
    }
    let gitignore = if args.respect_gitignore && !args.ignore_gitignore {
        let mut rules = GitignoreRules::new(&root);
        match rules.parse_all() {
            Ok(count) => {
                debug!(
                    "loaded {} gitignore rules under {}",
                    count,
                    rules.root().display()
                );
                Some(rules)
            }
            Err(e) => {
                warn!("failed to parse .gitignore files: {}", e);
                None
            }
        }
    } else {
        None
    };

    let walker_config = WalkerConfig {
        include_dotfiles: args.include_dotfiles,
        max_depth: args.level,
    };
    let mut walker = TreeWalker::new(walker_config);
    if let Some(rules) = &gitignore {
        walker = walker.with_gitignore(rules.clone());
    }
    let tree = walker.walk(&root)?;
    let rendered = render_tree(&tree);

    let mut filter = FileFilter::new(&root)
        .with_extensions(&args.extensions)
        .with_excludes(&args.exclude)
        .include_dotfiles(args.include_dotfiles);
    if let Some(tracked) = tracked {
        filter = filter.with_tracked(tracked);
    }
    if let Some(rules) = gitignore {
        filter = filter.with_gitignore(rules);
    }

    let limiter = SizeLimiter::new(max_file_size, args.limit);
    debug!(
        "max file size {} bytes, character limit {}",
        limiter.max_file_size(),
        limiter.max_total_size()
    );

    let output_config = OutputConfig {
        format,
        line_numbers: !args.no_line_numbers,
        options: ScanOptions {
            include_line_numbers: !args.no_line_numbers,
            extensions_filter: split_option(&args.extensions),
            exclude_patterns: split_option(&args.exclude),
            format: format.to_string(),
            max_file_size: args.max_file_size.clone(),
            character_limit: limiter.max_total_size(),
            include_dotfiles: args.include_dotfiles,
        },
    };

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| Error::io(path, e))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut formatter = Formatter::new(writer, &output_config, limiter);
    formatter.write_header(&rendered, git_info.as_ref())?;

    stats.record_directories(tree.dir_count());

    for path in tree.file_paths() {
        let relative = normalize(&root, path).unwrap_or_else(|| path.display().to_string());

        if !filter.is_included(path) {
            continue;
        }

        let is_text = match is_text_file(path) {
            Ok(is_text) => is_text,
            Err(e) => {
                warn!("failed to check if {} is text: {}", relative, e);
                continue;
            }
        };

        if let Err(e) = stats.record_file(path, is_text) {
            warn!("failed to add file to stats: {}", e);
        }

        if !is_text {
            warn!("skipping binary file: {}", relative);
            continue;
        }

        if args.dry_run {
            eprintln!("Would process file: {}", relative);
            continue;
        }

        match formatter.write_file(path, &relative) {
            Ok(FileOutcome::Written) => {}
            Ok(FileOutcome::TooLarge(size)) => info!("{} is too large ({} bytes)", relative, size),
            Ok(FileOutcome::Truncated) => info!("output truncated in {}", relative),
            Ok(FileOutcome::LimitReached) => {
                debug!("character limit reached, stopping");
                break;
            }
            Err(Error::Io { path, source }) => {
                warn!("failed to read {}: {}", path.display(), source);
            }
            Err(e) => return Err(e),
        }
    }

    let summary = ScanSummary {
        target_directory: root.display().to_string(),
        stats: stats.snapshot(),
    };
    formatter.finish(&summary)?;

    if !stats_requested && !analysis_requested {
        return Ok(());
    }

    // Reports go to stderr so stdout stays a clean document.
    let use_color = should_use_color(args.color, io::stderr().is_terminal());
    let mut stderr = StandardStream::stderr(color_choice(use_color));
    if stats_requested {
        print_stats(&mut stderr, &summary.stats)?;
    }
    if args.health_check {
        match check_health(&root, LARGE_FILE_THRESHOLD) {
            Ok(health) => print_health(&mut stderr, &health)?,
            Err(e) => warn!("failed to check project health: {}", e),
        }
    }
    if args.complexity_analysis {
        match analyze_complexity(&root) {
            Ok(analysis) => print_complexity(&mut stderr, &analysis)?,
            Err(e) => warn!("failed to analyze project complexity: {}", e),
        }
    }

    Ok(())
}

/// Print the status summary to stdout when it is the only output, to
/// stderr otherwise so the document on stdout stays clean.
fn show_git_status(root: &Path, color: ColorMode, to_stdout: bool) -> Result<()> {
    let summary = GitRepo::discover(root)?.status_summary()?;
    if to_stdout {
        let use_color = should_use_color(color, io::stdout().is_terminal());
        let mut out = StandardStream::stdout(color_choice(use_color));
        print_status(&mut out, &summary)?;
    } else {
        let use_color = should_use_color(color, io::stderr().is_terminal());
        let mut out = StandardStream::stderr(color_choice(use_color));
        print_status(&mut out, &summary)?;
    }
    Ok(())
}

fn split_option(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_mode_overrides_terminal() {
        assert!(should_use_color(ColorMode::Always, false));
        assert!(!should_use_color(ColorMode::Never, true));
    }

    #[test]
    fn test_split_option() {
        assert_eq!(split_option("go, rs,,"), vec!["go", "rs"]);
        assert!(split_option("").is_empty());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["codectx"]);
        assert_eq!(args.target_dir, PathBuf::from("."));
        assert_eq!(args.format, "text");
        assert_eq!(args.max_file_size, "1MB");
        assert_eq!(args.limit, 0);
        assert!(!args.respect_gitignore);
        assert!(!args.ignore_gitignore);
        assert!(!args.health_check && !args.complexity_analysis);
    }

    #[test]
    fn test_analysis_flags_parse() {
        let args = Args::parse_from([
            "codectx",
            "--health-check",
            "--complexity-analysis",
            "--respect-gitignore",
            "--ignore-gitignore",
        ]);
        assert!(args.health_check && args.complexity_analysis);
        assert!(args.respect_gitignore && args.ignore_gitignore);
    }
}
