//! # ASCII box guard (ascii-guard)
//!
//! A CLI tool that detects, validates, and repairs ASCII-art boxes in text
//! files. `lint` reports broken borders without touching the file; `fix`
//! rewrites them in place.
//!
//! ## Overview
//!
//! `ascii-guard` scans text for rectangular boxes drawn with Unicode
//! box-drawing characters (light `┌─┐│└┘`, heavy `┏━┓`, double `╔═╗`) or
//! plain ASCII (`+-|`). Each box is validated structurally: the bottom
//! border must match the top border's width, and every interior line must
//! carry a vertical border character at both edge columns. Content inside a
//! box is never rewritten; only border glyphs move.
//!
//! ## Key Components
//!
//! - **Box Discovery**: Heuristic identification of box regions from corner
//!   and border glyphs.
//! - **Validation**: Structural checks producing positioned diagnostics,
//!   each with a suggested remedy.
//! - **Fixing**: Deterministic border repair. Bottom borders are rebuilt to
//!   the top border's span, interior lines are padded or truncated so the
//!   right border lands on the correct column.
//! - **Divider Awareness**: Horizontal dividers (`├────┤`) are intentional
//!   structure and pass through untouched; table separators (`├──┼──┤`) keep
//!   their own column layout.
//!
//! ## Pipeline Flow
//!
//! ```text
//! Input → Box Discovery → For each box:
//!                           lint: validate → diagnostics
//!                           fix:  rebuild bottom border
//!                                 normalize interior lines
//!                       → Splice back → Output
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Lint errors found, or general error (file not found, I/O error) |
//! | 2 | Invalid command-line arguments |
//! | 3 | Dry-run mode: changes would be made |
//! | 4 | Parse error (invalid UTF-8 or binary input) |

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::ValueEnum;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use rich_rust::terminal;
use rich_rust::{ColorSystem, Console};
use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Exit Codes
// ─────────────────────────────────────────────────────────────────────────────

/// Semantic exit codes for scripting and CI integration
mod exit_codes {
    /// Success - completed without errors
    pub const SUCCESS: i32 = 0;
    /// Lint errors found, or general error (file not found, I/O error)
    pub const ERROR: i32 = 1;
    /// Invalid command-line arguments
    pub const INVALID_ARGS: i32 = 2;
    /// Dry-run mode: changes would be made
    pub const WOULD_CHANGE: i32 = 3;
    /// Parse error (invalid UTF-8 or binary file detected)
    pub const PARSE_ERROR: i32 = 4;
}

#[derive(Debug)]
struct ArgError(String);

impl fmt::Display for ArgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ArgError {}

#[derive(Debug)]
struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Default)]
struct RunOutcome {
    dry_run: bool,
    would_change: bool,
    lint_errors: bool,
}

impl RunOutcome {
    fn clean() -> Self {
        Self::default()
    }

    fn exit_code(&self) -> i32 {
        if self.lint_errors {
            exit_codes::ERROR
        } else if self.dry_run && self.would_change {
            exit_codes::WOULD_CHANGE
        } else {
            exit_codes::SUCCESS
        }
    }
}

fn error_chain_has<T: std::error::Error + 'static>(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<T>())
}

fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    if error_chain_has::<ArgError>(err) {
        exit_codes::INVALID_ARGS
    } else if error_chain_has::<ParseError>(err) {
        exit_codes::PARSE_ERROR
    } else {
        exit_codes::ERROR
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CLI Arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ColorMode {
    /// Auto-detect color support
    Auto,
    /// Always emit colors (even when not a TTY)
    Always,
    /// Never emit colors
    Never,
}

/// ASCII box guard: detects and repairs broken box borders in text files
#[derive(Parser, Debug)]
#[command(
    name = "ascii-guard",
    version,
    about,
    long_about = None,
    after_help = "EXIT CODES:\n  0  Success\n  1  Lint errors found, or general error (file not found, I/O error)\n  2  Invalid command-line arguments\n  3  Dry-run mode: changes would be made\n  4  Parse error (invalid UTF-8 or binary input)\n"
)]
struct Args {
    /// Path to config file (default: search for .asciiguardrc)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Ignore config files
    #[arg(long = "no-config", global = true)]
    no_config: bool,

    /// Color output: auto, always, or never
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommands
// ─────────────────────────────────────────────────────────────────────────────

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check files for broken box borders without modifying them
    Lint(LintArgs),
    /// Repair broken box borders (in place for file arguments)
    Fix(FixArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage git pre-commit hook
    Hook {
        #[command(subcommand)]
        action: HookAction,
    },
}

/// Options shared by the lint and fix subcommands
#[derive(clap::Args, Debug, Clone)]
struct CommonOpts {
    /// Input file(s). Reads from stdin if not provided.
    /// Multiple files can be specified.
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Suppress per-file output (summary is still printed)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Process files recursively in directories
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Glob pattern to match files when recursing (comma-separated)
    #[arg(long, default_value = "*.txt,*.md", requires = "recursive")]
    glob: String,

    /// Do not respect .gitignore when recursing
    #[arg(long = "no-gitignore", requires = "recursive")]
    no_gitignore: bool,

    /// Maximum directory depth (0 = unlimited)
    #[arg(long, default_value = "0", requires = "recursive")]
    max_depth: usize,

    /// Verbose output showing discovered boxes and progress
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Output results as JSON for programmatic processing
    #[arg(long, conflicts_with = "verbose")]
    json: bool,
}

impl Default for CommonOpts {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            quiet: false,
            recursive: false,
            glob: "*.txt,*.md".to_string(),
            no_gitignore: false,
            max_depth: 0,
            verbose: false,
            json: false,
        }
    }
}

/// Arguments for the lint subcommand
#[derive(clap::Args, Debug)]
struct LintArgs {
    #[command(flatten)]
    common: CommonOpts,
}

/// Arguments for the fix subcommand
#[derive(clap::Args, Debug)]
struct FixArgs {
    #[command(flatten)]
    common: CommonOpts,

    /// Preview changes without modifying files (exit 0=no changes, 3=would change)
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes instead of writing them
    #[arg(short = 'd', long, conflicts_with = "json")]
    diff: bool,

    /// Create backup file before writing
    #[arg(long)]
    backup: bool,

    /// Extension for backup files (default: .bak)
    #[arg(long, default_value = ".bak", requires = "backup")]
    backup_ext: String,

    /// Watch file for changes and auto-fix
    #[arg(short = 'w', long, conflicts_with_all = ["dry_run", "diff", "recursive", "json"])]
    watch: bool,

    /// Debounce interval in milliseconds (for --watch mode)
    #[arg(long, default_value = "500", requires = "watch")]
    debounce_ms: u64,
}

/// Config management actions
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Initialize a new .asciiguardrc config file
    Init {
        /// Create in home directory instead of current
        #[arg(long)]
        global: bool,
    },
    /// Show effective configuration (merged file + CLI)
    Show,
    /// Show path to active config file
    Path,
}

/// Hook management actions
#[derive(Subcommand, Debug)]
enum HookAction {
    /// Install pre-commit hook
    Install {
        /// Only check boxes, don't auto-fix (blocks commits with issues)
        #[arg(long)]
        check_only: bool,

        /// Auto-fix boxes before commit
        #[arg(long, conflicts_with = "check_only")]
        auto_fix: bool,

        /// File patterns to check (default: *.md *.txt)
        #[arg(long, value_delimiter = ',')]
        patterns: Option<Vec<String>>,
    },
    /// Uninstall pre-commit hook
    Uninstall,
    /// Show hook status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Runtime configuration derived from CLI args and config files
#[derive(Debug)]
struct Config {
    quiet: bool,
    verbose: bool,
    json: bool,
    color: ColorMode,
    recursive: bool,
    glob: String,
    gitignore: bool,
    max_depth: usize,
    dry_run: bool,
    diff: bool,
    backup: bool,
    backup_ext: String,
    watch: bool,
    debounce_ms: u64,
}

impl Config {
    fn from_common(common: &CommonOpts, color: ColorMode) -> Self {
        Self {
            quiet: common.quiet,
            verbose: common.verbose,
            json: common.json,
            color,
            recursive: common.recursive,
            glob: common.glob.clone(),
            gitignore: !common.no_gitignore,
            max_depth: common.max_depth,
            dry_run: false,
            diff: false,
            backup: false,
            backup_ext: ".bak".to_string(),
            watch: false,
            debounce_ms: 500,
        }
    }
}

struct VerboseStyle {
    use_color: bool,
}

impl VerboseStyle {
    fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn wrap(&self, tag: &str, text: impl fmt::Display) -> String {
        if self.use_color {
            format!("[{}]{}[/]", tag, text)
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: impl fmt::Display) -> String {
        self.wrap("bold", text)
    }

    fn dim(&self, text: impl fmt::Display) -> String {
        self.wrap("dim", text)
    }

    fn error_line(&self, text: impl fmt::Display) -> String {
        self.wrap("red", format!("✗ {}", text))
    }

    fn warning_line(&self, text: impl fmt::Display) -> String {
        self.wrap("yellow", format!("⚠ {}", text))
    }

    fn success_line(&self, text: impl fmt::Display) -> String {
        self.wrap("green", format!("✓ {}", text))
    }

    fn info_line(&self, text: impl fmt::Display) -> String {
        self.wrap("blue", format!("ℹ {}", text))
    }
}

fn build_console(color: ColorMode) -> (Console, VerboseStyle) {
    match color {
        ColorMode::Never => (Console::new(), VerboseStyle::new(false)),
        ColorMode::Always => {
            let system = terminal::detect_color_system().unwrap_or(ColorSystem::Standard);
            let console = Console::builder()
                .force_terminal(true)
                .color_system(system)
                .build();
            (console, VerboseStyle::new(true))
        }
        ColorMode::Auto => {
            if std::env::var("NO_COLOR").is_ok() {
                return (Console::new(), VerboseStyle::new(false));
            }

            if std::env::var("FORCE_COLOR").is_ok() {
                let system = terminal::detect_color_system().unwrap_or(ColorSystem::Standard);
                let console = Console::builder()
                    .force_terminal(true)
                    .color_system(system)
                    .build();
                return (console, VerboseStyle::new(true));
            }

            let console = Console::new();
            let use_color = console.is_color_enabled();
            (console, VerboseStyle::new(use_color))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config File Support
// ─────────────────────────────────────────────────────────────────────────────

/// Config file names searched in order
const CONFIG_FILENAMES: &[&str] = &[".asciiguardrc", ".asciiguardrc.toml", "asciiguardrc.toml"];

/// Configuration loaded from a .asciiguardrc file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    /// Suppress per-file output
    quiet: Option<bool>,
    /// Show verbose output
    verbose: Option<bool>,
    /// Output as JSON
    json: Option<bool>,
    /// Color mode: auto, always, never
    color: Option<ColorMode>,
    /// Create backup before writing fixes
    backup: Option<bool>,
    /// Backup file extension
    backup_ext: Option<String>,
    /// Enable recursive mode
    recursive: Option<bool>,
    /// Glob patterns for recursive mode
    glob: Option<String>,
    /// Respect .gitignore
    gitignore: Option<bool>,
    /// Maximum directory depth
    max_depth: Option<usize>,
}

/// Search for a config file starting from the given directory
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    // Search up the directory tree
    loop {
        for filename in CONFIG_FILENAMES {
            let config_path = current.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    // Check home directory
    if let Some(home) = dirs::home_dir() {
        for filename in CONFIG_FILENAMES {
            let config_path = home.join(filename);
            if config_path.exists() {
                return Some(config_path);
            }
        }
    }

    None
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Create Config by merging file config with CLI args (CLI wins)
fn create_config(args: &Args, common: &CommonOpts, fix: Option<&FixArgs>) -> Result<Config> {
    let mut config = Config::from_common(common, args.color);

    if let Some(f) = fix {
        config.dry_run = f.dry_run;
        config.diff = f.diff;
        config.backup = f.backup;
        config.backup_ext = f.backup_ext.clone();
        config.watch = f.watch;
        config.debounce_ms = f.debounce_ms;
    }

    // Skip config file loading if --no-config is set
    if args.no_config {
        return Ok(config);
    }

    // Find and load config file
    let config_path = if let Some(ref path) = args.config_file {
        // Explicit config file specified
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }
        Some(path.clone())
    } else {
        // Search for config file
        let start_dir = common
            .inputs
            .first()
            .and_then(|p| {
                if p.is_dir() {
                    Some(p.clone())
                } else {
                    p.parent().map(|p| p.to_path_buf())
                }
            })
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

        find_config_file(&start_dir)
    };

    if let Some(path) = config_path {
        let file_config = load_config_file(&path)?;

        // Merge file config with CLI config (CLI wins)
        // Only apply file config values when CLI used defaults
        if !common.quiet {
            if let Some(q) = file_config.quiet {
                config.quiet = q;
            }
        }

        if !common.verbose {
            if let Some(v) = file_config.verbose {
                config.verbose = v;
            }
        }

        if !common.json {
            if let Some(j) = file_config.json {
                config.json = j;
            }
        }

        if args.color == ColorMode::Auto {
            if let Some(c) = file_config.color {
                config.color = c;
            }
        }

        let cli_backup = fix.map(|f| f.backup).unwrap_or(false);
        if !cli_backup {
            if let Some(b) = file_config.backup {
                config.backup = b;
            }
        }

        // backup_ext: use file value if CLI used default
        let cli_backup_ext = fix.map(|f| f.backup_ext.as_str()).unwrap_or(".bak");
        if cli_backup_ext == ".bak" {
            if let Some(ext) = file_config.backup_ext {
                config.backup_ext = ext;
            }
        }

        // Recursive options
        if !common.recursive {
            if let Some(r) = file_config.recursive {
                config.recursive = r;
            }
        }

        if common.glob == "*.txt,*.md" {
            if let Some(g) = file_config.glob {
                config.glob = g;
            }
        }

        if !common.no_gitignore {
            if let Some(gi) = file_config.gitignore {
                config.gitignore = gi;
            }
        }

        if common.max_depth == 0 {
            if let Some(d) = file_config.max_depth {
                config.max_depth = d;
            }
        }
    }

    Ok(config)
}

/// Default config file content
const DEFAULT_CONFIG: &str = r#"# .asciiguardrc - ascii-guard configuration file
# https://github.com/joyshmitz/ascii-guard

# Output options
# quiet = false
# verbose = false
# color = "auto"
# json = false

# Backup options (for fix)
# backup = false
# backup_ext = ".bak"

# Recursive mode defaults
# recursive = false
glob = "*.txt,*.md"
# gitignore = true
# max_depth = 0
"#;

/// Handle the config subcommand
fn run_config_command(action: &ConfigAction, args: &Args) -> Result<()> {
    match action {
        ConfigAction::Init { global } => {
            let path = if *global {
                dirs::home_dir()
                    .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
                    .join(".asciiguardrc")
            } else {
                PathBuf::from(".asciiguardrc")
            };

            if path.exists() {
                return Err(anyhow::anyhow!(
                    "Config file already exists: {}",
                    path.display()
                ));
            }

            fs::write(&path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to create config file: {}", path.display()))?;

            eprintln!("Created config file: {}", path.display());
            Ok(())
        }

        ConfigAction::Show => {
            let config = create_config(args, &CommonOpts::default(), None)?;

            eprintln!("Effective configuration:");
            eprintln!("  quiet: {}", config.quiet);
            eprintln!("  verbose: {}", config.verbose);
            eprintln!("  json: {}", config.json);
            eprintln!("  color: {:?}", config.color);
            eprintln!("  backup: {}", config.backup);
            eprintln!("  backup_ext: {}", config.backup_ext);
            eprintln!("  recursive: {}", config.recursive);
            eprintln!("  glob: {}", config.glob);
            eprintln!("  gitignore: {}", config.gitignore);
            eprintln!("  max_depth: {}", config.max_depth);

            // Show config file path if found
            let start_dir = std::env::current_dir().unwrap_or_default();
            if let Some(path) = find_config_file(&start_dir) {
                eprintln!();
                eprintln!("Config file: {}", path.display());
            }

            Ok(())
        }

        ConfigAction::Path => {
            let start_dir = std::env::current_dir().unwrap_or_default();
            if let Some(path) = find_config_file(&start_dir) {
                println!("{}", path.display());
                Ok(())
            } else {
                eprintln!("No config file found");
                std::process::exit(1);
            }
        }
    }
}

fn validate_args(args: &Args) -> Result<()> {
    match &args.command {
        Some(Commands::Lint(lint)) => {
            if lint.common.recursive && lint.common.inputs.is_empty() {
                return Err(
                    ArgError("--recursive requires at least one input path".to_string()).into(),
                );
            }
        }
        Some(Commands::Fix(fix)) => {
            if fix.common.recursive && fix.common.inputs.is_empty() {
                return Err(
                    ArgError("--recursive requires at least one input path".to_string()).into(),
                );
            }
            if fix.backup && fix.common.inputs.is_empty() {
                return Err(
                    ArgError("--backup requires at least one input file".to_string()).into(),
                );
            }
            if fix.watch && fix.common.inputs.len() != 1 {
                return Err(ArgError("--watch requires exactly one input file".to_string()).into());
            }
        }
        _ => {}
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Quick Scan (Passthrough Optimization)
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum number of lines to scan when deciding whether to process
const QUICK_SCAN_LIMIT: usize = 1000;

/// Summary of a quick scan over the input prefix
#[derive(Debug)]
struct QuickScanResult {
    lines_with_box_chars: usize,
    fully_scanned: bool,
}

impl QuickScanResult {
    /// True when the scan covered the whole input and saw no border glyphs
    /// anywhere. Such input cannot contain a box, so discovery is skipped.
    fn definitely_boxless(&self) -> bool {
        self.fully_scanned && self.lines_with_box_chars == 0
    }
}

/// Quickly scan input lines to decide whether box discovery is necessary
fn quick_scan(lines: &[String]) -> QuickScanResult {
    let mut lines_with_box_chars = 0;

    for line in lines.iter().take(QUICK_SCAN_LIMIT) {
        if line.chars().any(is_box_char) {
            lines_with_box_chars += 1;
        }
    }

    QuickScanResult {
        lines_with_box_chars,
        fully_scanned: lines.len() <= QUICK_SCAN_LIMIT,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Output Structures
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonOutput {
    version: &'static str,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    input: InputStats,
    boxes: BoxStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostics: Option<Vec<JsonDiagnostic>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<OutputStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Serialize)]
struct InputStats {
    lines: usize,
    bytes: usize,
}

#[derive(Serialize)]
struct BoxStats {
    found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fixed: Option<usize>,
}

#[derive(Serialize)]
struct OutputStats {
    lines: usize,
    bytes: usize,
    changed: bool,
}

/// One diagnostic in machine-readable form. Line and column are 1-based to
/// match the human rendering.
#[derive(Serialize)]
struct JsonDiagnostic {
    line: usize,
    column: usize,
    severity: Severity,
    message: String,
    fix: String,
}

impl JsonDiagnostic {
    fn from_error(err: &ValidationError) -> Self {
        Self {
            line: err.line + 1,
            column: err.column + 1,
            severity: err.severity,
            message: err.message.clone(),
            fix: err.fix.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Border Glyph Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Horizontal border characters across the supported styles
fn is_horizontal_char(c: char) -> bool {
    matches!(c, '─' | '━' | '═' | '-')
}

/// Vertical border characters, including the side junctions a divider or
/// table row may carry at a border column
fn is_vertical_char(c: char) -> bool {
    matches!(
        c,
        '│' | '┃' | '║' | '|' | '├' | '┤' | '┣' | '┫' | '╠' | '╣' | '┼'
    )
}

/// Characters that open a divider line (`├───┤`)
fn is_left_divider_char(c: char) -> bool {
    matches!(c, '├' | '╠')
}

/// Characters that close a divider line
fn is_right_divider_char(c: char) -> bool {
    matches!(c, '┤' | '╣')
}

/// Top-left corner glyphs
fn is_top_left_corner(c: char) -> bool {
    matches!(c, '┌' | '┏' | '╔' | '+')
}

/// Top-right corner glyphs
fn is_top_right_corner(c: char) -> bool {
    matches!(c, '┐' | '┓' | '╗' | '+')
}

/// Bottom-left corner glyphs
fn is_bottom_left_corner(c: char) -> bool {
    matches!(c, '└' | '┗' | '╚' | '+')
}

/// Bottom-right corner glyphs
fn is_bottom_right_corner(c: char) -> bool {
    matches!(c, '┘' | '┛' | '╝' | '+')
}

/// Downward junction glyphs allowed inside a top border (`┌──┬──┐`)
fn is_top_junction(c: char) -> bool {
    matches!(c, '┬' | '┳' | '╦' | '+')
}

/// Upward junction glyphs allowed inside a bottom border (`└──┴──┘`)
fn is_bottom_junction(c: char) -> bool {
    matches!(c, '┴' | '┻' | '╩' | '+')
}

/// Any intersection glyph. The bottom-border rebuild keeps these in place
/// instead of overwriting them with fill.
fn is_junction_char(c: char) -> bool {
    matches!(
        c,
        '├' | '┤'
            | '┬'
            | '┴'
            | '┼'
            | '┣'
            | '┫'
            | '┳'
            | '┻'
            | '╋'
            | '╠'
            | '╣'
            | '╦'
            | '╩'
            | '╬'
            | '+'
    )
}

/// Check if a character could be part of a box border. Used by the quick
/// scan; must cover every glyph that can start a box.
fn is_box_char(c: char) -> bool {
    is_horizontal_char(c)
        || is_vertical_char(c)
        || is_top_left_corner(c)
        || is_top_right_corner(c)
        || is_bottom_left_corner(c)
        || is_bottom_right_corner(c)
        || is_junction_char(c)
}

// ─────────────────────────────────────────────────────────────────────────────
// Box Model
// ─────────────────────────────────────────────────────────────────────────────

/// A detected rectangular box within a text file.
///
/// Line and column indices are 0-based and inclusive. Columns index into
/// the line's characters, not its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AsciiBox {
    /// Row index of the top border in the source file
    top_line: usize,
    /// Row index of the bottom border in the source file
    bottom_line: usize,
    /// Column of the left border glyphs
    left_col: usize,
    /// Column of the right border glyphs (taken from the top border)
    right_col: usize,
    /// Raw text of every row from `top_line` to `bottom_line`
    lines: Vec<String>,
    /// Originating file, for diagnostics
    file_path: String,
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Severity {
    /// Structural problem; fails the lint
    Error,
    /// Advisory finding; reported but never fatal
    #[allow(dead_code)]
    Warning,
}

/// One structural problem found in a box.
///
/// `line` and `column` are 0-based file coordinates; rendering adds 1.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidationError {
    line: usize,
    column: usize,
    message: String,
    severity: Severity,
    /// Suggested remedy, informational only
    fix: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line + 1,
            self.column + 1,
            self.message
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Divider Detection
// ─────────────────────────────────────────────────────────────────────────────

/// Check whether a line is a horizontal divider (`├─────┤`) within a box.
///
/// Divider lines are valid structure: both the validator and the fixer
/// leave them alone. A table separator (`├──┼──┤`) is not a divider; the
/// `┼` between the ends disqualifies it.
fn is_divider_line(line: &str, left_col: usize, right_col: usize) -> bool {
    let chars: Vec<char> = line.chars().collect();
    if left_col >= chars.len() || right_col >= chars.len() {
        return false;
    }

    if !is_left_divider_char(chars[left_col]) || !is_right_divider_char(chars[right_col]) {
        return false;
    }

    // Strictly between the ends: horizontal fill or spaces only
    match chars.get(left_col + 1..right_col) {
        Some(interior) => interior.iter().all(|&c| is_horizontal_char(c) || c == ' '),
        None => false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Box Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Count horizontal border characters on `line` between `left_col` and
/// `right_col` inclusive, clamped to the line's length
fn border_width(line: &str, left_col: usize, right_col: usize) -> usize {
    line.chars()
        .skip(left_col)
        .take(right_col.saturating_sub(left_col) + 1)
        .filter(|&c| is_horizontal_char(c))
        .count()
}

/// Validate a box for alignment issues.
///
/// Checks run in a fixed order: border width first, then the interior
/// lines top to bottom, left edge before right edge. Divider lines are
/// skipped; a space at a border column is tolerated (open edge).
fn validate_box(b: &AsciiBox) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let top_line = b.lines.first().map(String::as_str).unwrap_or("");
    let bottom_line = if b.lines.len() > 1 {
        b.lines.last().map(String::as_str).unwrap_or("")
    } else {
        ""
    };

    let top_width = border_width(top_line, b.left_col, b.right_col);
    let bottom_width = border_width(bottom_line, b.left_col, b.right_col);

    // A width of zero means the border is missing entirely; the comparison
    // only makes sense when both borders have horizontal segments.
    if top_width != bottom_width && top_width > 0 && bottom_width > 0 {
        errors.push(ValidationError {
            line: b.bottom_line,
            column: b.left_col,
            message: format!(
                "Bottom border width ({}) doesn't match top border width ({})",
                bottom_width, top_width
            ),
            severity: Severity::Error,
            fix: "Adjust bottom border to match top border width".to_string(),
        });
    }

    if b.lines.len() >= 2 {
        for (offset, line) in b.lines[1..b.lines.len() - 1].iter().enumerate() {
            let row = b.top_line + offset + 1;

            if is_divider_line(line, b.left_col, b.right_col) {
                continue;
            }

            let chars: Vec<char> = line.chars().collect();

            match chars.get(b.left_col) {
                Some(&c) => {
                    if !is_vertical_char(c) && c != ' ' {
                        errors.push(ValidationError {
                            line: row,
                            column: b.left_col,
                            message: format!(
                                "Left border misaligned: expected vertical character, got '{}'",
                                c
                            ),
                            severity: Severity::Error,
                            fix: "Replace with vertical border character │".to_string(),
                        });
                    }
                }
                None => {
                    errors.push(ValidationError {
                        line: row,
                        column: b.left_col,
                        message: "Left border missing: line too short".to_string(),
                        severity: Severity::Error,
                        fix: "Extend line to include left border".to_string(),
                    });
                }
            }

            match chars.get(b.right_col) {
                Some(&c) => {
                    if !is_vertical_char(c) && c != ' ' {
                        errors.push(ValidationError {
                            line: row,
                            column: b.right_col,
                            message: format!(
                                "Right border misaligned: expected vertical character, got '{}'",
                                c
                            ),
                            severity: Severity::Error,
                            fix: "Replace with vertical border character │".to_string(),
                        });
                    }
                }
                None => {
                    errors.push(ValidationError {
                        line: row,
                        column: b.right_col,
                        message: "Right border missing: line too short".to_string(),
                        severity: Severity::Error,
                        fix: "Extend line to include right border".to_string(),
                    });
                }
            }
        }
    }

    errors
}

// ─────────────────────────────────────────────────────────────────────────────
// Box Fixing
// ─────────────────────────────────────────────────────────────────────────────

/// Characters the fixer accepts at a border column without rewriting.
/// ASCII `|` is deliberately absent: the fixer normalizes it to `│`.
fn is_border_keep_char(c: char) -> bool {
    matches!(c, '│' | '║' | '┃' | '├' | '┤' | '┼')
}

/// Repair alignment issues in a box, returning the corrected lines.
///
/// The top border is the reference and is never modified. The bottom
/// border is rebuilt to span `left_col..=right_col`: corner glyphs already
/// on the line are kept (defaults `└`/`┘` when the line is too short to
/// have them), existing junction glyphs stay in place, everything else
/// becomes the top border's fill character. Interior lines are padded or
/// truncated so a vertical border sits at both edge columns. Divider lines
/// pass through untouched. Indentation before `left_col` and content after
/// `right_col` on the bottom line are preserved.
fn fix_box(b: &AsciiBox) -> Vec<String> {
    if b.lines.len() <= 1 {
        return b.lines.clone();
    }

    let mut fixed = b.lines.clone();
    let bottom_idx = fixed.len() - 1;

    let top_chars: Vec<char> = fixed[0].chars().collect();
    let original_bottom: Vec<char> = fixed[bottom_idx].chars().collect();

    // Corner capture happens before padding so a short bottom line gets the
    // defaults instead of a padding space.
    let left_corner = original_bottom.get(b.left_col).copied().unwrap_or('└');
    let right_corner = original_bottom.get(b.right_col).copied().unwrap_or('┘');

    let fill = top_chars
        .iter()
        .skip(b.left_col)
        .take(b.right_col.saturating_sub(b.left_col) + 1)
        .copied()
        .find(|&c| is_horizontal_char(c))
        .unwrap_or('─');

    let mut bottom_chars = original_bottom;
    while bottom_chars.len() < b.right_col + 1 {
        bottom_chars.push(' ');
    }

    for col in b.left_col..=b.right_col {
        bottom_chars[col] = if col == b.left_col {
            left_corner
        } else if col == b.right_col {
            right_corner
        } else if is_junction_char(bottom_chars[col]) {
            bottom_chars[col]
        } else {
            fill
        };
    }
    fixed[bottom_idx] = bottom_chars.into_iter().collect();

    for i in 1..bottom_idx {
        let trimmed = fixed[i].trim_end();

        // Divider lines are copied through character-for-character
        if is_divider_line(trimmed, b.left_col, b.right_col) {
            continue;
        }

        let mut chars: Vec<char> = trimmed.chars().collect();

        if chars.len() <= b.right_col {
            // A trailing border glyph here is misplaced: drop it and let
            // the border forcing below put one at the right column.
            if matches!(chars.last(), Some('│' | '║' | '┃')) {
                chars.pop();
            }
            while chars.len() < b.right_col + 1 {
                chars.push(' ');
            }
        } else if chars.len() > b.right_col + 1
            && is_vertical_char(chars[b.right_col])
            && is_vertical_char(chars[b.right_col + 1])
        {
            // Duplicate border (`││`, or `┤│` after a table separator)
            chars.truncate(b.right_col + 1);
        }

        if b.left_col < chars.len() && !is_border_keep_char(chars[b.left_col]) {
            chars[b.left_col] = '│';
        }

        if b.right_col < chars.len() && !is_border_keep_char(chars[b.right_col]) {
            chars[b.right_col] = '│';
        }

        let repaired: String = chars.into_iter().collect();
        fixed[i] = repaired.trim_end().to_string();
    }

    fixed
}

// ─────────────────────────────────────────────────────────────────────────────
// Box Discovery
// ─────────────────────────────────────────────────────────────────────────────

/// A top border with no matching bottom within this many rows is not
/// treated as a box
const MAX_BOX_HEIGHT: usize = 500;

/// Check whether a line looks like the top border of a box, returning the
/// border's column span when it does
fn parse_top_border(line: &str) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();

    let left = chars.iter().position(|&c| c != ' ')?;
    if !is_top_left_corner(chars[left]) {
        return None;
    }

    let right = chars.iter().rposition(|c| !c.is_whitespace())?;
    if right <= left + 1 || !is_top_right_corner(chars[right]) {
        return None;
    }

    if chars[left + 1..right]
        .iter()
        .any(|&c| !is_horizontal_char(c) && !is_top_junction(c))
    {
        return None;
    }

    Some((left, right))
}

/// Check whether a line closes a box whose left border sits at `left_col`.
/// Short and corner-less bottoms are accepted; the fixer rebuilds them.
fn parse_bottom_border(line: &str, left_col: usize) -> bool {
    let chars: Vec<char> = line.chars().collect();

    if chars.len() <= left_col || chars[..left_col].iter().any(|&c| c != ' ') {
        return false;
    }

    if !is_bottom_left_corner(chars[left_col]) {
        return false;
    }

    let end = line.trim_end().chars().count();
    chars[left_col + 1..end]
        .iter()
        .all(|&c| is_horizontal_char(c) || is_bottom_junction(c) || is_bottom_right_corner(c))
}

/// Scan raw file lines and group box-shaped regions into [`AsciiBox`]
/// values.
///
/// `right_col` always comes from the top border's corner. Once a box is
/// emitted, scanning resumes after its bottom line, so nested boxes are
/// folded into their outermost container.
fn find_boxes(lines: &[String], file_path: &str) -> Vec<AsciiBox> {
    let mut boxes = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some((left_col, right_col)) = parse_top_border(&lines[i]) else {
            i += 1;
            continue;
        };

        let mut bottom = None;
        let scan_end = lines.len().min(i + MAX_BOX_HEIGHT);
        for (j, line) in lines.iter().enumerate().take(scan_end).skip(i + 1) {
            if parse_bottom_border(line, left_col) {
                bottom = Some(j);
                break;
            }
            // Interior rows must still look box-like
            if !line.chars().any(is_vertical_char) {
                break;
            }
        }

        let Some(bottom_line) = bottom else {
            i += 1;
            continue;
        };

        boxes.push(AsciiBox {
            top_line: i,
            bottom_line,
            left_col,
            right_col,
            lines: lines[i..=bottom_line].to_vec(),
            file_path: file_path.to_string(),
        });

        i = bottom_line + 1;
    }

    boxes
}

// ─────────────────────────────────────────────────────────────────────────────
// Lint Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregated diagnostics for one input
#[derive(Debug, Default)]
struct LintReport {
    boxes_found: usize,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationError>,
}

impl LintReport {
    fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Discover and validate every box in the input
fn lint_lines(lines: &[String], file_path: &str) -> LintReport {
    let mut report = LintReport::default();

    if quick_scan(lines).definitely_boxless() {
        return report;
    }

    let boxes = find_boxes(lines, file_path);
    report.boxes_found = boxes.len();

    for b in &boxes {
        for err in validate_box(b) {
            match err.severity {
                Severity::Error => report.errors.push(err),
                Severity::Warning => report.warnings.push(err),
            }
        }
    }

    report
}

/// Read a file and lint its contents
fn lint_file(path: &Path) -> Result<(Vec<String>, LintReport)> {
    let lines = read_file(path)?;
    let report = lint_lines(&lines, &path.display().to_string());
    Ok((lines, report))
}

/// Running totals across all linted inputs
#[derive(Debug, Default)]
struct LintTotals {
    files_checked: usize,
    boxes_found: usize,
    errors: usize,
    warnings: usize,
}

impl LintTotals {
    fn add(&mut self, report: &LintReport) {
        self.files_checked += 1;
        self.boxes_found += report.boxes_found;
        self.errors += report.errors.len();
        self.warnings += report.warnings.len();
    }
}

/// Print the human-readable per-file lint block
fn print_lint_report(
    label: &str,
    lines: &[String],
    report: &LintReport,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) {
    if config.quiet {
        return;
    }

    console.print("");
    console.print(&styles.bold(format!("Checking {}...", label)));
    console.print(&format!("  Found {} ASCII box(es)", report.boxes_found));

    if config.verbose {
        for b in find_boxes(lines, label) {
            console.print(&styles.dim(format!(
                "  {}: box at lines {}-{}, columns {}-{}",
                b.file_path,
                b.top_line + 1,
                b.bottom_line + 1,
                b.left_col + 1,
                b.right_col + 1
            )));
        }
    }

    for err in &report.errors {
        console.print(&styles.error_line(format!("  {}", err)));
    }
    for warning in &report.warnings {
        console.print(&styles.warning_line(format!("  {}", warning)));
    }

    if report.is_clean() {
        console.print(&styles.success_line("  No issues found"));
    }
}

/// Print the final lint summary block
fn print_lint_summary(totals: &LintTotals, console: &Console, styles: &VerboseStyle) {
    console.print("");
    console.print(&styles.bold("Summary:"));
    console.print(&format!("  Files checked: {}", totals.files_checked));
    console.print(&format!("  Boxes found: {}", totals.boxes_found));

    if totals.errors > 0 {
        console.print(&styles.error_line(format!("  Errors: {}", totals.errors)));
    } else {
        console.print(&styles.success_line("  Errors: 0"));
    }

    if totals.warnings > 0 {
        console.print(&styles.warning_line(format!("  Warnings: {}", totals.warnings)));
    }
}

/// Print one lint result as a JSON document
fn print_lint_json(label: &str, lines: &[String], report: &LintReport) -> Result<()> {
    let text = lines.join("\n");

    let mut diagnostics: Vec<JsonDiagnostic> = report
        .errors
        .iter()
        .map(JsonDiagnostic::from_error)
        .collect();
    diagnostics.extend(report.warnings.iter().map(JsonDiagnostic::from_error));

    let json_output = JsonOutput {
        version: "1.0",
        status: if report.is_clean() {
            "clean".to_string()
        } else {
            "issues".to_string()
        },
        file: Some(label.to_string()),
        input: InputStats {
            lines: lines.len(),
            bytes: text.len(),
        },
        boxes: BoxStats {
            found: report.boxes_found,
            fixed: None,
        },
        diagnostics: Some(diagnostics),
        output: None,
        content: None,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&json_output).context("Failed to serialize JSON output")?
    );

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Fix Pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Counters produced by one fix pass
#[derive(Debug, Default, Clone)]
struct FixSummary {
    boxes_found: usize,
    boxes_fixed: usize,
}

/// Result of fixing a single input (file or stdin)
struct FixResult {
    filename: String,
    original: Vec<String>,
    fixed: Vec<String>,
    summary: FixSummary,
    would_change: bool,
}

/// Discover and repair every box in the input, splicing the repaired lines
/// back into place. Text outside boxes is returned untouched.
fn fix_lines(lines: &[String], file_path: &str) -> (Vec<String>, FixSummary) {
    let mut fixed = lines.to_vec();
    let mut summary = FixSummary::default();

    if quick_scan(lines).definitely_boxless() {
        return (fixed, summary);
    }

    for b in find_boxes(lines, file_path) {
        summary.boxes_found += 1;

        let repaired = fix_box(&b);
        if repaired != b.lines {
            summary.boxes_fixed += 1;
        }

        for (offset, line) in repaired.into_iter().enumerate() {
            fixed[b.top_line + offset] = line;
        }
    }

    (fixed, summary)
}

/// Run the fix pipeline over already-read lines
fn fix_input(lines: Vec<String>, filename: String) -> FixResult {
    let (fixed, summary) = fix_lines(&lines, &filename);
    let would_change = fixed != lines;

    FixResult {
        filename,
        original: lines,
        fixed,
        summary,
        would_change,
    }
}

/// Read a file, fix its boxes, and write the result back in place.
/// Preview modes (`--dry-run`, `--diff`) skip the write.
fn fix_file(
    path: &Path,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<FixResult> {
    let lines = read_file(path)?;
    let result = fix_input(lines, path.display().to_string());

    if !config.dry_run && !config.diff && result.would_change {
        write_fixed_file(path, &result, config, console, styles)?;
    }

    Ok(result)
}

/// Write a fix result back to its file, creating a backup first when
/// configured. A trailing newline is appended to nonempty output.
fn write_fixed_file(
    path: &Path,
    result: &FixResult,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<()> {
    if config.backup {
        let backup_path = create_backup(path, &config.backup_ext)?;
        if config.verbose {
            console.print(&styles.dim(format!("Created backup: {}", backup_path.display())));
        }
    }

    let mut output = result.fixed.join("\n");
    if !output.is_empty() {
        output.push('\n');
    }
    fs::write(path, &output)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    Ok(())
}

/// Print one fix result as a JSON document. The fixed content is only
/// included in stdout mode, where nothing else claims stdout.
fn print_fix_json(result: &FixResult, config: &Config, stdout_mode: bool) -> Result<()> {
    let original_text = result.original.join("\n");
    let fixed_text = result.fixed.join("\n");

    let json_output = JsonOutput {
        version: "1.0",
        status: if config.dry_run {
            "dry_run".to_string()
        } else {
            "success".to_string()
        },
        file: Some(result.filename.clone()),
        input: InputStats {
            lines: result.original.len(),
            bytes: original_text.len(),
        },
        boxes: BoxStats {
            found: result.summary.boxes_found,
            fixed: Some(result.summary.boxes_fixed),
        },
        diagnostics: None,
        output: Some(OutputStats {
            lines: result.fixed.len(),
            bytes: fixed_text.len(),
            changed: result.would_change,
        }),
        content: if stdout_mode && !config.dry_run {
            Some(fixed_text)
        } else {
            None
        },
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&json_output).context("Failed to serialize JSON output")?
    );

    Ok(())
}

/// Print the per-file fix status line
fn print_fix_status(result: &FixResult, config: &Config, console: &Console, styles: &VerboseStyle) {
    if config.quiet {
        return;
    }

    if config.dry_run {
        if result.summary.boxes_fixed > 0 {
            console.print(&styles.info_line(format!(
                "{}: Would fix {} box(es)",
                result.filename, result.summary.boxes_fixed
            )));
        } else {
            console.print(
                &styles.success_line(format!("{}: No fixes needed", result.filename)),
            );
        }
    } else if result.summary.boxes_fixed > 0 {
        console.print(&styles.success_line(format!(
            "{}: Fixed {} box(es)",
            result.filename, result.summary.boxes_fixed
        )));
    } else {
        console.print(&styles.success_line(format!("{}: No fixes needed", result.filename)));
    }
}

/// Print the final fix summary block
fn print_fix_summary(
    files_processed: usize,
    boxes_fixed: usize,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) {
    console.print("");
    console.print(&styles.bold("Summary:"));
    console.print(&format!("  Files processed: {}", files_processed));

    if config.dry_run {
        console.print(&format!("  Boxes that would be fixed: {}", boxes_fixed));
    } else {
        console.print(&format!("  Boxes fixed: {}", boxes_fixed));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recursive File Discovery
// ─────────────────────────────────────────────────────────────────────────────

fn build_globset(patterns: &str) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    let mut added = 0;

    for raw in patterns.split(',') {
        let pattern = raw.trim();
        if pattern.is_empty() {
            continue;
        }

        let glob = Glob::new(pattern)
            .map_err(|err| ArgError(format!("Invalid glob pattern '{}': {}", pattern, err)))?;
        builder.add(glob);
        added += 1;
    }

    if added == 0 {
        return Err(ArgError("--glob must include at least one pattern".to_string()).into());
    }

    builder
        .build()
        .map_err(|err| ArgError(format!("Invalid glob set: {}", err)).into())
}

fn discover_recursive_files(
    paths: &[PathBuf],
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<Vec<PathBuf>> {
    let globs = build_globset(&config.glob)?;
    let mut files = std::collections::BTreeSet::new();

    for path in paths {
        if path.is_file() {
            files.insert(path.clone());
            continue;
        }

        if !path.is_dir() {
            if config.verbose {
                console.print(
                    &styles.dim(format!("Warning: path does not exist: {}", path.display())),
                );
            }
            continue;
        }

        let mut walker = WalkBuilder::new(path);
        walker.git_ignore(config.gitignore);
        walker.git_exclude(config.gitignore);
        walker.git_global(config.gitignore);
        walker.ignore(config.gitignore);
        walker.hidden(false);

        if config.max_depth > 0 {
            walker.max_depth(Some(config.max_depth));
        }

        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if config.verbose {
                        console.print(&styles.dim(format!("Warning: {}", err)));
                    }
                    continue;
                }
            };

            let entry_path = entry.path();
            if entry_path.is_file() {
                if let Some(name) = entry_path.file_name() {
                    if globs.is_match(name) {
                        files.insert(entry_path.to_path_buf());
                    }
                }
            }
        }
    }

    Ok(files.into_iter().collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Backup and File Reading
// ─────────────────────────────────────────────────────────────────────────────

/// Creates a backup of the file by appending the extension to the filename.
/// For example: "file.txt" with extension ".bak" becomes "file.txt.bak"
fn create_backup(path: &Path, ext: &str) -> Result<PathBuf> {
    let mut backup_name = path.as_os_str().to_owned();
    backup_name.push(ext);
    let backup_path = PathBuf::from(backup_name);

    fs::copy(path, &backup_path)
        .with_context(|| format!("Failed to create backup at {}", backup_path.display()))?;

    Ok(backup_path)
}

/// Maximum file size (100 MB) - reject larger files to prevent memory issues
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Read content from a file path and return lines
fn read_file(path: &Path) -> Result<Vec<String>> {
    // Check file size before reading
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    if metadata.len() > MAX_FILE_SIZE {
        return Err(ParseError(format!(
            "File too large: {} ({} MB). Maximum supported size is {} MB.",
            path.display(),
            metadata.len() / (1024 * 1024),
            MAX_FILE_SIZE / (1024 * 1024)
        ))
        .into());
    }

    let source_label = path.display().to_string();
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?;

    parse_bytes_to_lines(bytes, &source_label)
}

/// Read content from stdin and return lines
fn read_stdin_content() -> Result<Vec<String>> {
    let mut buf = Vec::new();
    io::stdin()
        .read_to_end(&mut buf)
        .context("Failed to read stdin")?;
    parse_bytes_to_lines(buf, "stdin")
}

/// Convert raw bytes to lines, checking for binary content and valid UTF-8
fn parse_bytes_to_lines(bytes: Vec<u8>, source_label: &str) -> Result<Vec<String>> {
    if bytes.contains(&0) {
        return Err(ParseError(format!("Input appears to be binary: {}", source_label)).into());
    }

    let content = String::from_utf8(bytes).map_err(|err| {
        let utf8_err = err.utf8_error();
        let valid_up_to = utf8_err.valid_up_to();
        let byte = err.as_bytes().get(valid_up_to).copied();
        let detail = match byte {
            Some(b) => format!(
                "Invalid UTF-8 at byte position {} (byte value: 0x{:02X}) in {}",
                valid_up_to, b, source_label
            ),
            None => format!("Invalid UTF-8 in {}", source_label),
        };
        ParseError(detail)
    })?;

    Ok(content.lines().map(String::from).collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook Management
// ─────────────────────────────────────────────────────────────────────────────

/// Marker comment identifying ascii-guard-generated hooks
const HOOK_MARKER: &str = "# ascii-guard pre-commit hook";

/// Default file patterns for hook
const DEFAULT_PATTERNS: &[&str] = &["*.md", "*.txt"];

/// Run a hook subcommand
fn run_hook_command(action: &HookAction) -> Result<()> {
    match action {
        HookAction::Install {
            check_only,
            auto_fix,
            patterns,
        } => hook_install(*check_only, *auto_fix, patterns.as_deref()),
        HookAction::Uninstall => hook_uninstall(),
        HookAction::Status => hook_status(),
    }
}

/// Find the .git directory, searching upward from current directory
fn find_git_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        let git_dir = current.join(".git");
        if git_dir.is_dir() {
            return Ok(git_dir);
        }
        if !current.pop() {
            return Err(anyhow::anyhow!(
                "Not in a git repository (or any parent up to the filesystem root)"
            ));
        }
    }
}

/// Generate the check-mode hook script
fn generate_check_hook(patterns: &[&str]) -> String {
    let patterns_str = patterns.join(" ");
    format!(
        r#"#!/usr/bin/env bash
{marker} (check mode)
# Generated by: ascii-guard hook install --check-only
# Blocks commits if ASCII boxes have broken borders

set -e

PATTERNS="{patterns}"

# Get staged files matching patterns
staged_files() {{
    for pattern in $PATTERNS; do
        git diff --cached --name-only --diff-filter=ACM | grep -E "${{pattern//\*/.*}}" || true
    done | sort -u
}}

files=$(staged_files)
if [[ -z "$files" ]]; then
    exit 0
fi

failed=0
for file in $files; do
    if ! ascii-guard lint -q "$file" > /dev/null 2>&1; then
        echo "ascii-guard: Box issues found: $file"
        ((failed++)) || true
    fi
done

if [[ $failed -gt 0 ]]; then
    echo ""
    echo "Run 'ascii-guard fix <file>' to repair, or 'git commit --no-verify' to skip"
    exit 1
fi
"#,
        marker = HOOK_MARKER,
        patterns = patterns_str
    )
}

/// Generate the auto-fix mode hook script
fn generate_autofix_hook(patterns: &[&str]) -> String {
    let patterns_str = patterns.join(" ");
    format!(
        r#"#!/usr/bin/env bash
{marker} (auto-fix mode)
# Generated by: ascii-guard hook install --auto-fix
# Automatically repairs ASCII boxes before commit

set -e

PATTERNS="{patterns}"

# Get staged files matching patterns
staged_files() {{
    for pattern in $PATTERNS; do
        git diff --cached --name-only --diff-filter=ACM | grep -E "${{pattern//\*/.*}}" || true
    done | sort -u
}}

files=$(staged_files)
if [[ -z "$files" ]]; then
    exit 0
fi

modified=0
for file in $files; do
    if ! ascii-guard lint -q "$file" > /dev/null 2>&1; then
        echo "ascii-guard: Auto-fixing boxes: $file"
        ascii-guard fix "$file" > /dev/null
        git add "$file"
        ((modified++)) || true
    fi
done

if [[ $modified -gt 0 ]]; then
    echo "ascii-guard: Auto-fixed $modified file(s)"
fi
"#,
        marker = HOOK_MARKER,
        patterns = patterns_str
    )
}

/// Generate the default (check) hook script
fn generate_default_hook(patterns: &[&str]) -> String {
    generate_check_hook(patterns)
}

/// Install the pre-commit hook
fn hook_install(check_only: bool, auto_fix: bool, patterns: Option<&[String]>) -> Result<()> {
    let git_dir = find_git_dir()?;
    let hooks_dir = git_dir.join("hooks");
    let hook_path = hooks_dir.join("pre-commit");

    // Create hooks directory if it doesn't exist
    if !hooks_dir.exists() {
        fs::create_dir_all(&hooks_dir).with_context(|| {
            format!("Failed to create hooks directory: {}", hooks_dir.display())
        })?;
    }

    // Check for existing hook
    if hook_path.exists() {
        let content = fs::read_to_string(&hook_path)
            .with_context(|| format!("Failed to read existing hook: {}", hook_path.display()))?;

        if content.contains(HOOK_MARKER) {
            // Our hook already installed - update it
            println!("Updating existing ascii-guard hook...");
        } else {
            // Different hook present - backup before overwriting
            let backup_path = hook_path.with_extension("pre-ascii-guard");
            fs::rename(&hook_path, &backup_path).with_context(|| {
                format!(
                    "Failed to backup existing hook to: {}",
                    backup_path.display()
                )
            })?;
            println!("Backed up existing hook to: {}", backup_path.display());
        }
    }

    // Determine patterns to use
    let pattern_refs: Vec<&str> = match patterns {
        Some(p) => p.iter().map(|s| s.as_str()).collect(),
        None => DEFAULT_PATTERNS.to_vec(),
    };

    // Generate hook script based on mode
    let script = if auto_fix {
        generate_autofix_hook(&pattern_refs)
    } else if check_only {
        generate_check_hook(&pattern_refs)
    } else {
        // Default to check mode
        generate_default_hook(&pattern_refs)
    };

    // Write hook
    fs::write(&hook_path, &script)
        .with_context(|| format!("Failed to write hook: {}", hook_path.display()))?;

    // Make executable on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms)
            .with_context(|| format!("Failed to make hook executable: {}", hook_path.display()))?;
    }

    let mode = if auto_fix { "auto-fix" } else { "check" };
    println!(
        "Installed ascii-guard pre-commit hook ({} mode): {}",
        mode,
        hook_path.display()
    );
    println!("Patterns: {}", pattern_refs.join(", "));

    Ok(())
}

/// Uninstall the pre-commit hook
fn hook_uninstall() -> Result<()> {
    let git_dir = find_git_dir()?;
    let hook_path = git_dir.join("hooks").join("pre-commit");

    if !hook_path.exists() {
        println!("No pre-commit hook installed");
        return Ok(());
    }

    let content = fs::read_to_string(&hook_path)
        .with_context(|| format!("Failed to read hook: {}", hook_path.display()))?;

    if !content.contains(HOOK_MARKER) {
        return Err(anyhow::anyhow!(
            "Pre-commit hook exists but was not installed by ascii-guard. Remove manually if desired."
        ));
    }

    fs::remove_file(&hook_path)
        .with_context(|| format!("Failed to remove hook: {}", hook_path.display()))?;

    println!("Removed ascii-guard pre-commit hook");

    // Check for backup to restore
    let backup_path = hook_path.with_extension("pre-ascii-guard");
    if backup_path.exists() {
        println!(
            "Note: Previous hook backup exists at: {}",
            backup_path.display()
        );
        println!(
            "Restore it manually with: mv {} {}",
            backup_path.display(),
            hook_path.display()
        );
    }

    Ok(())
}

/// Show hook status
fn hook_status() -> Result<()> {
    let git_dir = find_git_dir()?;
    let hook_path = git_dir.join("hooks").join("pre-commit");

    if !hook_path.exists() {
        println!("Status: No pre-commit hook installed");
        return Ok(());
    }

    let content = fs::read_to_string(&hook_path)
        .with_context(|| format!("Failed to read hook: {}", hook_path.display()))?;

    if content.contains(&format!("{} (check mode)", HOOK_MARKER)) {
        println!("Status: ascii-guard hook installed (check mode)");
        println!("Path: {}", hook_path.display());
    } else if content.contains(&format!("{} (auto-fix mode)", HOOK_MARKER)) {
        println!("Status: ascii-guard hook installed (auto-fix mode)");
        println!("Path: {}", hook_path.display());
    } else if content.contains(HOOK_MARKER) {
        println!("Status: ascii-guard hook installed (unknown mode)");
        println!("Path: {}", hook_path.display());
    } else {
        println!("Status: Non-ascii-guard pre-commit hook present");
        println!("Path: {}", hook_path.display());
    }

    // Check for backup
    let backup_path = hook_path.with_extension("pre-ascii-guard");
    if backup_path.exists() {
        println!("Backup: {}", backup_path.display());
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit_codes::SUCCESS,
                _ => exit_codes::INVALID_ARGS,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let exit_code = match run(args) {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code_for_error(&err)
        }
    };

    std::process::exit(exit_code);
}

fn run(args: Args) -> Result<RunOutcome> {
    validate_args(&args)?;

    match &args.command {
        Some(Commands::Lint(lint)) => run_lint(&args, lint),
        Some(Commands::Fix(fix)) => run_fix(&args, fix),
        Some(Commands::Config { action }) => {
            run_config_command(action, &args)?;
            Ok(RunOutcome::clean())
        }
        Some(Commands::Hook { action }) => {
            run_hook_command(action)?;
            Ok(RunOutcome::clean())
        }
        None => {
            // No subcommand: show usage and exit cleanly
            Args::command()
                .print_help()
                .context("Failed to print help")?;
            Ok(RunOutcome::clean())
        }
    }
}

/// Run the lint subcommand over stdin, explicit files, or a recursive walk
fn run_lint(args: &Args, lint: &LintArgs) -> Result<RunOutcome> {
    let config = create_config(args, &lint.common, None)?;
    let (console, styles) = build_console(config.color);

    let mut totals = LintTotals::default();
    let mut failures: Vec<(PathBuf, anyhow::Error)> = Vec::new();

    if lint.common.inputs.is_empty() {
        // Stdin mode
        let lines = read_stdin_content()?;
        let report = lint_lines(&lines, "stdin");

        if config.json {
            print_lint_json("stdin", &lines, &report)?;
        } else {
            print_lint_report("stdin", &lines, &report, &config, &console, &styles);
        }
        totals.add(&report);
    } else {
        let files: Vec<PathBuf> = if config.recursive {
            discover_recursive_files(&lint.common.inputs, &config, &console, &styles)?
        } else {
            lint.common.inputs.clone()
        };

        if config.recursive && files.is_empty() {
            let message = format!(
                "Warning: No files matched pattern '{}' in provided paths",
                config.glob
            );
            if config.verbose {
                console.print(&styles.dim(message));
            } else {
                eprintln!("{}", message);
            }
            return Ok(RunOutcome::clean());
        }

        for path in &files {
            match lint_file(path) {
                Ok((lines, report)) => {
                    let label = path.display().to_string();
                    if config.json {
                        print_lint_json(&label, &lines, &report)?;
                    } else {
                        print_lint_report(&label, &lines, &report, &config, &console, &styles);
                    }
                    totals.add(&report);
                }
                Err(e) => {
                    eprintln!("Error processing {}: {:#}", path.display(), e);
                    failures.push((path.clone(), e));
                }
            }
        }
    }

    if !config.json {
        print_lint_summary(&totals, &console, &styles);
    }

    if !failures.is_empty() {
        return Err(aggregate_failures(failures));
    }

    Ok(RunOutcome {
        dry_run: false,
        would_change: false,
        lint_errors: totals.errors > 0,
    })
}

/// Run the fix subcommand over stdin, explicit files, or a recursive walk
fn run_fix(args: &Args, fix: &FixArgs) -> Result<RunOutcome> {
    let config = create_config(args, &fix.common, Some(fix))?;
    let (console, styles) = build_console(config.color);

    if config.watch {
        let path = &fix.common.inputs[0];
        return watch_and_fix(path, &config, &console, &styles);
    }

    if fix.common.inputs.is_empty() {
        // Stdin mode: fixed text goes to stdout
        let lines = read_stdin_content()?;
        let result = fix_input(lines, "stdin".to_string());
        let would_change = result.would_change;

        if config.json {
            print_fix_json(&result, &config, true)?;
        } else if config.dry_run {
            if config.diff {
                output_diff(&result, true)?;
            }
            print_fix_status(&result, &config, &console, &styles);
        } else if config.diff {
            output_diff(&result, false)?;
        } else {
            let mut stdout = io::stdout().lock();
            for line in &result.fixed {
                writeln!(stdout, "{}", line)?;
            }
        }

        return Ok(RunOutcome {
            dry_run: config.dry_run,
            would_change,
            lint_errors: false,
        });
    }

    let files: Vec<PathBuf> = if config.recursive {
        discover_recursive_files(&fix.common.inputs, &config, &console, &styles)?
    } else {
        fix.common.inputs.clone()
    };

    if config.recursive && files.is_empty() {
        let message = format!(
            "Warning: No files matched pattern '{}' in provided paths",
            config.glob
        );
        if config.verbose {
            console.print(&styles.dim(message));
        } else {
            eprintln!("{}", message);
        }
        return Ok(RunOutcome {
            dry_run: config.dry_run,
            would_change: false,
            lint_errors: false,
        });
    }

    fix_files(&files, &config, &console, &styles)
}

/// Fix a list of files, continuing past per-file errors
fn fix_files(
    paths: &[PathBuf],
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<RunOutcome> {
    let mut any_would_change = false;
    let mut files_processed = 0;
    let mut total_boxes_fixed = 0;
    let mut failures: Vec<(PathBuf, anyhow::Error)> = Vec::new();

    for path in paths {
        match fix_file(path, config, console, styles) {
            Ok(result) => {
                files_processed += 1;
                total_boxes_fixed += result.summary.boxes_fixed;
                if result.would_change {
                    any_would_change = true;
                }

                if config.json {
                    print_fix_json(&result, config, false)?;
                } else if config.dry_run {
                    if config.diff {
                        output_diff(&result, true)?;
                    }
                    print_fix_status(&result, config, console, styles);
                } else if config.diff {
                    output_diff(&result, false)?;
                } else {
                    print_fix_status(&result, config, console, styles);
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", path.display(), e);
                failures.push((path.clone(), e));
            }
        }
    }

    if !config.json && !config.quiet && !config.diff {
        print_fix_summary(files_processed, total_boxes_fixed, config, console, styles);
    }

    if !failures.is_empty() {
        return Err(aggregate_failures(failures));
    }

    Ok(RunOutcome {
        dry_run: config.dry_run,
        would_change: any_would_change,
        lint_errors: false,
    })
}

/// Collapse per-file failures into one error, preserving parse-error
/// classification for the exit code
fn aggregate_failures(failures: Vec<(PathBuf, anyhow::Error)>) -> anyhow::Error {
    let files = failures
        .iter()
        .map(|(p, _)| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let has_parse_error = failures
        .iter()
        .any(|(_, err)| error_chain_has::<ParseError>(err));

    if has_parse_error {
        ParseError(format!(
            "{} file(s) had parse errors: {}",
            failures.len(),
            files
        ))
        .into()
    } else {
        anyhow::anyhow!("{} file(s) had errors: {}", failures.len(), files)
    }
}

/// Output a unified diff for a fix result
fn output_diff(result: &FixResult, proposed: bool) -> Result<()> {
    if !result.would_change {
        return Ok(());
    }

    let original_text = result.original.join("\n");
    let fixed_text = result.fixed.join("\n");
    let diff = TextDiff::from_lines(&original_text, &fixed_text);
    let mut stdout = io::stdout().lock();

    writeln!(stdout, "--- a/{}", result.filename)?;
    if proposed {
        writeln!(stdout, "+++ b/{} (proposed)", result.filename)?;
    } else {
        writeln!(stdout, "+++ b/{}", result.filename)?;
    }

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        writeln!(stdout, "{}", hunk.header())?;
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            let line = change.value();
            if line.ends_with('\n') {
                write!(stdout, "{}{}", sign, line)?;
            } else {
                writeln!(stdout, "{}{}", sign, line)?;
            }
        }
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Watch Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Watch a file for changes and auto-fix on each save
fn watch_and_fix(
    path: &Path,
    config: &Config,
    console: &Console,
    styles: &VerboseStyle,
) -> Result<RunOutcome> {
    // Validate that the file exists and is readable
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!(
            "--watch requires a file, not a directory: {}",
            path.display()
        );
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    // Set up file watcher
    let (tx, rx) = mpsc::channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch file: {}", path.display()))?;

    let debounce = Duration::from_millis(config.debounce_ms);
    let mut last_event = Instant::now() - debounce; // Allow immediate first run

    eprintln!(
        "Watching {} for changes (Ctrl+C to stop)...",
        path.display()
    );

    let mut any_changes = false;

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => {
                // Only process file modification events
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let now = Instant::now();
                    if now.duration_since(last_event) >= debounce {
                        last_event = now;

                        // Re-read and fix the file
                        match read_file(path) {
                            Ok(lines) => {
                                let result = fix_input(lines, path.display().to_string());

                                if result.would_change {
                                    match write_fixed_file(path, &result, config, console, styles)
                                    {
                                        Ok(()) => {
                                            eprintln!(
                                                "✓ Fixed {} box(es)",
                                                result.summary.boxes_fixed
                                            );
                                            any_changes = true;
                                        }
                                        Err(e) => {
                                            eprintln!("✗ Failed to write: {}", e);
                                        }
                                    }
                                } else {
                                    eprintln!("✓ No changes needed");
                                }
                            }
                            Err(e) => {
                                eprintln!("✗ Error reading file: {}", e);
                            }
                        }
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // Just continue waiting
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                // Watcher disconnected, exit
                break;
            }
        }
    }

    eprintln!("\nWatch mode stopped.");

    Ok(RunOutcome {
        dry_run: false,
        would_change: any_changes,
        lint_errors: false,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
