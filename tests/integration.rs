//! E2E Integration tests for ascii-guard
//!
//! Run with: cargo test --test integration
//! Verbose:  TEST_VERBOSE=1 cargo test --test integration -- --nocapture

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

/// Test logging macro - prints when TEST_VERBOSE is set
macro_rules! test_log {
    ($level:expr, $($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            eprintln!("[{}] [integration:{}] {}",
                $level,
                line!(),
                format!($($arg)*)
            );
        }
    };
}

fn get_binary_path() -> PathBuf {
    if let Ok(bin_path) = std::env::var("CARGO_BIN_EXE_ascii-guard") {
        let path = PathBuf::from(bin_path);
        if path.exists() {
            return path;
        }
    }

    // Try release first, then debug
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let release_path = PathBuf::from(manifest_dir).join("target/release/ascii-guard");
    let debug_path = PathBuf::from(manifest_dir).join("target/debug/ascii-guard");

    // Check CARGO_TARGET_DIR override
    if let Ok(target_dir) = std::env::var("CARGO_TARGET_DIR") {
        let custom_release = PathBuf::from(&target_dir).join("release/ascii-guard");
        let custom_debug = PathBuf::from(&target_dir).join("debug/ascii-guard");
        if custom_release.exists() {
            return custom_release;
        }
        if custom_debug.exists() {
            return custom_debug;
        }
    }

    if release_path.exists() {
        release_path
    } else if debug_path.exists() {
        debug_path
    } else {
        panic!(
            "ascii-guard binary not found. Run 'cargo build' or 'cargo build --release' first.\n\
             Looked in:\n  - {}\n  - {}",
            release_path.display(),
            debug_path.display()
        );
    }
}

fn run_guard_stdin(input: &str, args: &[&str]) -> (String, String, i32) {
    test_log!("RUN", "ascii-guard with args: {:?}", args);
    test_log!("INPUT", "Input length: {} bytes", input.len());

    let binary = get_binary_path();
    test_log!("BIN", "Using binary: {}", binary.display());

    let mut child = Command::new(&binary)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ascii-guard");

    // Write input to stdin
    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("Failed to wait on ascii-guard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    test_log!("OUTPUT", "Exit code: {}", code);
    test_log!("OUTPUT", "Stdout length: {} bytes", stdout.len());
    if !stderr.is_empty() {
        test_log!("STDERR", "{}", stderr);
    }

    (stdout, stderr, code)
}

fn run_guard_args(args: &[&str]) -> (String, String, i32) {
    test_log!("RUN", "ascii-guard with args: {:?}", args);

    let binary = get_binary_path();
    let output = Command::new(&binary)
        .args(args)
        .output()
        .expect("Failed to run ascii-guard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    test_log!("OUTPUT", "Exit code: {}", code);

    (stdout, stderr, code)
}

fn run_guard_in_dir(dir: &Path, args: &[&str]) -> (String, String, i32) {
    test_log!("RUN", "ascii-guard in {} with args: {:?}", dir.display(), args);

    let binary = get_binary_path();
    let output = Command::new(&binary)
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run ascii-guard");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    test_log!("OUTPUT", "Exit code: {}", code);

    (stdout, stderr, code)
}

// ============================================================================
// Lint Tests
// ============================================================================

#[test]
fn test_e2e_lint_stdin_clean() {
    test_log!("START", "Lint clean box from stdin");

    let input = "┌───┐
│ a │
└───┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint"]);

    assert_eq!(code, 0, "Clean input should exit 0");
    assert!(
        stdout.contains("No issues found"),
        "Should report no issues"
    );
    assert!(stdout.contains("Errors: 0"), "Summary should show 0 errors");
    assert!(stdout.contains("Boxes found: 1"), "Should count the box");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_lint_stdin_broken() {
    test_log!("START", "Lint broken box from stdin");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint"]);

    assert_eq!(code, 1, "Broken box should exit 1");
    assert!(
        stdout.contains("Right border missing"),
        "Should describe the broken border"
    );
    assert!(
        stdout.contains("line 2, column 6"),
        "Should point at the file coordinates"
    );
    assert!(stdout.contains("Summary:"), "Should print the summary");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_lint_quiet_mode() {
    test_log!("START", "Quiet mode suppresses per-file output");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint", "-q"]);

    assert_eq!(code, 1, "Quiet mode still reports errors via exit code");
    assert!(
        !stdout.contains("Checking"),
        "Per-file block should be suppressed"
    );
    assert!(stdout.contains("Summary:"), "Summary is still printed");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_lint_multiple_files() {
    test_log!("START", "Lint multiple files");

    let temp = TempDir::new().unwrap();
    let clean = temp.path().join("clean.txt");
    let broken = temp.path().join("broken.txt");
    fs::write(&clean, "┌───┐\n│ a │\n└───┘\n").unwrap();
    fs::write(&broken, "┌───┐\n│ a\n└───┘\n").unwrap();

    let (stdout, _stderr, code) = run_guard_args(&[
        "lint",
        clean.to_str().unwrap(),
        broken.to_str().unwrap(),
    ]);

    assert_eq!(code, 1, "One broken file should fail the run");
    assert!(
        stdout.contains("Files checked: 2"),
        "Summary should count both files"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_lint_no_boxes() {
    test_log!("START", "Lint plain prose without boxes");

    let input = "This is just plain text.\nNo diagrams here.\n";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint"]);

    assert_eq!(code, 0, "No boxes means nothing to complain about");
    assert!(stdout.contains("Boxes found: 0"), "Should report zero boxes");

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Fix Tests
// ============================================================================

#[test]
fn test_e2e_fix_stdin_repairs_box() {
    test_log!("START", "Fix broken box from stdin");

    let input = "┌────┐
│ a
└────┘";

    let expected = "┌────┐
│ a  │
└────┘
";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix"]);

    assert_eq!(code, 0, "Should exit successfully");
    assert_eq!(stdout, expected, "Stdout should carry the repaired text");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_stdin_preserves_prose() {
    test_log!("START", "Fix preserves text around boxes");

    let input = "Intro paragraph.

┌─────┐
│ box
└─────┘

Closing words.";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix"]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(stdout.contains("Intro paragraph."), "Prose before survives");
    assert!(stdout.contains("Closing words."), "Prose after survives");
    assert!(stdout.contains("│ box │"), "Box interior is repaired");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_stdin_empty_input() {
    test_log!("START", "Empty stdin input");

    let (stdout, _stderr, code) = run_guard_stdin("", &["fix"]);

    assert_eq!(code, 0, "Empty input should exit 0");
    assert!(stdout.is_empty(), "Empty input produces empty output");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_file_in_place() {
    test_log!("START", "Fix file in place");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("diagram.txt");
    fs::write(&path, "┌────┐\n│ a\n└────┘\n").unwrap();

    let (stdout, _stderr, code) = run_guard_args(&["fix", path.to_str().unwrap()]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(stdout.contains("Fixed 1 box(es)"), "Should report the fix");
    assert!(stdout.contains("Boxes fixed: 1"), "Summary should count it");

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents, "┌────┐\n│ a  │\n└────┘\n",
        "File should be rewritten with the repair and a trailing newline"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_clean_file_untouched() {
    test_log!("START", "Clean file is not rewritten");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("diagram.txt");
    let original = "┌────┐\n│ ab │\n└────┘\n";
    fs::write(&path, original).unwrap();

    let (stdout, _stderr, code) = run_guard_args(&["fix", path.to_str().unwrap()]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(stdout.contains("No fixes needed"), "Should report no fixes");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        original,
        "File content should be untouched"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_backup() {
    test_log!("START", "Backup before writing fixes");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("diagram.txt");
    let original = "┌────┐\n│ a\n└────┘\n";
    fs::write(&path, original).unwrap();

    let (_stdout, _stderr, code) = run_guard_args(&["fix", "--backup", path.to_str().unwrap()]);

    assert_eq!(code, 0, "Should exit successfully");

    let backup = temp.path().join("diagram.txt.bak");
    assert!(backup.exists(), "Backup file should be created");
    assert_eq!(
        fs::read_to_string(&backup).unwrap(),
        original,
        "Backup should hold the original content"
    );
    assert!(
        fs::read_to_string(&path).unwrap().contains("│ a  │"),
        "Main file should be fixed"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_style_aware_bottom_rebuild() {
    test_log!("START", "Bottom border rebuilt with matching fill");

    let input = "╔════╗
║ bb ║
╚═══";

    let expected = "╔════╗
║ bb ║
╚════┘
";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix"]);

    assert_eq!(code, 0, "Should exit successfully");
    assert_eq!(
        stdout, expected,
        "Fill should follow the top border style; the missing corner gets the default"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_cjk_content() {
    test_log!("START", "CJK content handling");

    let input = "┌──────────┐
│ Hello 你好
└──────────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix"]);

    assert_eq!(code, 0, "Should handle CJK content successfully");
    assert!(
        stdout.contains("Hello 你好"),
        "Should preserve CJK characters"
    );
    assert!(
        stdout.contains("│ Hello 你好 │"),
        "Should pad by character count"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_multiple_boxes() {
    test_log!("START", "Multiple boxes in one input");

    let input = "First:
┌───┐
│ a
└───┘

Second:
┌────┐
│ bb
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix"]);

    assert_eq!(code, 0, "Should handle multiple boxes");
    assert!(stdout.contains("│ a │"), "First box repaired");
    assert!(stdout.contains("│ bb │"), "Second box repaired");

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Dry-Run and Diff Tests
// ============================================================================

#[test]
fn test_e2e_exit_code_dry_run_would_change() {
    test_log!("START", "Exit code 3 on dry-run when changes would be made");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("diagram.txt");
    let original = "┌────┐\n│ a\n└────┘\n";
    fs::write(&path, original).unwrap();

    let (stdout, _stderr, code) = run_guard_args(&["fix", "-n", path.to_str().unwrap()]);

    assert_eq!(code, 3, "Should return 3 (WOULD_CHANGE) when changes needed");
    assert!(stdout.contains("Would fix 1 box(es)"), "Should preview the fix");
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        original,
        "Dry-run must not modify the file"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_exit_code_dry_run_no_changes() {
    test_log!("START", "Exit code 0 on dry-run with no changes");

    let input = "┌───┐
│ a │
└───┘";

    let (_stdout, _stderr, code) = run_guard_stdin(input, &["fix", "-n"]);
    assert_eq!(code, 0, "Should return 0 when no changes needed");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_diff_mode_with_changes() {
    test_log!("START", "Diff mode with changes");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix", "--diff"]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(stdout.contains("--- a/stdin"), "Should contain diff header");
    assert!(stdout.contains("+++ b/stdin"), "Should contain diff header");
    assert!(stdout.contains("-│ a"), "Should show removed line");
    assert!(stdout.contains("+│ a  │"), "Should show added line");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_diff_mode_no_changes() {
    test_log!("START", "Diff mode with no changes");

    let input = "┌───┐
│ a │
└───┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix", "--diff"]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(
        stdout.trim().is_empty(),
        "Should produce no diff when no changes"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_diff_dry_run_proposed_header() {
    test_log!("START", "Dry-run diff marks output as proposed");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix", "-n", "-d"]);

    assert_eq!(code, 3, "Dry-run with changes still exits 3");
    assert!(
        stdout.contains("+++ b/stdin (proposed)"),
        "Header should flag the diff as proposed"
    );

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Recursive Mode Tests
// ============================================================================

#[test]
fn test_e2e_recursive_fix() {
    test_log!("START", "Recursive in-place processing");

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let nested = root.join("nested");
    fs::create_dir_all(&nested).unwrap();

    let input = "┌───┐\n│ a\n└───┘\n";
    fs::write(root.join("a.md"), input).unwrap();
    fs::write(nested.join("b.md"), input).unwrap();

    let dir_arg = root.to_str().unwrap();
    let (stdout, _stderr, code) = run_guard_args(&["fix", "-r", "--glob", "*.md", dir_arg]);

    assert_eq!(code, 0, "Should exit successfully");
    assert!(
        stdout.contains("Files processed: 2"),
        "Both files should be processed"
    );

    let a_contents = fs::read_to_string(root.join("a.md")).unwrap();
    let b_contents = fs::read_to_string(nested.join("b.md")).unwrap();
    assert!(a_contents.contains("│ a │"));
    assert!(b_contents.contains("│ a │"));

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_recursive_respects_gitignore() {
    test_log!("START", "Recursive mode respects .gitignore by default");

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".gitignore"), "ignored.md\n").unwrap();

    let input = "┌───┐\n│ a\n└───┘\n";
    fs::write(root.join("included.md"), input).unwrap();
    fs::write(root.join("ignored.md"), input).unwrap();

    let dir_arg = root.to_str().unwrap();
    let (_stdout, _stderr, code) = run_guard_args(&["fix", "-r", "--glob", "*.md", dir_arg]);

    assert_eq!(code, 0, "Should exit successfully");

    let included = fs::read_to_string(root.join("included.md")).unwrap();
    let ignored = fs::read_to_string(root.join("ignored.md")).unwrap();
    assert!(included.contains("│ a │"), "Included file should be fixed");
    assert!(
        ignored.contains("│ a\n"),
        "Ignored file should remain unchanged"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_recursive_no_matches_warning() {
    test_log!("START", "Recursive mode warns when nothing matches");

    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("code.rs"), "fn main() {}\n").unwrap();

    let dir_arg = temp.path().to_str().unwrap();
    let (_stdout, stderr, code) = run_guard_args(&["lint", "-r", "--glob", "*.md", dir_arg]);

    assert_eq!(code, 0, "No matches is not an error");
    assert!(
        stderr.contains("No files matched pattern '*.md'"),
        "Should warn about the unmatched pattern"
    );

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_e2e_exit_code_nonexistent_file() {
    test_log!("START", "Exit code 1 for non-existent file");

    let (_stdout, stderr, code) = run_guard_args(&["lint", "/nonexistent/path/file.txt"]);

    assert_eq!(code, 1, "Should return 1 for non-existent file");
    assert!(
        stderr.contains("Error processing"),
        "Should report the failing path"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_exit_code_invalid_utf8() {
    test_log!("START", "Exit code 4 for invalid UTF-8");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("invalid_utf8.txt");
    fs::write(&path, [0xff, 0xfe]).expect("Failed to write temp file");

    let (_stdout, stderr, code) = run_guard_args(&["lint", path.to_str().unwrap()]);

    assert_eq!(code, 4, "Should return 4 (PARSE_ERROR) for invalid UTF-8");
    assert!(
        stderr.contains("Invalid UTF-8"),
        "Error message should mention invalid UTF-8"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_binary_file_detection() {
    test_log!("START", "Binary file detection with null bytes");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("blob.bin");
    fs::write(&path, b"\xE2\x94\x8C\0\xE2\x94\x90").expect("Failed to write temp file");

    let (_stdout, stderr, code) = run_guard_args(&["fix", path.to_str().unwrap()]);

    assert_eq!(code, 4, "Should return 4 (PARSE_ERROR) for binary input");
    assert!(
        stderr.contains("binary"),
        "Error message should mention binary"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_exit_code_conflicting_flags() {
    test_log!("START", "Exit code 2 for conflicting flags");

    let (_stdout, _stderr, code) = run_guard_stdin("", &["lint", "--json", "--verbose"]);
    assert_eq!(code, 2, "Conflicting flags should return 2 (INVALID_ARGS)");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_exit_code_recursive_without_inputs() {
    test_log!("START", "Exit code 2 when --recursive lacks inputs");

    let (_stdout, stderr, code) = run_guard_stdin("", &["lint", "-r"]);

    assert_eq!(code, 2, "Should return 2 (INVALID_ARGS)");
    assert!(
        stderr.contains("--recursive requires at least one input path"),
        "Error should name the missing inputs"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_no_args_shows_help() {
    test_log!("START", "No arguments prints usage and exits 0");

    let (stdout, _stderr, code) = run_guard_args(&[]);

    assert_eq!(code, 0, "Bare invocation should exit 0");
    assert!(stdout.contains("Usage"), "Should print usage text");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_help_lists_exit_codes() {
    test_log!("START", "--help includes the exit code table");

    let (stdout, _stderr, code) = run_guard_args(&["--help"]);

    assert_eq!(code, 0, "--help should exit 0");
    assert!(stdout.contains("EXIT CODES"), "Help should list exit codes");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_version_flag() {
    test_log!("START", "--version prints the package name");

    let (stdout, _stderr, code) = run_guard_args(&["--version"]);

    assert_eq!(code, 0, "--version should exit 0");
    assert!(stdout.contains("ascii-guard"), "Should print the name");

    test_log!("END", "Test PASSED");
}

// ============================================================================
// JSON Output Tests
// ============================================================================

#[test]
fn test_e2e_lint_json_clean() {
    test_log!("START", "Lint JSON output for clean input");

    let input = "┌───┐
│ a │
└───┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint", "--json"]);

    assert_eq!(code, 0, "Clean input should exit 0");

    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("Valid JSON expected");
    assert_eq!(v["version"], "1.0");
    assert_eq!(v["status"], "clean");
    assert_eq!(v["file"], "stdin");
    assert_eq!(v["boxes"]["found"], 1);
    assert_eq!(v["diagnostics"].as_array().map(|a| a.len()), Some(0));

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_lint_json_issues() {
    test_log!("START", "Lint JSON output for broken input");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["lint", "--json"]);

    assert_eq!(code, 1, "Broken input should exit 1");

    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("Valid JSON expected");
    assert_eq!(v["status"], "issues");

    let diag = &v["diagnostics"][0];
    assert_eq!(diag["line"], 2, "Diagnostic line is 1-based");
    assert_eq!(diag["column"], 6, "Diagnostic column is 1-based");
    assert_eq!(diag["severity"], "error");
    assert!(
        diag["message"]
            .as_str()
            .unwrap()
            .contains("Right border missing"),
        "Diagnostic message should describe the problem"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_json_stdin_includes_content() {
    test_log!("START", "Fix JSON output on stdin carries the fixed text");

    let input = "┌────┐
│ a
└────┘";

    let (stdout, _stderr, code) = run_guard_stdin(input, &["fix", "--json"]);

    assert_eq!(code, 0, "Should exit successfully");

    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("Valid JSON expected");
    assert_eq!(v["status"], "success");
    assert_eq!(v["boxes"]["found"], 1);
    assert_eq!(v["boxes"]["fixed"], 1);
    assert_eq!(v["output"]["changed"], true);
    assert_eq!(v["content"], "┌────┐\n│ a  │\n└────┘");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_fix_json_file_omits_content() {
    test_log!("START", "Fix JSON output for files omits content");

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("diagram.txt");
    fs::write(&path, "┌────┐\n│ a\n└────┘\n").unwrap();

    let (stdout, _stderr, code) = run_guard_args(&["fix", "--json", path.to_str().unwrap()]);

    assert_eq!(code, 0, "Should exit successfully");

    let v: serde_json::Value = serde_json::from_str(stdout.trim()).expect("Valid JSON expected");
    assert_eq!(v["status"], "success");
    assert_eq!(v["file"], path.to_str().unwrap());
    assert!(v.get("content").is_none(), "File mode omits content");
    assert!(
        fs::read_to_string(&path).unwrap().contains("│ a  │"),
        "File should still be fixed on disk"
    );

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_e2e_config_init_and_path() {
    test_log!("START", "config init creates a file that config path finds");

    let temp = TempDir::new().unwrap();

    let (_stdout, stderr, code) = run_guard_in_dir(temp.path(), &["config", "init"]);
    assert_eq!(code, 0, "Init should succeed in an empty directory");
    assert!(
        stderr.contains("Created config file"),
        "Should announce the new file"
    );
    assert!(
        temp.path().join(".asciiguardrc").exists(),
        "Config file should exist"
    );

    let (stdout, _stderr, code) = run_guard_in_dir(temp.path(), &["config", "path"]);
    assert_eq!(code, 0, "Path should succeed once the file exists");
    assert!(
        stdout.trim().ends_with(".asciiguardrc"),
        "Should print the config path"
    );

    let (_stdout, stderr, code) = run_guard_in_dir(temp.path(), &["config", "init"]);
    assert_eq!(code, 1, "Second init should fail");
    assert!(
        stderr.contains("already exists"),
        "Should explain why init failed"
    );

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_config_glob_respected() {
    test_log!("START", "Config file glob narrows recursive fixes");

    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join(".asciiguardrc"), "glob = \"*.md\"\n").unwrap();

    let input = "┌───┐\n│ a\n└───┘\n";
    fs::write(root.join("doc.md"), input).unwrap();
    fs::write(root.join("note.txt"), input).unwrap();

    let dir_arg = root.to_str().unwrap();
    let (_stdout, _stderr, code) = run_guard_args(&["fix", "-r", dir_arg]);
    assert_eq!(code, 0, "Should exit successfully");

    assert!(
        fs::read_to_string(root.join("doc.md")).unwrap().contains("│ a │"),
        "Matching file should be fixed"
    );
    assert!(
        fs::read_to_string(root.join("note.txt")).unwrap().contains("│ a\n"),
        "Non-matching file should be skipped"
    );

    // --no-config falls back to the default glob, which includes *.txt
    let (_stdout, _stderr, code) = run_guard_args(&["fix", "-r", "--no-config", dir_arg]);
    assert_eq!(code, 0, "Should exit successfully");
    assert!(
        fs::read_to_string(root.join("note.txt")).unwrap().contains("│ a │"),
        "Without the config the default glob picks up the .txt file"
    );

    test_log!("END", "Test PASSED");
}

// ============================================================================
// Hook Command Tests
// ============================================================================

#[test]
fn test_e2e_hook_lifecycle() {
    test_log!("START", "Hook install, status, uninstall");

    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();

    let (stdout, _stderr, code) = run_guard_in_dir(temp.path(), &["hook", "install"]);
    assert_eq!(code, 0, "Install should succeed inside a git repo");
    assert!(
        stdout.contains("check mode"),
        "Default install uses check mode"
    );

    let hook_path = temp.path().join(".git").join("hooks").join("pre-commit");
    assert!(hook_path.exists(), "Hook script should be written");
    assert!(
        fs::read_to_string(&hook_path)
            .unwrap()
            .contains("ascii-guard pre-commit hook"),
        "Hook should carry the marker"
    );

    let (stdout, _stderr, code) = run_guard_in_dir(temp.path(), &["hook", "status"]);
    assert_eq!(code, 0, "Status should succeed");
    assert!(stdout.contains("check mode"), "Status should name the mode");

    let (_stdout, _stderr, code) = run_guard_in_dir(temp.path(), &["hook", "uninstall"]);
    assert_eq!(code, 0, "Uninstall should succeed");
    assert!(!hook_path.exists(), "Hook script should be removed");

    test_log!("END", "Test PASSED");
}

#[test]
fn test_e2e_hook_outside_repo_fails() {
    test_log!("START", "Hook install outside a git repo fails");

    let temp = TempDir::new().unwrap();
    let (_stdout, stderr, code) = run_guard_in_dir(temp.path(), &["hook", "install"]);

    assert_eq!(code, 1, "Should fail without a .git directory");
    assert!(
        stderr.contains("Not in a git repository"),
        "Error should explain the missing repo"
    );

    test_log!("END", "Test PASSED");
}
