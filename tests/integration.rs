use std::path::PathBuf;
use std::process::Command;

// ── helpers ──────────────────────────────────────────────────────────────────

fn larch_bin() -> PathBuf {
    // CARGO_BIN_EXE_larch is set by cargo test for integration tests
    PathBuf::from(env!("CARGO_BIN_EXE_larch"))
}

struct TempPy {
    dir: tempfile::TempDir,
    files: Vec<PathBuf>,
}

impl TempPy {
    fn new() -> Self {
        Self {
            dir: tempfile::TempDir::new().unwrap(),
            files: Vec::new(),
        }
    }

    fn file(&mut self, name: &str, content: &str) -> &mut Self {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        self.files.push(path);
        self
    }

    /// Run larch with the given extra args.  Returns (stdout, stderr, exit_code).
    fn run(&self, extra: &[&str]) -> (String, String, i32) {
        let mut cmd = Command::new(larch_bin());
        for f in &self.files {
            cmd.arg(f);
        }
        for a in extra {
            cmd.arg(a);
        }
        let out = cmd.output().expect("failed to run larch");
        (
            String::from_utf8_lossy(&out.stdout).into_owned(),
            String::from_utf8_lossy(&out.stderr).into_owned(),
            out.status.code().unwrap_or(-1),
        )
    }

    /// Convenience: run with --no-exit-code so exit code is always 0.
    fn run_no_exit(&self, extra: &[&str]) -> String {
        let mut args = vec!["--no-exit-code"];
        args.extend_from_slice(extra);
        let (stdout, _, _) = self.run(&args);
        stdout
    }
}

// ── basic output ─────────────────────────────────────────────────────────────

#[test]
fn test_clean_file_summary() {
    let mut t = TempPy::new();
    t.file("clean.py", "x = 1\nprint(x)\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("1 file(s) parsed cleanly"), "got: {out}");
    assert!(!out.contains("Error"));
}

#[test]
fn test_exit_code_0_when_clean() {
    let mut t = TempPy::new();
    t.file("clean.py", "def foo():\n    return 1\n");
    let (_, _, code) = t.run(&[]);
    assert_eq!(code, 0);
}

#[test]
fn test_exit_code_1_on_parse_failure() {
    let mut t = TempPy::new();
    t.file("bad.py", "def foo(\n");
    let (_, _, code) = t.run(&[]);
    assert_eq!(code, 1);
}

#[test]
fn test_no_exit_code_flag() {
    let mut t = TempPy::new();
    t.file("bad.py", "def foo(\n");
    let (_, _, code) = t.run(&["--no-exit-code"]);
    assert_eq!(code, 0);
}

#[test]
fn test_failure_summary_counts() {
    let mut t = TempPy::new();
    t.file("good.py", "x = 1\n");
    t.file("bad.py", "x = (1\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("1 of 2 file(s) failed to parse"), "got: {out}");
}

// ── diagnostic format ────────────────────────────────────────────────────────

#[test]
fn test_output_format_file_line_col_kind() {
    let mut t = TempPy::new();
    t.file("f.py", "x = 1\ny = 'unterminated\n");
    let out = t.run_no_exit(&[]);
    let diag_line = out
        .lines()
        .find(|l| l.contains("LexicalError"))
        .expect("must have a LexicalError line");
    assert!(
        diag_line.contains("f.py") && diag_line.contains(":2:5:"),
        "format must be path:line:col: Kind: msg, got: {diag_line}"
    );
    assert!(diag_line.contains("unterminated string literal"));
}

#[test]
fn test_syntax_error_kind_reported() {
    let mut t = TempPy::new();
    t.file("f.py", "def foo(:\n    pass\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("SyntaxError"), "got: {out}");
}

#[test]
fn test_unsupported_construct_kind_reported() {
    let mut t = TempPy::new();
    t.file("f.py", "ok = 0 <= x <= 10\n");
    let out = t.run_no_exit(&[]);
    assert!(out.contains("UnsupportedConstructError"), "got: {out}");
    assert!(out.contains("chained comparisons"));
}

#[test]
fn test_first_error_only_per_file() {
    // Two broken statements, only the first is reported.
    let mut t = TempPy::new();
    t.file("f.py", "x = (1\ny = )2\n");
    let out = t.run_no_exit(&[]);
    let errors = out.lines().filter(|l| l.contains("f.py:")).count();
    assert_eq!(errors, 1, "exactly one diagnostic per file, got: {out}");
}

// ── --json output ─────────────────────────────────────────────────────────────

#[test]
fn test_json_output_clean_file() {
    let mut t = TempPy::new();
    t.file("f.py", "import os\n\nx = 1\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    assert_eq!(parsed["count"], 1);
    assert_eq!(parsed["failed"], 0);
    let file = &parsed["files"][0];
    assert_eq!(file["ok"], true);
    assert_eq!(file["statements"], 2);
}

#[test]
fn test_json_output_failing_file() {
    let mut t = TempPy::new();
    t.file("f.py", "x = 1\ny = 'open\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    assert_eq!(parsed["failed"], 1);
    let err = &parsed["files"][0]["error"];
    assert_eq!(err["kind"], "LexicalError");
    assert_eq!(err["line"], 2);
    assert_eq!(err["col"], 5);
    assert!(err["message"].as_str().unwrap().contains("unterminated"));
}

#[test]
fn test_json_mixed_files_sorted() {
    let mut t = TempPy::new();
    t.file("zzz.py", "x = 1\n");
    t.file("aaa.py", "y = 2\n");
    let out = t.run_no_exit(&["--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).expect("valid JSON");
    let files = parsed["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files[0]["file"].as_str().unwrap().ends_with("aaa.py"));
    assert!(files[1]["file"].as_str().unwrap().ends_with("zzz.py"));
}

// ── directory scanning ────────────────────────────────────────────────────────

#[test]
fn test_scan_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.py"), "x = 1\n").unwrap();
    std::fs::write(dir.path().join("b.py"), "y = (2\n").unwrap();
    std::fs::write(dir.path().join("readme.txt"), "not python\n").unwrap();

    let out = Command::new(larch_bin())
        .arg(dir.path())
        .arg("--no-exit-code")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 of 2 file(s) failed to parse"), "got: {stdout}");
}

#[test]
fn test_scan_directory_with_exclude() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("migrations")).unwrap();
    std::fs::write(dir.path().join("migrations/0001.py"), "x = (1\n").unwrap();
    std::fs::write(dir.path().join("app.py"), "x = 1\n").unwrap();

    let out = Command::new(larch_bin())
        .arg(dir.path())
        .arg("--exclude")
        .arg("migrations")
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 file(s) parsed cleanly"), "got: {stdout}");
    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_realistic_module_parses() {
    let mut t = TempPy::new();
    t.file(
        "app.py",
        r#"
import os
from typing import Optional


class Config:
    def __init__(self, root, *, debug=False):
        self.root = root
        self.debug = debug

    def describe(self) -> str:
        return f"Config(root={self.root!r}, debug={self.debug})"


def load(path: str, fallback: Optional[str] = None) -> Config:
    if not os.path.exists(path):
        if fallback is None:
            raise FileNotFoundError(path)
        path = fallback
    entries = [line.strip() for line in open(path) if line.strip()]
    return Config(root=entries[0] if entries else ".")
"#,
    );
    let (out, _, code) = t.run(&[]);
    assert_eq!(code, 0, "got: {out}");
    assert!(out.contains("parsed cleanly"));
}
