use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::path::PathBuf;
use std::process;

use larch::{discovery, driver};

#[derive(Parser)]
#[command(
    name = "larch",
    about = "Fast Python parser and syntax checker",
    version,
    long_about = "Larch parses Python source files and reports the first lexical, \
                  syntactic, or unsupported-construct error in each, with precise \
                  line and column positions.\n\n\
                  Pass files or directories; directories are walked recursively \
                  for .py files."
)]
struct Cli {
    /// Files or directories to parse.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Exclude directories or files whose path contains any of the given
    /// comma-separated names (e.g. --exclude tests,migrations,vendor).
    /// Hidden directories (.git, .venv, __pycache__, etc.) are always excluded
    /// regardless of this flag.
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Emit results as JSON instead of the default text format.
    #[arg(long)]
    json: bool,

    /// Exit with code 0 even when files fail to parse (useful in CI with --json).
    #[arg(long)]
    no_exit_code: bool,
}

fn main() {
    let cli = Cli::parse();
    let exclude: Vec<String> = cli.exclude.unwrap_or_default();

    // ── file discovery ────────────────────────────────────────────────────────
    let mut files = Vec::new();
    for path in &cli.paths {
        if path.is_file() {
            files.push(path.clone());
        } else {
            match discovery::discover_python_files(path, &exclude) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    eprintln!("{}: {e}", "error".red().bold());
                    process::exit(2);
                }
            }
        }
    }

    // ── parallel parse ────────────────────────────────────────────────────────
    let reports = match driver::check_files(&files) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}: {e:#}", "error".red().bold());
            process::exit(2);
        }
    };

    let failed = reports.iter().filter(|r| !r.is_ok()).count();

    // ── output ────────────────────────────────────────────────────────────────
    if cli.json {
        print_json(&reports, failed);
    } else {
        for r in &reports {
            if let Some(err) = &r.error {
                println!(
                    "{}:{}:{}: {}: {}",
                    r.file.bold(),
                    err.line,
                    err.col,
                    err.kind.red().bold(),
                    err.message
                );
            }
        }
        let total = reports.len();
        if failed == 0 {
            println!("{}", format!("{total} file(s) parsed cleanly").green());
        } else {
            println!(
                "{}",
                format!("{failed} of {total} file(s) failed to parse")
                    .yellow()
                    .bold()
            );
        }
    }

    // ── exit code ─────────────────────────────────────────────────────────────
    if !cli.no_exit_code && failed > 0 {
        process::exit(1);
    }
}

/// Emit valid, well-formatted JSON using serde_json.
fn print_json(reports: &[driver::FileReport], failed: usize) {
    let items: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| match &r.error {
            None => json!({
                "file":       r.file,
                "ok":         true,
                "statements": r.statements,
            }),
            Some(e) => json!({
                "file": r.file,
                "ok":   false,
                "error": {
                    "kind":    e.kind,
                    "message": e.message,
                    "line":    e.line,
                    "col":     e.col,
                },
            }),
        })
        .collect();

    let output = json!({
        "files":  items,
        "count":  reports.len(),
        "failed": failed,
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).expect("serde_json::Value is always serialisable")
    );
}
