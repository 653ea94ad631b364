//! Golden-file runner: every `fixtures/<name>.ast.json` is extracted and compared
//! against `fixtures/<name>.expected.json`.
//!
//! ```text
//! cargo run -p dev-test-runner [-- <name-filter>]
//! ```
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use objc_meta::path_de::from_str_with_path;
use objc_meta::{AstSnapshot, ExtractOptions, extract_snapshot};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

static SNAPSHOT_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<stem>[A-Za-z0-9_\-]+)\.ast\.json$").expect("static fixture pattern"));

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let src = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    from_str_with_path(&src).map_err(|e| format!("{}: {e}", path.display()))
}

fn run_case(dir: &Path, stem: &str) -> Result<(), String> {
    let snapshot = AstSnapshot::load(&dir.join(format!("{stem}.ast.json"))).map_err(|e| e.to_string())?;

    let options_path = dir.join(format!("{stem}.options.json"));
    let options = if options_path.exists() {
        read_json::<ExtractOptions>(&options_path)?
    } else {
        ExtractOptions::default()
    };

    let expected: Value = read_json(&dir.join(format!("{stem}.expected.json")))?;
    let metadata = extract_snapshot(&snapshot, &options).map_err(|e| e.to_string())?;
    let actual = serde_json::to_value(metadata).map_err(|e| e.to_string())?;

    if actual == expected {
        return Ok(());
    }
    let actual = serde_json::to_string_pretty(&actual).unwrap_or_default();
    Err(format!("output differs from expected:\n{actual}"))
}

fn main() -> ExitCode {
    let filter = std::env::args().nth(1);
    let dir = fixtures_dir();

    let entries = match std::fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(error) => {
            eprintln!("❌ cannot read {}: {error}", dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut stems = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            SNAPSHOT_FILE.captures(&name).map(|caps| caps["stem"].to_string())
        })
        .filter(|stem| filter.as_deref().is_none_or(|f| stem.contains(f)))
        .collect::<Vec<_>>();
    stems.sort();

    let mut failed = 0usize;
    for stem in &stems {
        match run_case(&dir, stem) {
            Ok(()) => eprintln!("✅ {stem}"),
            Err(message) => {
                failed += 1;
                eprintln!("❌ {stem}: {message}");
            }
        }
    }

    eprintln!("—— {} passed, {failed} failed ——", stems.len() - failed);
    if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
