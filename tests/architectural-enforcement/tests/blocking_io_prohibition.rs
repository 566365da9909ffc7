//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions in production code MUST NOT block.
//! **Required**: `reqwest` async calls, `tokio::fs`, `tokio::process`, not
//! `std::fs`, `std::net`, `std::process` or `reqwest::blocking`.
//!
//! Plain functions may block; configuration is loaded before any request is
//! made.

use architectural_enforcement::{enclosing_fn, production_files, FnContext, SourceFile};

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = find_blocking_io_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking I/O calls found in async code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n❌ FORBIDDEN in async fn:");
        eprintln!("  - std::fs::*, std::net::*, std::process::Command");
        eprintln!("  - std::io::stdin()");
        eprintln!("\n❌ FORBIDDEN anywhere:");
        eprintln!("  - reqwest::blocking::*");
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - Blocking calls in non-async functions (config loading)");
        eprintln!("  - Test code");

        panic!(
            "\nFound {} blocking I/O violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_blocking_io_violations() -> Vec<String> {
    let mut violations = Vec::new();
    for file in production_files() {
        check_file(&file, &mut violations);
    }
    violations
}

fn check_file(file: &SourceFile, violations: &mut Vec<String>) {
    for (idx, line) in file.lines.iter().enumerate() {
        if line.contains("reqwest::blocking") {
            violations.push(format!("{} (blocking HTTP client)", file.violation(idx)));
            continue;
        }

        let blocking = line.contains("std::fs::")
            || line.contains("std::net::")
            || line.contains("std::process::Command")
            || line.contains("std::io::stdin()");
        if blocking && enclosing_fn(&file.lines, idx) == Some(FnContext::Async) {
            violations.push(format!("{} (blocking I/O in async fn)", file.violation(idx)));
        }
    }
}

#[test]
fn test_detector_flags_async_file_read() {
    let file = SourceFile::parse(
        "demo.rs",
        "impl Loader {\n    async fn load(&self) {\n        let s = std::fs::read_to_string(\"a\");\n    }\n}\n",
    );
    let mut violations = Vec::new();
    check_file(&file, &mut violations);
    assert_eq!(violations.len(), 1);
    assert!(violations[0].starts_with("demo.rs:3"));
}

#[test]
fn test_detector_allows_sync_config_read() {
    let file = SourceFile::parse(
        "config.rs",
        "pub fn load_config_with_env(path: &Path) {\n    let s = std::fs::read_to_string(path);\n}\n",
    );
    let mut violations = Vec::new();
    check_file(&file, &mut violations);
    assert!(violations.is_empty());
}
