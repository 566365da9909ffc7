//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Waiting between retries and the
//! simulated degraded-mode latency go through the injected `Delay`, whose
//! tokio implementation is the only sleep allowed.

use architectural_enforcement::production_files;

/// Files allowed to call `tokio::time::sleep`
const DELAY_IMPLEMENTATIONS: &[&str] = &["mash/core/src/inference/retry.rs"];

#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations();

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - tokio::time::sleep inside the Delay implementation");
        eprintln!("  - Test code");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - std::thread::sleep anywhere");
        eprintln!("  - Sleeping outside the injected Delay (tests could not skip it)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

fn find_sleep_violations() -> Vec<String> {
    let mut violations = Vec::new();

    for file in production_files() {
        let delay_impl = DELAY_IMPLEMENTATIONS.contains(&file.relative.as_str());

        for (idx, line) in file.lines.iter().enumerate() {
            if !(line.contains("::sleep(") || line.contains(".sleep(")) {
                continue;
            }
            if delay_impl && line.contains("tokio::time::sleep(") {
                continue;
            }
            violations.push(file.violation(idx));
        }
    }

    violations
}

#[test]
fn test_delay_implementation_exists() {
    let files = production_files();
    let found = files.iter().any(|f| {
        DELAY_IMPLEMENTATIONS.contains(&f.relative.as_str())
            && f.lines.iter().any(|l| l.contains("tokio::time::sleep("))
    });
    assert!(found, "the tokio Delay implementation moved; update DELAY_IMPLEMENTATIONS");
}
