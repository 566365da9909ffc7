//! Architectural Enforcement Integration Tests
//!
//! Source scanners shared by the tests in `tests/`:
//! - No sleeps in production code outside the injected retry delay
//! - No blocking I/O inside async functions
//!
//! Production code is every `.rs` file under [`PRODUCTION_DIRS`], minus the
//! test-only modules and everything after a file's `#[cfg(test)]` marker.

use std::fs;
use std::path::{Path, PathBuf};

/// Source roots scanned, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["mash/core/src", "mash/cli/src"];

/// Files compiled only for tests
pub const TEST_ONLY_FILES: &[&str] = &["mash/core/src/test_utils.rs"];

/// Workspace root, two levels above this package
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// One production source file, test code stripped
#[derive(Debug)]
pub struct SourceFile {
    /// Path relative to the workspace root, `/`-separated
    pub relative: String,
    /// Production lines, comment text removed
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Parse `content` as the file at `relative`
    pub fn parse(relative: impl Into<String>, content: &str) -> Self {
        Self {
            relative: relative.into(),
            lines: production_lines(content),
        }
    }

    /// `path:line - code` for reporting
    pub fn violation(&self, idx: usize) -> String {
        format!("{}:{} - {}", self.relative, idx + 1, self.lines[idx].trim())
    }
}

/// Every production source file under [`PRODUCTION_DIRS`]
pub fn production_files() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut files = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&root)
                .unwrap_or(entry.path())
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if TEST_ONLY_FILES.contains(&relative.as_str()) {
                continue;
            }
            if let Ok(content) = fs::read_to_string(entry.path()) {
                files.push(SourceFile::parse(relative, &content));
            }
        }
    }

    files
}

/// Lines up to the first `#[cfg(test)]`, with `//` comments cut off
pub fn production_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|line| line.split("//").next().unwrap_or(line).to_string())
        .collect()
}

/// Kind of function a line sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnContext {
    /// `async fn`
    Async,
    /// Plain `fn`
    Sync,
}

fn strip_visibility(line: &str) -> &str {
    for prefix in ["pub(crate) ", "pub(super) ", "pub "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return rest;
        }
    }
    line
}

/// Function enclosing `lines[current_idx]`, found by scanning backwards
///
/// Stops at module and impl headers, so code between items has no context.
pub fn enclosing_fn<S: AsRef<str>>(lines: &[S], current_idx: usize) -> Option<FnContext> {
    for i in (0..current_idx).rev() {
        let line = strip_visibility(lines[i].as_ref().trim());

        if line.starts_with("async fn ") {
            return Some(FnContext::Async);
        }
        if line.starts_with("fn ") {
            return Some(FnContext::Sync);
        }

        if line.starts_with("mod ") || (line.starts_with("impl") && line.contains('{')) {
            return None;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_async_context_detection() {
        let code = [
            "impl Client {",
            "    pub async fn fetch(&self) -> Result<()> {",
            "        let body = std::fs::read_to_string(\"x\")?;",
            "    }",
            "}",
        ];
        assert_eq!(enclosing_fn(&code, 2), Some(FnContext::Async));
    }

    #[test]
    fn test_sync_context_detection() {
        let code = [
            "pub(crate) fn load() -> Result<()> {",
            "    let body = std::fs::read_to_string(\"agent.toml\")?;",
            "}",
        ];
        assert_eq!(enclosing_fn(&code, 1), Some(FnContext::Sync));
    }

    #[test]
    fn test_impl_boundary_has_no_context() {
        let code = ["impl Default for Thing {", "    const X: u8 = 1;"];
        assert_eq!(enclosing_fn(&code, 1), None);
    }

    #[test]
    fn test_test_module_is_dropped() {
        let content = "fn a() {}\n// note\n#[cfg(test)]\nmod tests {\n    fn b() { std::thread::sleep(d); }\n}\n";
        let lines = production_lines(content);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| !l.contains("sleep")));
    }

    #[test]
    fn test_production_sources_are_found() {
        let files = production_files();
        assert!(files.iter().any(|f| f.relative == "mash/core/src/lib.rs"));
        assert!(files.iter().any(|f| f.relative == "mash/cli/src/main.rs"));
        assert!(files.iter().all(|f| !f.relative.ends_with("test_utils.rs")));
    }
}
