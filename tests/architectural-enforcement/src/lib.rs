//! Architectural Enforcement Integration Tests
//!
//! Source scanners that enforce the workspace's coding rules:
//! - No sleep() calls in production code (wait on timers, deadlines or I/O)
//! - No blocking I/O inside async functions
//! - No unwrap()/expect() in production code
//!
//! The scanners are line-based. Everything from a file's `#[cfg(test)]`
//! marker onward counts as test code; test modules sit at the end of each
//! file in this workspace.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Source directories holding production code, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["pet/core/src", "tui/src"];

/// One rule violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// What was violated
    pub rule: &'static str,
    /// The offending source line, trimmed
    pub source: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.source
        )
    }
}

/// A line of production code handed to a rule
pub struct SourceLine<'a> {
    /// Path of the file
    pub path: &'a Path,
    /// All lines of the file
    pub lines: &'a [&'a str],
    /// 0-based index of this line
    pub idx: usize,
    /// The line with any `//` comment removed
    pub code: &'a str,
}

/// Workspace root (two levels above this crate)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Run `rule` over every production line under [`PRODUCTION_DIRS`]
pub fn scan<F>(rule: F) -> Vec<Violation>
where
    F: Fn(&SourceLine<'_>) -> Option<&'static str>,
{
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
                scan_file(entry.path(), &rule, &mut violations);
            }
        }
    }

    violations
}

fn scan_file<F>(path: &Path, rule: &F, violations: &mut Vec<Violation>)
where
    F: Fn(&SourceLine<'_>) -> Option<&'static str>,
{
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return,
    };
    let lines: Vec<&str> = content.lines().collect();
    let test_start = test_module_start(&lines);

    for (idx, line) in lines.iter().enumerate() {
        if test_start.is_some_and(|start| idx >= start) {
            break;
        }

        let source = SourceLine {
            path,
            lines: &lines,
            idx,
            code: strip_comment(line),
        };
        if let Some(rule) = rule(&source) {
            violations.push(Violation {
                path: path.to_path_buf(),
                line: idx + 1,
                rule,
                source: line.trim().to_string(),
            });
        }
    }
}

/// Report violations and fail the test if there are any
pub fn assert_clean(title: &str, advice: &[&str], violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    if !advice.is_empty() {
        eprintln!();
        for line in advice {
            eprintln!("  {line}");
        }
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

/// Line index of the first `#[cfg(test)]` marker
pub fn test_module_start(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.trim_start().starts_with("#[cfg(test)]"))
}

/// Code part of a line (everything before `//`)
pub fn strip_comment(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether a trimmed line declares a function
pub fn is_fn_declaration(line: &str) -> bool {
    let line = line.trim_start();
    let line = line
        .strip_prefix("pub(crate) ")
        .or_else(|| line.strip_prefix("pub "))
        .unwrap_or(line);
    let line = line.strip_prefix("const ").unwrap_or(line);
    line.starts_with("fn ") || line.starts_with("async fn ")
}

/// Whether the function enclosing `idx` is `async`
pub fn is_in_async_function(lines: &[&str], idx: usize) -> bool {
    lines[..=idx.min(lines.len().saturating_sub(1))]
        .iter()
        .rev()
        .find(|line| is_fn_declaration(line))
        .is_some_and(|line| line.contains("async fn "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_declaration_detection() {
        assert!(is_fn_declaration("    pub fn load() -> u32 {"));
        assert!(is_fn_declaration("pub(crate) async fn run(self) {"));
        assert!(is_fn_declaration("    const fn sign(self) -> i32 {"));
        assert!(!is_fn_declaration("    let f = |x| x + 1;"));
        assert!(!is_fn_declaration("    // fn commented()"));
    }

    #[test]
    fn test_async_function_detection() {
        let code = [
            "fn sync_helper() {",
            "    let a = 1;",
            "}",
            "pub async fn run() {",
            "    let contents = std::fs::read_to_string(\"pet.toml\");",
            "}",
        ];
        assert!(!is_in_async_function(&code, 1));
        assert!(is_in_async_function(&code, 4));
    }

    #[test]
    fn test_test_module_start() {
        let code = ["fn a() {}", "", "#[cfg(test)]", "mod tests {}"];
        assert_eq!(test_module_start(&code), Some(2));
        assert_eq!(test_module_start(&code[..2]), None);
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("let x = 1; // .unwrap()"), "let x = 1; ");
        assert_eq!(strip_comment("/// docs"), "");
    }

    #[test]
    fn test_workspace_root_has_production_dirs() {
        let root = workspace_root();
        assert!(root.join("pet/core/src/lib.rs").exists());
    }
}
