//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions MUST NOT use blocking file, network or process
//! I/O. Loading the config file happens in a plain `fn` before the session
//! starts, which is fine.

use architectural_enforcement::{assert_clean, is_in_async_function, scan, SourceLine};

fn blocking_io_rule(line: &SourceLine<'_>) -> Option<&'static str> {
    let code = line.code;
    let blocking = code.contains("std::fs::")
        || code.contains("std::net::")
        || code.contains("std::process::Command")
        || code.contains("std::thread::sleep");

    (blocking && is_in_async_function(line.lines, line.idx)).then_some("blocking I/O in async fn")
}

/// Test that async production code does not use blocking I/O
#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(blocking_io_rule);

    assert_clean(
        "CRITICAL: Blocking I/O calls found in async code!",
        &[
            "✅ Use tokio::fs / tokio::net / tokio::process in async code",
            "✅ Or do the blocking work in a plain fn before the runtime starts",
        ],
        &violations,
    );
}

#[test]
fn test_blocking_io_rule_detection() {
    let code = [
        "fn load() {",
        "    let a = std::fs::read_to_string(\"pet.toml\");",
        "}",
        "async fn run() {",
        "    let b = std::fs::read_to_string(\"pet.toml\");",
        "}",
    ];
    let path = std::path::Path::new("example.rs");
    let at = |idx: usize| SourceLine {
        path,
        lines: &code,
        idx,
        code: code[idx],
    };

    assert_eq!(blocking_io_rule(&at(1)), None);
    assert_eq!(blocking_io_rule(&at(4)), Some("blocking I/O in async fn"));
}
