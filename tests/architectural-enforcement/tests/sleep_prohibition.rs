//! Integration Test: Sleep Prohibition
//!
//! **Policy**: production code MUST NOT call sleep methods. The pet session
//! waits on `tokio::time::interval` ticks and `sleep_until` deadlines; the
//! TUI waits on its event stream and a frame interval.

use architectural_enforcement::{assert_clean, scan, SourceLine};

fn sleep_rule(line: &SourceLine<'_>) -> Option<&'static str> {
    let code = line.code;
    (code.contains("::sleep(") || code.contains(".sleep(")).then_some("sleep call")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(sleep_rule);

    assert_clean(
        "CRITICAL: Sleep calls found in production code!",
        &[
            "✅ Use tokio::time::interval() for periodic work",
            "✅ Use tokio::time::sleep_until(deadline) inside select! for timeouts",
            "❌ Never sleep to 'wait' for events",
        ],
        &violations,
    );
}

#[test]
fn test_sleep_rule_detection() {
    let lines = ["    tokio::time::sleep(Duration::from_millis(10)).await;"];
    let path = std::path::Path::new("example.rs");
    let hit = SourceLine {
        path,
        lines: &lines,
        idx: 0,
        code: lines[0],
    };
    assert_eq!(sleep_rule(&hit), Some("sleep call"));

    let deadline = ["        Some(at) => tokio::time::sleep_until(at).await,"];
    let ok = SourceLine {
        path,
        lines: &deadline,
        idx: 0,
        code: deadline[0],
    };
    assert_eq!(sleep_rule(&ok), None);
}
