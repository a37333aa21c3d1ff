//! Integration Test: Unwrap Prohibition
//!
//! **Policy**: production code propagates errors with `?` or handles them;
//! `unwrap()` and `expect()` are for tests only. The pet is decoration and
//! must never take its host down.

use architectural_enforcement::{assert_clean, scan, SourceLine};

fn unwrap_rule(line: &SourceLine<'_>) -> Option<&'static str> {
    let code = line.code;
    if code.contains(".unwrap()") {
        Some("unwrap()")
    } else if code.contains(".expect(") {
        Some("expect()")
    } else {
        None
    }
}

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan(unwrap_rule);

    assert_clean(
        "Panicking unwrap()/expect() found in production code!",
        &["✅ Propagate with ? or fall back with unwrap_or / unwrap_or_else"],
        &violations,
    );
}

#[test]
fn test_unwrap_rule_ignores_fallbacks() {
    let lines = [
        "let a = b.unwrap_or(0);",
        "let a = b.unwrap();",
        "let a = b.expect(\"present\");",
    ];
    let path = std::path::Path::new("example.rs");
    let rule_at = |idx: usize| {
        unwrap_rule(&SourceLine {
            path,
            lines: &lines,
            idx,
            code: lines[idx],
        })
    };

    assert_eq!(rule_at(0), None);
    assert_eq!(rule_at(1), Some("unwrap()"));
    assert_eq!(rule_at(2), Some("expect()"));
}
