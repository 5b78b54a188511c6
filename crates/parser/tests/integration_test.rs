//! Integration tests for parsing complete .agency programs.
//!
//! Every fixture must parse, and formatting it must round-trip: the formatted
//! source parses back to the same tree, and formatting is stable.

use agency_parser::{parse, serialize, walk, Node};
use pretty_assertions::assert_eq;

/// Generate a parse + round-trip test for a fixture file.
macro_rules! fixture_test {
    ($test_name:ident, $path:expr) => {
        #[test]
        fn $test_name() {
            let source = include_str!($path);
            let program = match parse(source) {
                Ok(program) => program,
                Err(err) => panic!("Failed to parse {}:\n{}", $path, err.message),
            };
            let formatted = serialize(&program);
            let reparsed = parse(&formatted)
                .unwrap_or_else(|err| panic!("Failed to reparse {}:\n{}", $path, err.message));
            assert_eq!(program, reparsed);
            assert_eq!(formatted, serialize(&reparsed));
        }
    };
}

fixture_test!(fixture_hello, "fixtures/hello.agency");
fixture_test!(fixture_weather, "fixtures/weather.agency");
fixture_test!(fixture_approvals, "fixtures/approvals.agency");

#[test]
fn test_fixture_shape_weather() {
    let program = parse(include_str!("fixtures/weather.agency")).unwrap();
    let kinds: Vec<&str> = program
        .nodes
        .iter()
        .filter(|n| !matches!(n, Node::NewLine))
        .map(Node::type_name)
        .collect();
    assert_eq!(
        kinds,
        vec!["importStatement", "typeAlias", "function", "graphNode", "graphNode"]
    );
}

#[test]
fn test_fixture_calls_approvals() {
    let program = parse(include_str!("fixtures/approvals.agency")).unwrap();
    let mut calls: Vec<&str> = walk::find_calls(&program.nodes)
        .iter()
        .map(|c| c.function_name.as_str())
        .collect();
    calls.sort_unstable();
    calls.dedup();
    assert_eq!(
        calls,
        vec!["answer", "classify", "interrupt", "print", "refund"]
    );
}

#[test]
fn test_scenario_assignment_json() {
    let program = parse("x = 5").unwrap();
    let json = serde_json::to_value(&program.nodes[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "assignment",
            "variableName": "x",
            "value": { "type": "number", "value": "5" }
        })
    );
}

#[test]
fn test_scenario_index_access() {
    let program = parse("arr[0]").unwrap();
    let json = serde_json::to_value(&program.nodes[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "type": "indexAccess",
            "array": { "type": "variableName", "value": "arr" },
            "index": { "type": "number", "value": "0" }
        })
    );
    assert!(parse("arr[]").is_err());
}

#[test]
fn test_error_report_renders() {
    let source = "x = [1, 2\n";
    let err = parse(source).unwrap_err();
    let reporter = agency_parser::ErrorReporter::new("broken.agency", source);
    let rendered = reporter.render_parse_error(&err.errors[0]);
    assert!(rendered.contains("broken.agency"));
}
