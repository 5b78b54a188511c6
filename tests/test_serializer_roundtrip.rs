//! Formatting round-trips through the facade (parse → serialize → parse).

use agency::{parse, serialize, serialize_with, FormatOptions};
use pretty_assertions::assert_eq;

fn assert_roundtrip(source: &str) -> String {
    let program = parse(source).unwrap_or_else(|err| panic!("{}", err.message));
    let formatted = serialize(&program);
    let reparsed = parse(&formatted).unwrap_or_else(|err| panic!("{}\n{}", err.message, formatted));
    assert_eq!(program, reparsed);
    assert_eq!(formatted, serialize(&reparsed));
    formatted
}

#[test]
fn test_scenario_add() {
    assert_eq!(
        assert_roundtrip("def add(x: number, y) { x }"),
        "def add(x: number, y) {\nx\n}"
    );
}

#[test]
fn test_indented_layout_for_files() {
    let program = parse("def add(x: number, y) { x }").unwrap();
    let formatted = serialize_with(&program, &FormatOptions::indented());
    assert_eq!(formatted, "def add(x: number, y) {\n  x\n}\n");
    assert_eq!(parse(&formatted).unwrap(), program);
}

#[test]
fn test_roundtrip_definitions() {
    assert_roundtrip(
        r#"type Coords = { x: number; y: number }

def lookup(city: string): Coords {
  """Find coordinates for a city."""
  return fetchJSON("https://geo.example.com/${city}")
}

node main(city: string) {
  +lookup
  coords: Coords = `Where is ${city}?`
  return report(coords)
}

node report(coords: Coords) {
  print(coords)
}
"#,
    );
}

#[test]
fn test_roundtrip_control_flow() {
    assert_roundtrip(
        r#"node main(mood: string) {
  count = 0
  while (count < 3) {
    count = count + 1
  }
  if (mood == "happy") {
    print("yay")
  } else {
    print("hmm")
  }
  match(mood) {
    "happy" => print("great")
    _ => print("ok")
  }
  time {
    print(count)
  }
}
"#,
    );
}

#[test]
fn test_roundtrip_fixtures() {
    for source in [
        include_str!("../crates/parser/tests/fixtures/hello.agency"),
        include_str!("../crates/parser/tests/fixtures/weather.agency"),
        include_str!("../crates/parser/tests/fixtures/approvals.agency"),
    ] {
        assert_roundtrip(source);
    }
}

#[test]
fn test_formatting_normalizes_layout() {
    let messy = "x=5;\ny   =   [1,2]\n";
    let formatted = assert_roundtrip(messy);
    assert_eq!(formatted, "x = 5\ny = [1, 2]\n");
}
