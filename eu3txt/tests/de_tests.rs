use eu3txt::{DefaultEU3Txt, EU3Txt, from_node};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

fn deserialize_from_file<T: DeserializeOwned>(data: &str) -> T {
    let mut file = NamedTempFile::new().expect("TempFile");
    write!(file, "{}", data).expect("Write");
    let tokens = DefaultEU3Txt::open_txt(file.path()).expect("Tokenize");
    let ast = DefaultEU3Txt::parse(tokens).expect("Parse");
    from_node(&ast).expect("Deserialize")
}

#[derive(Debug, Deserialize, PartialEq)]
struct Simple {
    foo: i32,
    bar: String,
}

#[test]
fn test_simple_struct() {
    let data = r#"
        foo = 123
        bar = "hello"
    "#;
    let s: Simple = deserialize_from_file(data);
    assert_eq!(
        s,
        Simple {
            foo: 123,
            bar: "hello".to_string()
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct BoolTest {
    is_true: bool,
    is_false: bool,
}

#[test]
fn test_bools() {
    let data = r#"
        is_true = yes
        is_false = no
    "#;
    let s: BoolTest = deserialize_from_file(data);
    assert_eq!(
        s,
        BoolTest {
            is_true: true,
            is_false: false
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct ListTest {
    nums: Vec<i32>,
    names: Vec<String>,
}

#[test]
fn test_lists() {
    let data = r#"
        nums = { 1 2 3 }
        names = { "a" "b" c }
    "#;
    let s: ListTest = deserialize_from_file(data);
    assert_eq!(s.nums, vec![1, 2, 3]);
    assert_eq!(s.names, vec!["a", "b", "c"]);
}

#[derive(Debug, Deserialize, PartialEq)]
struct Nested {
    inner: Simple,
}

#[test]
fn test_nested() {
    let data = r#"
        inner = {
            foo = 999
            bar = "inner"
        }
    "#;
    let s: Nested = deserialize_from_file(data);
    assert_eq!(
        s.inner,
        Simple {
            foo: 999,
            bar: "inner".to_string()
        }
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Economy {
    base_tax: f64,
    manpower: f64,
}

#[test]
fn test_ints_coerce_to_floats() {
    let ast = DefaultEU3Txt::parse_str("base_tax = 4 manpower = 1.500").unwrap();
    let e: Economy = from_node(&ast).unwrap();
    assert_eq!(e.base_tax, 4.0);
    assert_eq!(e.manpower, 1.5);
}

#[test]
fn test_numeric_keys_as_map() {
    let ast = DefaultEU3Txt::parse_str("1 = abc 42 = def").unwrap();
    let m: BTreeMap<String, String> = from_node(&ast).unwrap();
    assert_eq!(m.get("1").map(String::as_str), Some("abc"));
    assert_eq!(m.get("42").map(String::as_str), Some("def"));
}

#[test]
fn test_unknown_blocks_are_skipped() {
    // `history` mixes bare blocks and assignments; it must not break the struct.
    let data = r#"
        history = { { a = 1 } 1444.11.11 = { owner = SWE } loose }
        foo = 7
        bar = x
        123 = { nested = { deeper = yes } }
    "#;
    let s: Simple = deserialize_from_file(data);
    assert_eq!(s.foo, 7);
    assert_eq!(s.bar, "x");
}

#[test]
fn test_loose_values_in_keyed_block() {
    let ast = DefaultEU3Txt::parse_str("inner = { stray foo = 1 bar = y }").unwrap();
    let s: Nested = from_node(&ast).unwrap();
    assert_eq!(s.inner.foo, 1);
}

#[test]
fn test_type_mismatch_is_an_error() {
    let ast = DefaultEU3Txt::parse_str("foo = abc bar = x").unwrap();
    assert!(from_node::<Simple>(&ast).is_err());
}
