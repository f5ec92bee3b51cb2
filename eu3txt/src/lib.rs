//! A parser library for Europa Universalis III text files.
//!
//! Save games, rule files and configuration files all share the same loose
//! format: braces `{}` and `key = value` assignments, typically encoded in
//! `WINDOWS_1252`. This crate tokenizes that format, builds a generic tree
//! of named items, and offers serde deserialization over the tree.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use encoding_rs_io::DecodeReaderBytesBuilder;

mod de;
mod error;

pub use de::{Deserializer, Error as DeError, from_node};
pub use error::ParseError;

/// Represents a token scanned from an EU3 text file.
#[derive(Debug, Clone, PartialEq)]
pub enum EU3TxtToken {
    /// An alphanumeric identifier (keys, values, dates).
    Identifier(String),
    /// A quoted string value.
    StringValue(String),
    /// A floating point number.
    FloatValue(f64),
    /// An integer number.
    IntValue(i32),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `=`
    Equals,
}

impl EU3TxtToken {
    fn describe(&self) -> String {
        match self {
            EU3TxtToken::Identifier(s) => s.clone(),
            EU3TxtToken::StringValue(s) => format!("\"{}\"", s),
            EU3TxtToken::FloatValue(f) => f.to_string(),
            EU3TxtToken::IntValue(i) => i.to_string(),
            EU3TxtToken::LeftBrace => "{".to_string(),
            EU3TxtToken::RightBrace => "}".to_string(),
            EU3TxtToken::Equals => "=".to_string(),
        }
    }

    fn to_terminal(&self) -> Option<EU3TxtAstItem> {
        match self {
            EU3TxtToken::Identifier(s) => Some(EU3TxtAstItem::Identifier(s.clone())),
            EU3TxtToken::StringValue(s) => Some(EU3TxtAstItem::StringValue(s.clone())),
            EU3TxtToken::FloatValue(f) => Some(EU3TxtAstItem::FloatValue(*f)),
            EU3TxtToken::IntValue(i) => Some(EU3TxtAstItem::IntValue(*i)),
            _ => None,
        }
    }
}

/// Represents an item in the Abstract Syntax Tree (AST).
#[derive(Debug, Clone, PartialEq)]
pub enum EU3TxtAstItem {
    /// A `key = value` assignment. Children are `[key, value]`.
    Assignment,
    /// A list of assignments or values (the file root, or a braced block).
    AssignmentList,
    /// An identifier value.
    Identifier(String),
    /// A string value.
    StringValue(String),
    /// A float value.
    FloatValue(f64),
    /// An integer value.
    IntValue(i32),
}

/// A node in the EU3 parse tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EU3TxtParseNode {
    /// Child nodes (for lists or assignments).
    pub children: Vec<EU3TxtParseNode>,
    /// The type of item and its data.
    pub entry: EU3TxtAstItem,
}

impl Default for EU3TxtParseNode {
    fn default() -> Self {
        Self::list(Vec::new())
    }
}

impl EU3TxtParseNode {
    /// Creates a list node holding `children`.
    pub fn list(children: Vec<EU3TxtParseNode>) -> EU3TxtParseNode {
        EU3TxtParseNode {
            children,
            entry: EU3TxtAstItem::AssignmentList,
        }
    }

    /// Creates a terminal node.
    pub fn leaf(entry: EU3TxtAstItem) -> EU3TxtParseNode {
        EU3TxtParseNode {
            children: Vec::new(),
            entry,
        }
    }

    /// Creates a `key = value` node.
    pub fn assignment(key: EU3TxtParseNode, value: EU3TxtParseNode) -> EU3TxtParseNode {
        EU3TxtParseNode {
            children: vec![key, value],
            entry: EU3TxtAstItem::Assignment,
        }
    }

    /// Counts the total number of nodes in this subtree (inclusive).
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Whether this node is a braced block or file root.
    pub fn is_list(&self) -> bool {
        matches!(self.entry, EU3TxtAstItem::AssignmentList)
    }

    /// All `key = value` children in file order, as `(key, value)` pairs.
    pub fn assignments(&self) -> impl Iterator<Item = (&EU3TxtParseNode, &EU3TxtParseNode)> {
        self.children.iter().filter_map(|child| match child.entry {
            EU3TxtAstItem::Assignment => match child.children.as_slice() {
                [key, value] => Some((key, value)),
                _ => None,
            },
            _ => None,
        })
    }

    /// Every value assigned under `key`, in file order.
    pub fn get<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a EU3TxtParseNode> + use<'a, 'k> {
        self.assignments()
            .filter(move |(k, _)| k.is_key(key))
            .map(|(_, v)| v)
    }

    /// The first value assigned under `key`.
    pub fn first(&self, key: &str) -> Option<&EU3TxtParseNode> {
        self.get(key).next()
    }

    /// Bare (unkeyed) children, e.g. the numbers in `color = { 1 2 3 }`.
    pub fn values(&self) -> impl Iterator<Item = &EU3TxtParseNode> {
        self.children
            .iter()
            .filter(|child| !matches!(child.entry, EU3TxtAstItem::Assignment))
    }

    /// Text of an identifier or string leaf.
    pub fn as_str(&self) -> Option<&str> {
        match &self.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value of a leaf. Textual leaves holding a number also coerce.
    pub fn as_int(&self) -> Option<i32> {
        match &self.entry {
            EU3TxtAstItem::IntValue(i) => Some(*i),
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Float value of a numeric leaf. Textual leaves holding a number also coerce.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.entry {
            EU3TxtAstItem::IntValue(i) => Some(f64::from(*i)),
            EU3TxtAstItem::FloatValue(f) => Some(*f),
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Renders a leaf as it would be written as a key: `SWE`, `183`, `1.5`.
    pub fn key_string(&self) -> Option<String> {
        match &self.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => Some(s.clone()),
            EU3TxtAstItem::IntValue(i) => Some(i.to_string()),
            EU3TxtAstItem::FloatValue(f) => Some(f.to_string()),
            _ => None,
        }
    }

    fn is_key(&self, key: &str) -> bool {
        match &self.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => s == key,
            EU3TxtAstItem::IntValue(i) => key.parse::<i32>().is_ok_and(|k| k == *i),
            _ => false,
        }
    }
}

pub trait EU3Txt {
    /// Reads a `WINDOWS_1252` file and tokenizes it.
    fn open_txt<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<EU3TxtToken>> {
        let file = File::open(path.as_ref())?;
        let mut buf_reader = BufReader::new(
            DecodeReaderBytesBuilder::new()
                .encoding(Some(WINDOWS_1252))
                .build(file),
        );
        let mut contents = String::new();
        buf_reader.read_to_string(&mut contents)?;
        Ok(Self::tokenize(&contents))
    }

    fn tokenize(contents: &str) -> Vec<EU3TxtToken> {
        let mut tokens: Vec<EU3TxtToken> = Vec::new();
        let mut chars = contents.chars().peekable();

        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => {
                    chars.next();
                }
                '#' => {
                    while chars.next_if(|&nc| nc != '\n' && nc != '\r').is_some() {}
                }
                '{' => {
                    tokens.push(EU3TxtToken::LeftBrace);
                    chars.next();
                }
                '}' => {
                    tokens.push(EU3TxtToken::RightBrace);
                    chars.next();
                }
                '=' => {
                    tokens.push(EU3TxtToken::Equals);
                    chars.next();
                }
                '"' => {
                    chars.next();
                    let mut s = String::new();
                    for nc in chars.by_ref() {
                        if nc == '"' {
                            break;
                        }
                        s.push(nc);
                    }
                    tokens.push(EU3TxtToken::StringValue(s));
                }
                _ => {
                    let mut s = String::new();
                    while let Some(nc) = chars.next_if(|&nc| {
                        !(nc.is_whitespace() || matches!(nc, '=' | '{' | '}' | '#' | '"'))
                    }) {
                        s.push(nc);
                    }
                    tokens.push(classify_bare(s));
                }
            }
        }
        tokens
    }

    /// Parses a token stream into a tree rooted at an `AssignmentList`.
    fn parse(tokens: Vec<EU3TxtToken>) -> Result<EU3TxtParseNode, ParseError> {
        if tokens.is_empty() {
            return Err(ParseError::EmptyInput);
        }
        let (root, _) = parse_list(&tokens, 0, false)?;
        Ok(root)
    }

    /// Tokenizes and parses in-memory text.
    fn parse_str(contents: &str) -> Result<EU3TxtParseNode, ParseError> {
        Self::parse(Self::tokenize(contents))
    }
}

pub struct DefaultEU3Txt {}
impl EU3Txt for DefaultEU3Txt {}

/// Numbers become numeric tokens. `nan`/`inf` spellings stay identifiers:
/// they show up as names in game files far more often than as numbers.
fn classify_bare(s: String) -> EU3TxtToken {
    if let Ok(i) = s.parse::<i32>() {
        return EU3TxtToken::IntValue(i);
    }
    let numeric_shape = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        && s.chars().filter(|&c| c == '.').count() <= 1;
    if numeric_shape && let Ok(f) = s.parse::<f64>() {
        return EU3TxtToken::FloatValue(f);
    }
    EU3TxtToken::Identifier(s)
}

fn parse_list(
    tokens: &[EU3TxtToken],
    start: usize,
    nested: bool,
) -> Result<(EU3TxtParseNode, usize), ParseError> {
    let mut list = EU3TxtParseNode::list(Vec::new());
    let mut pos = start;
    loop {
        let Some(tok) = tokens.get(pos) else {
            if nested {
                return Err(ParseError::UnexpectedEof { position: pos });
            }
            break;
        };
        match tok {
            EU3TxtToken::RightBrace if nested => {
                pos += 1;
                break;
            }
            EU3TxtToken::RightBrace => {
                return Err(ParseError::UnexpectedToken {
                    position: pos,
                    token: tok.describe(),
                    expected: "a key or value".to_string(),
                });
            }
            EU3TxtToken::Equals => {
                return Err(ParseError::InvalidLhs {
                    position: pos,
                    found: tok.describe(),
                });
            }
            EU3TxtToken::LeftBrace => {
                let (block, next) = parse_list(tokens, pos + 1, true)?;
                if matches!(tokens.get(next), Some(EU3TxtToken::Equals)) {
                    return Err(ParseError::InvalidLhs {
                        position: pos,
                        found: "{ ... }".to_string(),
                    });
                }
                list.children.push(block);
                pos = next;
            }
            _ => {
                let lhs = tok
                    .to_terminal()
                    .map(EU3TxtParseNode::leaf)
                    .ok_or_else(|| ParseError::InvalidLhs {
                        position: pos,
                        found: tok.describe(),
                    })?;
                if !matches!(tokens.get(pos + 1), Some(EU3TxtToken::Equals)) {
                    list.children.push(lhs);
                    pos += 1;
                    continue;
                }
                let rhs_pos = pos + 2;
                let (rhs, next) = match tokens.get(rhs_pos) {
                    None | Some(EU3TxtToken::RightBrace) | Some(EU3TxtToken::Equals) => {
                        return Err(ParseError::MissingRhs { position: rhs_pos });
                    }
                    Some(EU3TxtToken::LeftBrace) => parse_list(tokens, rhs_pos + 1, true)?,
                    Some(rhs_tok) => match rhs_tok.to_terminal() {
                        Some(item) => (EU3TxtParseNode::leaf(item), rhs_pos + 1),
                        None => return Err(ParseError::MissingRhs { position: rhs_pos }),
                    },
                };
                list.children.push(EU3TxtParseNode::assignment(lhs, rhs));
                pos = next;
            }
        }
    }
    Ok((list, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonexistent() {
        let r = DefaultEU3Txt::open_txt("path/to/nowhere");
        assert!(r.is_err());
    }

    #[test]
    fn tokenizes_dates_as_identifiers() {
        let tokens = DefaultEU3Txt::tokenize("date=1453.5.29 tax=2.500 id=12 # comment\nnan=inf");
        assert_eq!(tokens[2], EU3TxtToken::Identifier("1453.5.29".to_string()));
        assert_eq!(tokens[5], EU3TxtToken::FloatValue(2.5));
        assert_eq!(tokens[8], EU3TxtToken::IntValue(12));
        assert_eq!(tokens[9], EU3TxtToken::Identifier("nan".to_string()));
        assert_eq!(tokens.len(), 12);
    }

    #[test]
    fn parses_unkeyed_lists_in_order() {
        let ast = DefaultEU3Txt::parse_str("color = { 10 20 30 }").unwrap();
        let color = ast.first("color").unwrap();
        let values: Vec<i32> = color.values().filter_map(|v| v.as_int()).collect();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn numeric_keys_are_addressable() {
        let ast = DefaultEU3Txt::parse_str("1 = { owner = \"SWE\" } 2 = { owner = DAN }").unwrap();
        let keys: Vec<String> = ast
            .assignments()
            .filter_map(|(k, _)| k.key_string())
            .collect();
        assert_eq!(keys, vec!["1", "2"]);
        let owner = ast.first("2").and_then(|p| p.first("owner")).unwrap();
        assert_eq!(owner.as_str(), Some("DAN"));
    }

    #[test]
    fn repeated_keys_are_all_kept() {
        let ast = DefaultEU3Txt::parse_str("core = SWE core = DAN core = NOR").unwrap();
        let cores: Vec<&str> = ast.get("core").filter_map(|n| n.as_str()).collect();
        assert_eq!(cores, vec!["SWE", "DAN", "NOR"]);
    }

    #[test]
    fn lookups_outlive_the_key() {
        let ast = DefaultEU3Txt::parse_str("owner = SWE core = SWE core = DAN").unwrap();
        let owner = {
            let key = String::from("owner");
            ast.first(&key)
        };
        assert_eq!(owner.and_then(|n| n.as_str()), Some("SWE"));

        let cores: Vec<&EU3TxtParseNode> = {
            let key = "core".to_string();
            ast.get(&key).collect()
        };
        assert_eq!(cores.len(), 2);
    }

    #[test]
    fn anonymous_blocks_are_list_values() {
        let ast = DefaultEU3Txt::parse_str("history = { { a = 1 } { a = 2 } }").unwrap();
        let history = ast.first("history").unwrap();
        assert_eq!(history.values().count(), 2);
        assert!(history.values().all(|b| b.is_list()));
    }

    #[test]
    fn coerces_leaves() {
        let ast = DefaultEU3Txt::parse_str("a = \"42\" b = 3 c = 1.25").unwrap();
        assert_eq!(ast.first("a").and_then(|n| n.as_int()), Some(42));
        assert_eq!(ast.first("b").and_then(|n| n.as_f64()), Some(3.0));
        assert_eq!(ast.first("c").and_then(|n| n.as_f64()), Some(1.25));
        assert_eq!(ast.first("c").and_then(|n| n.as_int()), None);
    }

    #[test]
    fn reports_parse_errors() {
        assert_eq!(DefaultEU3Txt::parse_str(""), Err(ParseError::EmptyInput));
        assert_eq!(
            DefaultEU3Txt::parse_str("a = { b = 1"),
            Err(ParseError::UnexpectedEof { position: 6 })
        );
        assert_eq!(
            DefaultEU3Txt::parse_str("a = "),
            Err(ParseError::MissingRhs { position: 2 })
        );
        assert!(matches!(
            DefaultEU3Txt::parse_str("a = 1 }"),
            Err(ParseError::UnexpectedToken { position: 3, .. })
        ));
        assert!(matches!(
            DefaultEU3Txt::parse_str("= 1"),
            Err(ParseError::InvalidLhs { position: 0, .. })
        ));
    }

    #[test]
    fn node_count_includes_keys() {
        let ast = DefaultEU3Txt::parse_str("a = { b = 1 }").unwrap();
        // root, assignment a, key a, list, assignment b, key b, value 1
        assert_eq!(ast.node_count(), 7);
    }
}
