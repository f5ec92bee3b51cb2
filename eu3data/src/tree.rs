//! Entry points from files and text into [`EU3TxtParseNode`] trees.

use crate::error::LoadError;
use eu3txt::{DefaultEU3Txt, EU3Txt, EU3TxtParseNode};
use std::path::Path;

/// Reads and parses a `WINDOWS_1252` text file.
pub fn read_tree(path: &Path) -> Result<EU3TxtParseNode, LoadError> {
    let tokens = DefaultEU3Txt::open_txt(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    DefaultEU3Txt::parse(tokens).map_err(|source| LoadError::Parse {
        what: path.display().to_string(),
        source,
    })
}

/// Parses in-memory text; `what` names the input in errors.
pub fn parse_tree(text: &str, what: &str) -> Result<EU3TxtParseNode, LoadError> {
    DefaultEU3Txt::parse_str(text).map_err(|source| LoadError::Parse {
        what: what.to_string(),
        source,
    })
}
