use eu3txt::{DeError, ParseError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading source-world files.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: ParseError,
    },
    #[error("Invalid {what}: {source}")]
    Deserialize {
        what: String,
        #[source]
        source: DeError,
    },
}
