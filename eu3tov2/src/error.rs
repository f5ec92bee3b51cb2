use eu3data::LoadError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the tag mapping engine.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Failed to parse mapping rules {path}: {source}")]
    RulesUnreadable {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("{0} does not contain a mapping")]
    NoMappings(String),
    #[error("Country mapping rules have not been read")]
    RulesNotLoaded,
    #[error("Ran out of generated tags after {0}")]
    GeneratedTagsExhausted(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}
