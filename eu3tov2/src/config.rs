use crate::error::ConfigError;
use eu3data::tree::read_tree;
use eu3data::{GameTypeOverride, LoadError};
use eu3data_derive::TolerantDeserialize;
use eu3txt::{EU3TxtParseNode, from_node};
use std::path::{Path, PathBuf};

/// Converter settings from `configuration.txt`:
///
/// ```text
/// configuration = {
///     eu3_gametype = "auto"
///     eu3_directory = "C:\Games\EU3"
///     v2_directory = "C:\Games\Victoria 2"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, TolerantDeserialize)]
pub struct Configuration {
    /// `dw`, `httt`, `in` or `auto`.
    #[tolerant(key = "eu3_gametype")]
    pub game_type: Option<String>,
    #[tolerant(key = "eu3_directory")]
    pub eu3_root: Option<PathBuf>,
    #[tolerant(key = "v2_directory")]
    pub v2_root: Option<PathBuf>,
}

#[derive(Debug, Default, TolerantDeserialize)]
struct ConfigurationFile {
    configuration: Option<Configuration>,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let root = read_tree(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_node(&root).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_node(root: &EU3TxtParseNode) -> Result<Self, LoadError> {
        let file: ConfigurationFile = from_node(root).map_err(|source| LoadError::Deserialize {
            what: "configuration".to_string(),
            source,
        })?;
        match file.configuration {
            Some(config) => Ok(config),
            None => {
                log::warn!("No configuration block found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// The world-type override, `None` when unset or unrecognized.
    pub fn game_type_override(&self) -> Option<GameTypeOverride> {
        let value = self.game_type.as_deref()?;
        let parsed = GameTypeOverride::parse(value);
        if parsed.is_none() {
            log::warn!("Unrecognized eu3_gametype '{}', ignoring it", value);
        }
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eu3data::WorldType;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Configuration::default();
        assert_eq!(config.game_type, None);
        assert_eq!(config.game_type_override(), None);
    }

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            configuration = {{
                eu3_gametype = "httt"
                eu3_directory = "/games/eu3"
                v2_directory = "/games/v2"
                resetProvinces = no
            }}
            "#
        )
        .unwrap();

        let config = Configuration::load(file.path()).unwrap();
        assert_eq!(config.game_type.as_deref(), Some("httt"));
        assert_eq!(config.eu3_root, Some(PathBuf::from("/games/eu3")));
        assert_eq!(config.v2_root, Some(PathBuf::from("/games/v2")));
        assert_eq!(
            config.game_type_override(),
            Some(GameTypeOverride::Forced(WorldType::HeirToTheThrone))
        );
    }

    #[test]
    fn test_missing_block_is_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "something_else = {{ }}").unwrap();
        assert_eq!(
            Configuration::load(file.path()).unwrap(),
            Configuration::default()
        );
    }

    #[test]
    fn test_unrecognized_game_type() {
        let config = Configuration {
            game_type: Some("napoleon".to_string()),
            ..Configuration::default()
        };
        assert_eq!(config.game_type_override(), None);
    }

    #[test]
    fn test_missing_file() {
        let err = Configuration::load(Path::new("/nonexistent/configuration.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }
}
