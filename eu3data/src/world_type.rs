//! Which EU3 release produced a save, judged by its highest province id.

use crate::defines::world_type as thresholds;
use crate::province::ProvinceId;
use serde::Serialize;
use std::fmt;

/// Source-world release, ordered by increasing province count. `Unknown`
/// (possibly modded) sorts last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WorldType {
    /// Older than In Nomine.
    VeryOld,
    InNomine,
    HeirToTheThrone,
    DivineWind,
    Unknown,
}

impl WorldType {
    /// Classifies a save by the maximum province id present.
    pub fn from_max_province(max_province: ProvinceId) -> WorldType {
        match max_province {
            p if thresholds::IN_NOMINE_MAX_PROVINCES.contains(&p) => WorldType::InNomine,
            thresholds::HEIR_TO_THE_THRONE_MAX_PROVINCE => WorldType::HeirToTheThrone,
            thresholds::DIVINE_WIND_MAX_PROVINCE => WorldType::DivineWind,
            p => {
                log::warn!("Unrecognized max province ID: {}", p);
                if p < thresholds::IN_NOMINE_MAX_PROVINCES[0] {
                    WorldType::VeryOld
                } else {
                    WorldType::Unknown
                }
            }
        }
    }
}

impl fmt::Display for WorldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorldType::VeryOld => "pre-In Nomine",
            WorldType::InNomine => "In Nomine",
            WorldType::HeirToTheThrone => "Heir to the Throne",
            WorldType::DivineWind => "Divine Wind",
            WorldType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The `eu3_gametype` configuration option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTypeOverride {
    /// Use whatever was detected.
    Auto,
    Forced(WorldType),
}

impl GameTypeOverride {
    /// Parses `dw`, `httt`, `in` or `auto`; anything else is `None`.
    pub fn parse(value: &str) -> Option<GameTypeOverride> {
        match value {
            "dw" => Some(GameTypeOverride::Forced(WorldType::DivineWind)),
            "httt" => Some(GameTypeOverride::Forced(WorldType::HeirToTheThrone)),
            "in" => Some(GameTypeOverride::Forced(WorldType::InNomine)),
            "auto" => Some(GameTypeOverride::Auto),
            _ => None,
        }
    }
}

/// Combines the detected type with the configured override. A forced type
/// wins; a disagreement with a successful detection is only a warning.
pub fn resolve_world_type(detected: WorldType, config: Option<GameTypeOverride>) -> WorldType {
    let forced = match config {
        Some(GameTypeOverride::Forced(world_type)) => Some(world_type),
        Some(GameTypeOverride::Auto) | None => None,
    };

    if let Some(forced) = forced
        && forced != detected
        && detected != WorldType::Unknown
    {
        log::warn!(
            "World type was detected successfully ({}), but {} was specified in the configuration file!",
            detected,
            forced
        );
    }
    if detected == WorldType::Unknown {
        log::warn!("World type unknown!");
    }

    forced.unwrap_or(detected)
}
