//! Source-world data for the EU3 to Victoria 2 converter.
//!
//! Loads a parsed EU3 save into provinces and countries, computes the
//! per-province economic weights, and rolls them up per owning tag.

pub mod buildings;
pub mod country;
pub mod defines;
pub mod diplomacy;
pub mod error;
pub mod province;
pub mod testing;
pub mod tradegoods;
pub mod tree;
pub mod world;
pub mod world_type;

pub use country::{Color, Country};
pub use diplomacy::{Agreement, Diplomacy};
pub use error::LoadError;
pub use province::{ProductionVector, Province, ProvinceId, WeightVector};
pub use world::{InverseProvinceMapping, World};
pub use world_type::{GameTypeOverride, WorldType};
