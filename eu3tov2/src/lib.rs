//! EU3 to Victoria 2 conversion front half.
//!
//! Maps every source country tag to a unique destination tag and reports the
//! economic weight each source country brings with it.

pub mod config;
pub mod country_mapping;
pub mod error;
pub mod potential;
pub mod report;
pub mod run;

pub use config::Configuration;
pub use country_mapping::{CountryMapping, MappingDecision, MappingReason, MappingState};
pub use error::{ConfigError, MappingError};
pub use potential::{PotentialCountries, PotentialTags};
pub use report::{ConversionReport, CountrySummary};
pub use run::ConversionRun;
