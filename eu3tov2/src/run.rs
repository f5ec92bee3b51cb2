use crate::country_mapping::CountryMapping;
use crate::error::MappingError;
use crate::potential::PotentialCountries;
use crate::report::{ConversionReport, CountrySummary};
use eu3data::{GameTypeOverride, World};
use std::path::Path;

/// All state of one conversion. Nothing outlives the run.
#[derive(Debug)]
pub struct ConversionRun {
    world: World,
    potential: PotentialCountries,
    mapping: CountryMapping,
    game_type: Option<GameTypeOverride>,
}

impl ConversionRun {
    pub fn new(
        world: World,
        potential: PotentialCountries,
        game_type: Option<GameTypeOverride>,
    ) -> Self {
        Self {
            world,
            potential,
            mapping: CountryMapping::new(),
            game_type,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mapping(&self) -> &CountryMapping {
        &self.mapping
    }

    pub fn potential(&self) -> &PotentialCountries {
        &self.potential
    }

    /// Reads the rules at `rules_path`, maps every country that still owns
    /// land, and reports the result.
    pub fn execute(&mut self, rules_path: &Path) -> Result<ConversionReport, MappingError> {
        self.mapping.read_rules(rules_path)?;
        self.finish()
    }

    /// Like [`execute`](Self::execute) with rules held in memory.
    pub fn execute_with_rules(&mut self, rules: &str) -> Result<ConversionReport, MappingError> {
        self.mapping.read_rules_str(rules, "mapping rules")?;
        self.finish()
    }

    fn finish(&mut self) -> Result<ConversionReport, MappingError> {
        let world_type = self.world.world_type(self.game_type);
        log::info!("Source world type: {}", world_type);

        let removed = self.remove_landless_countries();

        self.mapping
            .create_mapping(self.world.country_tags(), &self.potential)?;

        Ok(self.report(removed))
    }

    fn remove_landless_countries(&mut self) -> Vec<String> {
        let landless: Vec<String> = self
            .world
            .countries()
            .filter(|c| !c.has_provinces())
            .map(|c| c.tag().to_string())
            .collect();
        for tag in &landless {
            log::info!("Removing {}, it owns no provinces", tag);
            self.world.remove_country(tag);
        }
        landless
    }

    fn report(&self, removed_countries: Vec<String>) -> ConversionReport {
        let world_weight_sum = self.world.world_weight_sum();
        let countries = self
            .world
            .countries()
            .map(|country| {
                let weight = self
                    .world
                    .tag_weight(country.tag())
                    .copied()
                    .unwrap_or_default();
                CountrySummary {
                    source: country.tag().to_string(),
                    destination: self
                        .mapping
                        .get_destination_tag(country.tag())
                        .map(str::to_string),
                    provinces: country.provinces().len(),
                    cores: country.cores().len(),
                    weight_share: if world_weight_sum > 0.0 {
                        weight.total / world_weight_sum
                    } else {
                        0.0
                    },
                    weight,
                }
            })
            .collect();

        ConversionReport {
            world_type: self.world.world_type(self.game_type),
            world_weight_sum,
            removed_countries,
            mapping: self.mapping.forward_map().clone(),
            decisions: self.mapping.decisions().to_vec(),
            countries,
            tag_weights: self.world.tag_weights().clone(),
        }
    }
}
