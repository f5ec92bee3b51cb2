//! The source world: every province and country of one EU3 save.
//!
//! [`World`] is the arena for a conversion run. Provinces are keyed by number
//! and countries by tag; cross references (a province's owner, a country's
//! provinces and cores) are stored as those keys.

use crate::country::Country;
use crate::defines::tags;
use crate::diplomacy::Diplomacy;
use crate::error::LoadError;
use crate::province::{Province, ProvinceId, WeightVector};
use crate::tradegoods::PriceTable;
use crate::tree::{parse_tree, read_tree};
use crate::world_type::{GameTypeOverride, WorldType, resolve_world_type};
use eu3data_derive::TolerantDeserialize;
use eu3txt::{EU3TxtAstItem, EU3TxtParseNode, from_node};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Source province number -> destination province numbers.
pub type InverseProvinceMapping = HashMap<ProvinceId, Vec<i32>>;

#[derive(Debug, Default, TolerantDeserialize)]
struct CotData {
    location: Option<ProvinceId>,
}

#[derive(Debug, Default)]
pub struct World {
    provinces: BTreeMap<ProvinceId, Province>,
    countries: BTreeMap<String, Country>,
    diplomacy: Diplomacy,
    tag_weights: BTreeMap<String, WeightVector>,
    world_weight_sum: f64,
    world_type: OnceCell<WorldType>,
}

impl World {
    /// Reads and loads a save file.
    pub fn load(path: &Path) -> Result<World, LoadError> {
        log::info!("Loading source save {}", path.display());
        Ok(World::from_node(&read_tree(path)?))
    }

    /// Loads a save held in memory.
    pub fn parse_str(text: &str) -> Result<World, LoadError> {
        Ok(World::from_node(&parse_tree(text, "save")?))
    }

    /// Builds the world from a parsed save. Malformed blocks are logged and
    /// read as far as they go.
    pub fn from_node(root: &EU3TxtParseNode) -> World {
        let prices = PriceTable::from_save(root);
        let mut provinces = BTreeMap::new();
        let mut countries = BTreeMap::new();

        for (key, value) in root.assignments() {
            if !value.is_list() {
                continue;
            }
            if let EU3TxtAstItem::IntValue(num) = key.entry {
                let mut province = Province::from_node(num, value);
                if let Some(goods) = province.trade_goods() {
                    let price = prices.price(goods);
                    province.set_trade_goods_price(price);
                }
                provinces.insert(num, province);
            } else if let Some(tag) = key.as_str()
                && tags::is_country_tag(tag)
            {
                if tags::is_rebel(tag) {
                    continue;
                }
                countries.insert(tag.to_string(), Country::from_node(tag, value));
            }
        }
        log::info!(
            "Read {} provinces and {} countries",
            provinces.len(),
            countries.len()
        );

        link_owners(&mut provinces, &mut countries);
        link_cores(&provinces, &mut countries);

        let diplomacy = root
            .first("diplomacy")
            .map(Diplomacy::from_node)
            .unwrap_or_default();

        for cot in root.get("trade").flat_map(|trade| trade.get("cot")) {
            let location = match from_node::<CotData>(cot) {
                Ok(data) => data.location,
                Err(e) => {
                    log::warn!("Malformed center of trade: {}", e);
                    cot.first("location").and_then(|v| v.as_int())
                }
            };
            if let Some(province) = location.and_then(|num| provinces.get_mut(&num)) {
                province.set_center_of_trade(true);
            }
        }

        let mut world = World {
            provinces,
            countries,
            diplomacy,
            ..World::default()
        };
        world.determine_weights();
        world
    }

    fn determine_weights(&mut self) {
        self.world_weight_sum = 0.0;
        self.tag_weights.clear();
        for province in self.provinces.values_mut() {
            province.determine_province_weight();
            self.world_weight_sum += province.total_weight();
            *self
                .tag_weights
                .entry(province.owner_string().to_string())
                .or_default() += province.weight_vector();
        }
        log::info!("Sum of all Province Weights: {}", self.world_weight_sum);
        log::info!("World Tag Map Size: {}", self.tag_weights.len());
    }

    pub fn provinces(&self) -> impl Iterator<Item = &Province> {
        self.provinces.values()
    }

    pub fn province(&self, num: ProvinceId) -> Option<&Province> {
        self.provinces.get(&num)
    }

    /// Countries in ascending tag order.
    pub fn countries(&self) -> impl Iterator<Item = &Country> {
        self.countries.values()
    }

    pub fn country(&self, tag: &str) -> Option<&Country> {
        self.countries.get(tag)
    }

    pub fn country_tags(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    /// Drops a country record. Provinces keep their owner key, which then no
    /// longer resolves.
    pub fn remove_country(&mut self, tag: &str) -> Option<Country> {
        self.countries.remove(tag)
    }

    pub fn owner_of(&self, province: &Province) -> Option<&Country> {
        province.owner().and_then(|tag| self.countries.get(tag))
    }

    pub fn diplomacy(&self) -> &Diplomacy {
        &self.diplomacy
    }

    /// Per raw owner string, the sum of its provinces' weight vectors.
    pub fn tag_weights(&self) -> &BTreeMap<String, WeightVector> {
        &self.tag_weights
    }

    pub fn tag_weight(&self, owner: &str) -> Option<&WeightVector> {
        self.tag_weights.get(owner)
    }

    pub fn world_weight_sum(&self) -> f64 {
        self.world_weight_sum
    }

    pub fn max_province_id(&self) -> ProvinceId {
        self.provinces.keys().next_back().copied().unwrap_or(0)
    }

    /// The release this save came from. The first call fixes the answer for
    /// the lifetime of the world.
    pub fn world_type(&self, config: Option<GameTypeOverride>) -> WorldType {
        *self.world_type.get_or_init(|| {
            resolve_world_type(WorldType::from_max_province(self.max_province_id()), config)
        })
    }

    pub fn set_destination_province_counts(&mut self, inverse: &InverseProvinceMapping) {
        for (num, province) in self.provinces.iter_mut() {
            let count = inverse.get(num).map_or(0, Vec::len);
            province.set_num_destination_provinces(count);
        }
    }

    /// Province numbers with no destination counterpart, each logged.
    pub fn check_all_provinces_mapped(&self, inverse: &InverseProvinceMapping) -> Vec<ProvinceId> {
        self.provinces
            .keys()
            .filter(|num| !inverse.contains_key(num))
            .inspect(|num| log::warn!("No mapping for province {}", num))
            .copied()
            .collect()
    }

    /// Reads country colors from the source install's `common/countries.txt`
    /// and the files it lists. Returns how many countries were updated.
    pub fn read_common_countries(&mut self, source_root: &Path) -> Result<usize, LoadError> {
        let index_path = source_root.join("common/countries.txt");
        if !index_path.exists() {
            log::warn!("Country index not found: {}", index_path.display());
            return Ok(0);
        }
        let index = read_tree(&index_path)?;

        let mut updated = 0;
        for (key, value) in index.assignments() {
            let (Some(tag), Some(rel_path)) = (key.as_str(), value.as_str()) else {
                continue;
            };
            let Some(country) = self.countries.get_mut(tag) else {
                continue;
            };
            let full_path = source_root.join("common").join(rel_path.replace('\\', "/"));
            match read_tree(&full_path) {
                Ok(definition) => {
                    country.read_from_common_country(&definition);
                    updated += 1;
                }
                Err(e) => log::warn!("Could not read country file for {}: {}", tag, e),
            }
        }
        Ok(updated)
    }
}

fn link_owners(
    provinces: &mut BTreeMap<ProvinceId, Province>,
    countries: &mut BTreeMap<String, Country>,
) {
    for (num, province) in provinces.iter_mut() {
        match countries.get_mut(province.owner_string()) {
            Some(country) => {
                country.add_province(*num);
                let tag = country.tag().to_string();
                province.set_owner(Some(tag));
            }
            None if province.is_unowned() => log::debug!("Province {} is unowned", num),
            None => log::warn!(
                "Province {} is owned by {}, which is not a country",
                num,
                province.owner_string()
            ),
        }
    }
}

fn link_cores(
    provinces: &BTreeMap<ProvinceId, Province>,
    countries: &mut BTreeMap<String, Country>,
) {
    for (num, province) in provinces {
        for tag in province.core_tags() {
            if let Some(country) = countries.get_mut(tag) {
                country.add_core(*num);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SaveBuilder;
    use std::io::Write;

    #[test]
    fn test_classifies_top_level_items() {
        let world = SaveBuilder::new()
            .raw("date = \"1600.1.1\" player = \"SWE\"")
            .country("SWE")
            .country("REB")
            .country("PIR")
            .country("NAT")
            .raw("--- = { }")
            .raw("Swe = { } SWED = { } flags = { }")
            .province(1, "SWE", 5.0)
            .world()
            .unwrap();

        assert_eq!(world.country_tags().collect::<Vec<_>>(), vec!["SWE"]);
        assert_eq!(world.provinces().count(), 1);
    }

    #[test]
    fn test_links_owners_and_cores() {
        let world = SaveBuilder::new()
            .country("SWE")
            .country("DAN")
            .province_with(1, r#"owner = "SWE" core = "SWE" core = "DAN" core = "XXX""#)
            .province_with(2, r#"owner = "DAN" core = "DAN""#)
            .province_with(3, r#"owner = "---""#)
            .province_with(4, r#"owner = "GHO""#)
            .world()
            .unwrap();

        let swe = world.country("SWE").unwrap();
        assert_eq!(swe.provinces(), [1]);
        assert_eq!(swe.cores(), [1]);
        let dan = world.country("DAN").unwrap();
        assert_eq!(dan.provinces(), [2]);
        assert_eq!(dan.cores(), [1, 2]);

        let p1 = world.province(1).unwrap();
        assert_eq!(world.owner_of(p1).map(|c| c.tag()), Some("SWE"));
        assert_eq!(world.province(3).unwrap().owner(), None);
        assert_eq!(world.province(4).unwrap().owner(), None);
    }

    #[test]
    fn test_centers_of_trade() {
        let world = SaveBuilder::new()
            .province(1, "SWE", 5.0)
            .province(2, "SWE", 5.0)
            .raw("trade = { cot = { location = 2 level = 1 } cot = { location = 99 } }")
            .world()
            .unwrap();
        assert!(!world.province(1).unwrap().is_center_of_trade());
        assert!(world.province(2).unwrap().is_center_of_trade());
    }

    #[test]
    fn test_tag_weights_are_component_sums() {
        let world = SaveBuilder::new()
            .country("AAA")
            .country("BBB")
            .province_with(
                1,
                r#"owner = "AAA" base_tax = 4 manpower = 1 trade_goods = grain temple = yes"#,
            )
            .province_with(2, r#"owner = "AAA" base_tax = 2 trade_goods = cloth"#)
            .province_with(3, r#"owner = "BBB" base_tax = 7 manpower = 2 workshop = yes"#)
            .world()
            .unwrap();

        let mut expected = WeightVector::default();
        expected += world.province(1).unwrap().weight_vector();
        expected += world.province(2).unwrap().weight_vector();
        assert_eq!(world.tag_weight("AAA"), Some(&expected));
        assert_eq!(
            world.tag_weight("BBB"),
            Some(world.province(3).unwrap().weight_vector())
        );

        let sum: f64 = world.provinces().map(|p| p.total_weight()).sum();
        assert!((world.world_weight_sum() - sum).abs() < 1e-9);
        assert!(world.world_weight_sum() > 0.0);
    }

    #[test]
    fn test_unresolved_owners_still_aggregate() {
        let world = SaveBuilder::new()
            .province(1, "GHO", 3.0)
            .province_with(2, "base_tax = 2")
            .province(3, "---", 1.0)
            .world()
            .unwrap();
        assert!(world.tag_weight("GHO").is_some());
        assert!(world.tag_weight("").is_some());
        assert!(world.tag_weight("---").is_some());
        assert_eq!(world.tag_weights().len(), 3);
    }

    #[test]
    fn test_save_prices_reach_provinces() {
        let world = SaveBuilder::new()
            .raw("trade_goods_prices = { grain = 4 }")
            .province_with(1, "base_tax = 5 trade_goods = grain")
            .province_with(2, "base_tax = 5 trade_goods = wine")
            .world()
            .unwrap();
        assert_eq!(world.province(1).unwrap().trade_goods_price(), 4.0);
        assert_eq!(world.province(2).unwrap().trade_goods_price(), 5.0);
    }

    #[test]
    fn test_world_type_is_cached() {
        let world = SaveBuilder::new()
            .province(1, "SWE", 1.0)
            .province(1814, "SWE", 1.0)
            .world()
            .unwrap();
        assert_eq!(world.max_province_id(), 1814);
        assert_eq!(world.world_type(None), WorldType::HeirToTheThrone);
        assert_eq!(
            world.world_type(Some(GameTypeOverride::Forced(WorldType::DivineWind))),
            WorldType::HeirToTheThrone
        );
    }

    #[test]
    fn test_world_type_override() {
        let world = SaveBuilder::new().province(1774, "SWE", 1.0).world().unwrap();
        assert_eq!(
            world.world_type(Some(GameTypeOverride::Forced(WorldType::DivineWind))),
            WorldType::DivineWind
        );
    }

    #[test]
    fn test_remove_country_keeps_provinces() {
        let mut world = SaveBuilder::new()
            .country("SWE")
            .province(1, "SWE", 1.0)
            .world()
            .unwrap();
        assert!(world.remove_country("SWE").is_some());
        assert!(world.country("SWE").is_none());
        let p = world.province(1).unwrap();
        assert_eq!(p.owner(), Some("SWE"));
        assert!(world.owner_of(p).is_none());
        assert!(world.tag_weight("SWE").is_some());
    }

    #[test]
    fn test_province_mapping_checks() {
        let mut world = SaveBuilder::new()
            .province(1, "SWE", 1.0)
            .province(2, "SWE", 1.0)
            .world()
            .unwrap();
        let inverse: InverseProvinceMapping = HashMap::from([(1, vec![300, 301])]);
        world.set_destination_province_counts(&inverse);
        assert_eq!(world.province(1).unwrap().num_destination_provinces(), 2);
        assert_eq!(world.province(2).unwrap().num_destination_provinces(), 0);
        assert_eq!(world.check_all_provinces_mapped(&inverse), vec![2]);
    }

    #[test]
    fn test_diplomacy_is_loaded() {
        let world = SaveBuilder::new()
            .country("SWE")
            .country("FIN")
            .diplomacy("vassal", "SWE", "FIN")
            .world()
            .unwrap();
        assert_eq!(world.diplomacy().agreements().len(), 1);
        let empty = SaveBuilder::new().country("SWE").world().unwrap();
        assert!(empty.diplomacy().is_empty());
    }

    #[test]
    fn test_malformed_country_still_loads() {
        let world = World::parse_str(
            r#"
            SWE = { capital = stockholm primary_culture = swedish }
            DAN = { religion = { a = 1 } }
            1 = { owner = "SWE" base_tax = 3 }
            2 = { owner = "DAN" base_tax = 2 }
            "#,
        )
        .unwrap();
        let swe = world.country("SWE").unwrap();
        assert_eq!(swe.capital(), None);
        assert_eq!(swe.primary_culture(), Some("swedish"));
        assert_eq!(swe.provinces(), [1]);
        assert_eq!(world.country("DAN").unwrap().provinces(), [2]);
        assert_eq!(world.tag_weights().len(), 2);
    }

    #[test]
    fn test_malformed_cot_reads_what_it_can() {
        let world = World::parse_str(
            r#"
            1 = { owner = "SWE" base_tax = 3 }
            2 = { owner = "SWE" base_tax = 3 }
            3 = { owner = "SWE" base_tax = 3 }
            trade = {
                cot = { location = "1" }
                cot = { location = { 3 } }
                cot = { level = 2 }
                cot = { location = 2 }
            }
            "#,
        )
        .unwrap();
        assert!(world.province(1).unwrap().is_center_of_trade());
        assert!(world.province(2).unwrap().is_center_of_trade());
        assert!(!world.province(3).unwrap().is_center_of_trade());
    }

    #[test]
    fn test_read_common_countries() {
        let dir = tempfile::tempdir().unwrap();
        let common = dir.path().join("common");
        std::fs::create_dir_all(common.join("countries")).unwrap();
        let mut index = std::fs::File::create(common.join("countries.txt")).unwrap();
        write!(
            index,
            r#"
            SWE = "countries/Sweden.txt"
            DAN = "countries/Denmark.txt"
            FRA = "countries/France.txt"
            "#
        )
        .unwrap();
        let mut sweden = std::fs::File::create(common.join("countries/Sweden.txt")).unwrap();
        write!(sweden, "color = {{ 8 66 148 }}").unwrap();

        let mut world = SaveBuilder::new()
            .country("SWE")
            .country("DAN")
            .world()
            .unwrap();
        let updated = world.read_common_countries(dir.path()).unwrap();

        assert_eq!(updated, 1);
        assert_eq!(
            world.country("SWE").and_then(|c| c.color()).map(|c| c.rgb()),
            Some((8, 66, 148))
        );
        assert_eq!(world.country("DAN").and_then(|c| c.color()), None);
    }

    #[test]
    fn test_read_common_countries_without_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut world = SaveBuilder::new().country("SWE").world().unwrap();
        assert_eq!(world.read_common_countries(dir.path()).unwrap(), 0);
    }
}
