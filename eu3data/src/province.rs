//! Source-world provinces and their economic weight.
//!
//! Each province reduces its raw economy (base tax, buildings, manpower, trade
//! goods) to a [`WeightVector`] of six scalars. Downstream conversion scales
//! destination-world state by these weights, so the computation is a pure
//! function of the raw fields and never negative.
//!
//! ```text
//! goods_produced    = base_tax × 0.2 × (1 + manufactory bonus)
//! production_income = goods_produced × price × (1 + production efficiency)
//! total_tax_income  = (base_tax + building tax) × (1 + tax efficiency)
//! total_trade_value = goods_produced × price × (1 + trade efficiency) × 2
//! total_weight      = Σ factorᵢ × componentᵢ + total_trade_value
//! ```

use crate::buildings::{Building, BuildingEffect};
use crate::defines::{tags, weights};
use eu3txt::EU3TxtParseNode;
use serde::Serialize;
use std::ops::AddAssign;

pub type ProvinceId = i32;

/// The six aggregated weight components of a province (or a sum of them).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WeightVector {
    /// Base tax × 2.
    pub base_tax: f64,
    pub tax_income: f64,
    pub production: f64,
    pub buildings: f64,
    pub manpower: f64,
    pub total: f64,
}

impl WeightVector {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.base_tax,
            self.tax_income,
            self.production,
            self.buildings,
            self.manpower,
            self.total,
        ]
    }
}

impl AddAssign<&WeightVector> for WeightVector {
    fn add_assign(&mut self, rhs: &WeightVector) {
        self.base_tax += rhs.base_tax;
        self.tax_income += rhs.tax_income;
        self.production += rhs.production;
        self.buildings += rhs.buildings;
        self.manpower += rhs.manpower;
        self.total += rhs.total;
    }
}

/// Intermediate production figures behind a [`WeightVector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProductionVector {
    pub goods_produced: f64,
    pub trade_goods_price: f64,
    pub trade_value_efficiency: f64,
    pub production_efficiency: f64,
    pub trade_value: f64,
    pub production_income: f64,
    pub base_tax: f64,
    pub building_tax_income: f64,
    pub building_tax_efficiency: f64,
    pub total_tax_income: f64,
    pub total_trade_value: f64,
}

/// Combines weight components 1-5 and the trade value into the total weight.
///
/// Every factor is positive, so the total never decreases when a component grows.
pub fn combine_weights(components: [f64; 5], total_trade_value: f64) -> f64 {
    let factors = [
        weights::BASE_TAX_FACTOR,
        weights::TAX_INCOME_FACTOR,
        weights::PRODUCTION_FACTOR,
        weights::BUILDING_FACTOR,
        weights::MANPOWER_FACTOR,
    ];
    components
        .iter()
        .zip(factors)
        .map(|(c, f)| c * f)
        .sum::<f64>()
        + total_trade_value
}

/// A province record owned by the [`World`](crate::World) arena.
///
/// `owner` and the country's province lists are keys into the arena, never
/// ownership.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Province {
    num: ProvinceId,
    name: Option<String>,
    owner_string: String,
    owner: Option<String>,
    controller: Option<String>,
    cores: Vec<String>,
    culture: Option<String>,
    religion: Option<String>,
    center_of_trade: bool,

    base_tax: f64,
    manpower: f64,
    trade_goods: Option<String>,
    trade_goods_price: f64,
    buildings: Vec<Building>,

    num_destination_provinces: usize,

    weights: WeightVector,
    production: ProductionVector,
}

impl Province {
    pub fn new(num: ProvinceId) -> Self {
        Self {
            num,
            ..Self::default()
        }
    }

    /// Reads a numeric top-level save block. Missing or malformed economic
    /// fields read as zero.
    pub fn from_node(num: ProvinceId, node: &EU3TxtParseNode) -> Self {
        let text = |key: &str| node.first(key).and_then(|v| v.as_str()).map(str::to_string);
        let number = |key: &str| {
            node.first(key)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0)
                .max(0.0)
        };

        Self {
            num,
            name: text("name"),
            owner_string: text("owner").unwrap_or_default(),
            controller: text("controller"),
            cores: node
                .get("core")
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
            culture: text("culture"),
            religion: text("religion"),
            base_tax: number("base_tax"),
            manpower: number("manpower"),
            trade_goods: text("trade_goods"),
            buildings: Building::present_in(node),
            ..Self::new(num)
        }
    }

    pub fn num(&self) -> ProvinceId {
        self.num
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The owner tag as written in the save; empty or `---` when unowned.
    pub fn owner_string(&self) -> &str {
        &self.owner_string
    }

    pub fn is_unowned(&self) -> bool {
        self.owner_string.is_empty() || self.owner_string == tags::NO_OWNER
    }

    /// Tag of the resolved owner, set only when the owner is a loaded country.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub(crate) fn set_owner(&mut self, tag: Option<String>) {
        self.owner = tag;
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    /// Raw core tags, unresolved.
    pub fn core_tags(&self) -> &[String] {
        &self.cores
    }

    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    pub fn religion(&self) -> Option<&str> {
        self.religion.as_deref()
    }

    pub fn is_center_of_trade(&self) -> bool {
        self.center_of_trade
    }

    pub fn set_center_of_trade(&mut self, cot: bool) {
        self.center_of_trade = cot;
    }

    pub fn base_tax(&self) -> f64 {
        self.base_tax
    }

    pub fn manpower(&self) -> f64 {
        self.manpower
    }

    pub fn trade_goods(&self) -> Option<&str> {
        self.trade_goods.as_deref()
    }

    pub fn trade_goods_price(&self) -> f64 {
        self.trade_goods_price
    }

    pub fn set_trade_goods_price(&mut self, price: f64) {
        self.trade_goods_price = price.max(0.0);
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn num_destination_provinces(&self) -> usize {
        self.num_destination_provinces
    }

    pub fn set_num_destination_provinces(&mut self, count: usize) {
        self.num_destination_provinces = count;
    }

    /// Recomputes the derived weight fields from the raw fields.
    pub fn determine_province_weight(&mut self) {
        let (weights, production) = self.compute_weights();
        self.weights = weights;
        self.production = production;
    }

    fn compute_weights(&self) -> (WeightVector, ProductionVector) {
        let effect: BuildingEffect = self.buildings.iter().map(|b| b.effect()).sum();

        let goods_produced =
            self.base_tax * weights::GOODS_PER_BASE_TAX * (1.0 + effect.goods_produced_modifier);
        let price = self.trade_goods_price;
        let production_income = goods_produced * price * (1.0 + effect.production_efficiency);

        let trade_value = goods_produced * price;
        let mut trade_value_efficiency = effect.trade_value_efficiency;
        if self.center_of_trade {
            trade_value_efficiency += weights::COT_TRADE_EFFICIENCY;
        }
        let total_trade_value =
            trade_value * (1.0 + trade_value_efficiency) * weights::TRADE_VALUE_FACTOR;

        let total_tax_income = (self.base_tax + effect.tax_income) * (1.0 + effect.tax_efficiency);
        let manpower_weight = self.manpower * (1.0 + effect.manpower_modifier);

        let components = [
            2.0 * self.base_tax,
            total_tax_income,
            production_income,
            effect.weight,
            manpower_weight,
        ];
        let total = combine_weights(components, total_trade_value);

        (
            WeightVector {
                base_tax: components[0],
                tax_income: components[1],
                production: components[2],
                buildings: components[3],
                manpower: components[4],
                total,
            },
            ProductionVector {
                goods_produced,
                trade_goods_price: price,
                trade_value_efficiency,
                production_efficiency: effect.production_efficiency,
                trade_value,
                production_income,
                base_tax: self.base_tax,
                building_tax_income: effect.tax_income,
                building_tax_efficiency: effect.tax_efficiency,
                total_tax_income,
                total_trade_value,
            },
        )
    }

    /// All six components, as last computed by
    /// [`determine_province_weight`](Self::determine_province_weight).
    pub fn weight_vector(&self) -> &WeightVector {
        &self.weights
    }

    pub fn production_vector(&self) -> &ProductionVector {
        &self.production
    }

    pub fn tax_income(&self) -> f64 {
        self.weights.tax_income
    }

    pub fn production_income(&self) -> f64 {
        self.weights.production
    }

    pub fn total_building_weight(&self) -> f64 {
        self.weights.buildings
    }

    pub fn manpower_weight(&self) -> f64 {
        self.weights.manpower
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.total
    }
}
