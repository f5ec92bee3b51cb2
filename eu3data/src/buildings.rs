//! Province buildings and their economic effects.
//!
//! A save marks a building as `temple = yes` inside the province block.
//! Every effect is non-negative, so adding a building never lowers a weight.

use eu3txt::EU3TxtParseNode;
use serde::Serialize;
use std::ops::Add;

/// A building that can stand in a source-world province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Building {
    Fort1,
    Fort2,
    Fort3,
    Fort4,
    Fort5,
    Fort6,
    Temple,
    Courthouse,
    SpyAgency,
    Constable,
    TreasuryOffice,
    Workshop,
    Mint,
    Marketplace,
    TradeDepot,
    StockExchange,
    Barracks,
    RegimentalCamp,
    ConscriptionCenter,
    Armory,
    Arsenal,
    Shipyard,
    GrandShipyard,
    NavalArsenal,
    NavalBase,
    Weapons,
    Wharf,
    Refinery,
    Textile,
    FineArtsAcademy,
    University,
}

impl Building {
    pub const ALL: [Building; 31] = [
        Building::Fort1,
        Building::Fort2,
        Building::Fort3,
        Building::Fort4,
        Building::Fort5,
        Building::Fort6,
        Building::Temple,
        Building::Courthouse,
        Building::SpyAgency,
        Building::Constable,
        Building::TreasuryOffice,
        Building::Workshop,
        Building::Mint,
        Building::Marketplace,
        Building::TradeDepot,
        Building::StockExchange,
        Building::Barracks,
        Building::RegimentalCamp,
        Building::ConscriptionCenter,
        Building::Armory,
        Building::Arsenal,
        Building::Shipyard,
        Building::GrandShipyard,
        Building::NavalArsenal,
        Building::NavalBase,
        Building::Weapons,
        Building::Wharf,
        Building::Refinery,
        Building::Textile,
        Building::FineArtsAcademy,
        Building::University,
    ];

    /// The key used in save files.
    pub fn key(self) -> &'static str {
        match self {
            Building::Fort1 => "fort1",
            Building::Fort2 => "fort2",
            Building::Fort3 => "fort3",
            Building::Fort4 => "fort4",
            Building::Fort5 => "fort5",
            Building::Fort6 => "fort6",
            Building::Temple => "temple",
            Building::Courthouse => "courthouse",
            Building::SpyAgency => "spy_agency",
            Building::Constable => "constable",
            Building::TreasuryOffice => "treasury_office",
            Building::Workshop => "workshop",
            Building::Mint => "mint",
            Building::Marketplace => "marketplace",
            Building::TradeDepot => "trade_depot",
            Building::StockExchange => "stock_exchange",
            Building::Barracks => "barracks",
            Building::RegimentalCamp => "regimental_camp",
            Building::ConscriptionCenter => "conscription_center",
            Building::Armory => "armory",
            Building::Arsenal => "arsenal",
            Building::Shipyard => "shipyard",
            Building::GrandShipyard => "grand_shipyard",
            Building::NavalArsenal => "naval_arsenal",
            Building::NavalBase => "naval_base",
            Building::Weapons => "weapons",
            Building::Wharf => "wharf",
            Building::Refinery => "refinery",
            Building::Textile => "textile",
            Building::FineArtsAcademy => "fine_arts_academy",
            Building::University => "university",
        }
    }

    pub fn from_key(key: &str) -> Option<Building> {
        Building::ALL.into_iter().find(|b| b.key() == key)
    }

    pub fn effect(self) -> BuildingEffect {
        let weight = |weight| BuildingEffect {
            weight,
            ..BuildingEffect::default()
        };
        match self {
            Building::Fort1 => weight(1.0),
            Building::Fort2 => weight(2.0),
            Building::Fort3 => weight(3.0),
            Building::Fort4 => weight(4.0),
            Building::Fort5 => weight(5.0),
            Building::Fort6 => weight(6.0),
            Building::Temple => BuildingEffect {
                tax_income: 1.0,
                ..weight(2.0)
            },
            Building::Courthouse => BuildingEffect {
                tax_efficiency: 0.1,
                ..weight(2.0)
            },
            Building::SpyAgency => weight(1.0),
            Building::Constable => BuildingEffect {
                tax_efficiency: 0.1,
                ..weight(2.0)
            },
            Building::TreasuryOffice => BuildingEffect {
                tax_efficiency: 0.25,
                ..weight(3.0)
            },
            Building::Workshop => BuildingEffect {
                production_efficiency: 0.25,
                ..weight(2.0)
            },
            Building::Mint => BuildingEffect {
                production_efficiency: 0.5,
                ..weight(4.0)
            },
            Building::Marketplace => BuildingEffect {
                trade_value_efficiency: 0.1,
                ..weight(2.0)
            },
            Building::TradeDepot => BuildingEffect {
                trade_value_efficiency: 0.25,
                ..weight(3.0)
            },
            Building::StockExchange => BuildingEffect {
                trade_value_efficiency: 0.5,
                ..weight(4.0)
            },
            Building::Barracks => BuildingEffect {
                manpower_modifier: 0.25,
                ..weight(2.0)
            },
            Building::RegimentalCamp => BuildingEffect {
                manpower_modifier: 0.5,
                ..weight(3.0)
            },
            Building::ConscriptionCenter => BuildingEffect {
                manpower_modifier: 0.75,
                ..weight(4.0)
            },
            Building::Armory => weight(2.0),
            Building::Arsenal => weight(3.0),
            Building::Shipyard => weight(2.0),
            Building::GrandShipyard => weight(3.0),
            Building::NavalArsenal => weight(4.0),
            Building::NavalBase => weight(5.0),
            // Manufactories
            Building::Weapons | Building::Wharf | Building::Refinery | Building::Textile => {
                BuildingEffect {
                    goods_produced_modifier: 0.5,
                    ..weight(5.0)
                }
            }
            Building::FineArtsAcademy | Building::University => weight(5.0),
        }
    }

    /// Buildings marked `= yes` in a province block, in [`Building::ALL`] order.
    pub fn present_in(node: &EU3TxtParseNode) -> Vec<Building> {
        Building::ALL
            .into_iter()
            .filter(|b| node.get(b.key()).any(|v| v.as_str() == Some("yes")))
            .collect()
    }
}

/// The combined effect of one or more buildings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildingEffect {
    /// Contribution to the province's building weight.
    pub weight: f64,
    /// Flat tax income added to base tax.
    pub tax_income: f64,
    pub tax_efficiency: f64,
    pub production_efficiency: f64,
    pub goods_produced_modifier: f64,
    pub trade_value_efficiency: f64,
    pub manpower_modifier: f64,
}

impl Add for BuildingEffect {
    type Output = BuildingEffect;

    fn add(self, rhs: BuildingEffect) -> BuildingEffect {
        BuildingEffect {
            weight: self.weight + rhs.weight,
            tax_income: self.tax_income + rhs.tax_income,
            tax_efficiency: self.tax_efficiency + rhs.tax_efficiency,
            production_efficiency: self.production_efficiency + rhs.production_efficiency,
            goods_produced_modifier: self.goods_produced_modifier + rhs.goods_produced_modifier,
            trade_value_efficiency: self.trade_value_efficiency + rhs.trade_value_efficiency,
            manpower_modifier: self.manpower_modifier + rhs.manpower_modifier,
        }
    }
}

impl std::iter::Sum for BuildingEffect {
    fn sum<I: Iterator<Item = BuildingEffect>>(iter: I) -> BuildingEffect {
        iter.fold(BuildingEffect::default(), Add::add)
    }
}
