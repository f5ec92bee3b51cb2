//! Converter constants.
//!
//! Weight factors are tuned so that a province's total weight lands on the
//! same scale as its tax income; only their relative size matters downstream.

/// Reserved and placeholder tags
pub mod tags {
    /// Rebel, pirate and native factions. They are never real countries.
    pub const REBEL_TAGS: [&str; 3] = ["REB", "PIR", "NAT"];

    /// Owner string of an unowned province.
    pub const NO_OWNER: &str = "---";

    /// The single destination tag every rebel faction maps to.
    pub const DESTINATION_REBEL_TAG: &str = "REB";

    /// Whether `tag` is one of [`REBEL_TAGS`].
    pub fn is_rebel(tag: &str) -> bool {
        REBEL_TAGS.contains(&tag)
    }

    /// Three uppercase ASCII letters.
    pub fn is_country_tag(key: &str) -> bool {
        key.len() == 3 && key.bytes().all(|b| b.is_ascii_uppercase())
    }
}

/// Province weight constants
pub mod weights {
    /// Goods produced per point of base tax.
    pub const GOODS_PER_BASE_TAX: f64 = 0.2;

    /// Trade-value efficiency granted by a center of trade.
    pub const COT_TRADE_EFFICIENCY: f64 = 0.5;

    /// Multiplier applied to trade value before it enters the total weight.
    pub const TRADE_VALUE_FACTOR: f64 = 2.0;

    /// Factor for component 1 (doubled base tax).
    pub const BASE_TAX_FACTOR: f64 = 0.5;

    /// Factor for component 2 (total tax income).
    pub const TAX_INCOME_FACTOR: f64 = 1.0;

    /// Factor for component 3 (production income).
    pub const PRODUCTION_FACTOR: f64 = 1.0;

    /// Factor for component 4 (building weight).
    pub const BUILDING_FACTOR: f64 = 1.0;

    /// Factor for component 5 (manpower weight).
    pub const MANPOWER_FACTOR: f64 = 1.0;
}

/// Highest province id shipped by each expansion
pub mod world_type {
    pub const IN_NOMINE_MAX_PROVINCES: [i32; 2] = [1774, 1775];
    pub const HEIR_TO_THE_THRONE_MAX_PROVINCE: i32 = 1814;
    pub const DIVINE_WIND_MAX_PROVINCE: i32 = 1882;
}
