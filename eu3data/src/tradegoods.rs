use eu3txt::EU3TxtParseNode;
use std::collections::BTreeMap;

/// Base prices of the source world's trade goods, in ducats.
const BASE_PRICES: [(&str, f64); 21] = [
    ("grain", 2.5),
    ("wine", 5.0),
    ("wool", 3.0),
    ("cloth", 6.0),
    ("fish", 3.0),
    ("fur", 5.0),
    ("salt", 4.0),
    ("naval_supplies", 4.0),
    ("copper", 5.0),
    ("gold", 10.0),
    ("iron", 4.0),
    ("slaves", 6.0),
    ("ivory", 6.0),
    ("tea", 6.0),
    ("chinaware", 7.0),
    ("spices", 8.0),
    ("coffee", 5.0),
    ("cotton", 4.0),
    ("sugar", 5.0),
    ("tobacco", 5.0),
    ("silk", 8.0),
];

/// Current price per trade good.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    prices: BTreeMap<String, f64>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            prices: BASE_PRICES
                .iter()
                .map(|&(name, price)| (name.to_string(), price))
                .collect(),
        }
    }
}

impl PriceTable {
    /// Base prices overridden by the save's `trade_goods_prices = { grain = 2.4 }` block.
    pub fn from_save(root: &EU3TxtParseNode) -> Self {
        let mut table = Self::default();
        for block in root.get("trade_goods_prices") {
            for (key, value) in block.assignments() {
                match (key.key_string(), value.as_f64()) {
                    (Some(name), Some(price)) => table.set(name, price),
                    (name, _) => {
                        log::warn!("Ignoring malformed trade goods price for {:?}", name)
                    }
                }
            }
        }
        table
    }

    /// Prices below zero are stored as zero.
    pub fn set(&mut self, goods: String, price: f64) {
        self.prices.insert(goods, price.max(0.0));
    }

    /// Price of `goods`, zero when unknown.
    pub fn price(&self, goods: &str) -> f64 {
        match self.prices.get(goods) {
            Some(price) => *price,
            None => {
                log::debug!("No price for trade goods '{}'", goods);
                0.0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
