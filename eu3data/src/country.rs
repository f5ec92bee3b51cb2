use crate::province::ProvinceId;
use eu3data_derive::TolerantDeserialize;
use eu3txt::{EU3TxtParseNode, from_node};
use serde::Serialize;
use std::fmt;

/// An RGB map color from `color = { r g b }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// Reads the first three bare numbers of a color block, clamped to 0-255.
    /// Blocks with fewer than three numbers carry no color.
    pub fn from_node(node: &EU3TxtParseNode) -> Option<Color> {
        let components: Vec<u8> = node
            .values()
            .filter_map(|v| v.as_f64())
            .take(3)
            .map(|c| c.round().clamp(0.0, 255.0) as u8)
            .collect();
        match components.as_slice() {
            [r, g, b] => Some(Color([*r, *g, *b])),
            _ => None,
        }
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        (self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Debug, Default, TolerantDeserialize)]
struct CountryData {
    capital: Option<ProvinceId>,
    primary_culture: Option<String>,
    religion: Option<String>,
    government: Option<String>,
    technology_group: Option<String>,
}

impl CountryData {
    /// Field-by-field read of a block that failed to deserialize as a whole.
    fn salvage(node: &EU3TxtParseNode) -> Self {
        let text = |key: &str| node.first(key).and_then(|v| v.as_str()).map(str::to_string);
        Self {
            capital: node.first("capital").and_then(|v| v.as_int()),
            primary_culture: text("primary_culture"),
            religion: text("religion"),
            government: text("government"),
            technology_group: text("technology_group"),
        }
    }
}

/// A source-world country. Province lists hold keys into the world's
/// province table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Country {
    tag: String,
    capital: Option<ProvinceId>,
    primary_culture: Option<String>,
    religion: Option<String>,
    government: Option<String>,
    technology_group: Option<String>,
    color: Option<Color>,
    provinces: Vec<ProvinceId>,
    cores: Vec<ProvinceId>,
}

impl Country {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    /// Reads a country block. Malformed fields are dropped with a warning.
    pub fn from_node(tag: &str, node: &EU3TxtParseNode) -> Self {
        let data = match from_node::<CountryData>(node) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Malformed country {}: {}", tag, e);
                CountryData::salvage(node)
            }
        };
        Self {
            capital: data.capital,
            primary_culture: data.primary_culture,
            religion: data.religion,
            government: data.government,
            technology_group: data.technology_group,
            ..Self::new(tag)
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn capital(&self) -> Option<ProvinceId> {
        self.capital
    }

    pub fn primary_culture(&self) -> Option<&str> {
        self.primary_culture.as_deref()
    }

    pub fn religion(&self) -> Option<&str> {
        self.religion.as_deref()
    }

    pub fn government(&self) -> Option<&str> {
        self.government.as_deref()
    }

    pub fn technology_group(&self) -> Option<&str> {
        self.technology_group.as_deref()
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Reads `color` from a `common/countries/*.txt` definition.
    pub fn read_from_common_country(&mut self, node: &EU3TxtParseNode) {
        if let Some(color) = node.first("color").and_then(Color::from_node) {
            self.color = Some(color);
        }
    }

    pub fn provinces(&self) -> &[ProvinceId] {
        &self.provinces
    }

    pub fn cores(&self) -> &[ProvinceId] {
        &self.cores
    }

    pub fn has_provinces(&self) -> bool {
        !self.provinces.is_empty()
    }

    pub(crate) fn add_province(&mut self, num: ProvinceId) {
        self.provinces.push(num);
    }

    pub(crate) fn add_core(&mut self, num: ProvinceId) {
        self.cores.push(num);
    }
}
