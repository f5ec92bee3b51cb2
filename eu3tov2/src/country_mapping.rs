//! Source tag to destination tag assignment.
//!
//! A [`CountryMapping`] moves through three states: rules are read from a
//! `mappings = { link = { eu3 = SWE vic = SWE vic = SWB } ... }` file, then
//! [`CountryMapping::create_mapping`] assigns every source tag a destination
//! tag. Assignment is injective: no destination tag is handed out twice.

use crate::error::MappingError;
use crate::potential::PotentialTags;
use eu3data::defines::tags;
use eu3data::tree::{parse_tree, read_tree};
use eu3txt::EU3TxtParseNode;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingState {
    Unloaded,
    RulesLoaded,
    Mapped,
}

/// How a destination tag was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingReason {
    /// A rule candidate that is a real destination country.
    DefaultDestination,
    /// A rule candidate with no destination country behind it.
    RuleOnly,
    Generated,
}

impl fmt::Display for MappingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            MappingReason::DefaultDestination => "default destination entity",
            MappingReason::RuleOnly => "mapping rule, not a real destination entity",
            MappingReason::Generated => "generated tag",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingDecision {
    pub source: String,
    pub destination: String,
    pub reason: MappingReason,
}

/// Hands out `X00`, `X01`, ..., `X99`, `W00`, ... down to `A99`.
#[derive(Debug, Clone)]
struct TagGenerator {
    prefix: u8,
    suffix: u8,
}

impl TagGenerator {
    fn new() -> Self {
        Self {
            prefix: b'X',
            suffix: 0,
        }
    }

    fn next_tag(&mut self) -> Option<String> {
        if self.prefix < b'A' {
            return None;
        }
        let tag = format!("{}{:02}", char::from(self.prefix), self.suffix);
        self.suffix += 1;
        if self.suffix > 99 {
            self.suffix = 0;
            self.prefix -= 1;
        }
        Some(tag)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CountryMapping {
    /// Source tag -> destination candidates in priority order. `None` until
    /// rules have been read.
    rules: Option<BTreeMap<String, Vec<String>>>,
    forward: BTreeMap<String, String>,
    inverse: BTreeMap<String, String>,
    decisions: Vec<MappingDecision>,
    mapped: bool,
}

impl CountryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MappingState {
        match (&self.rules, self.mapped) {
            (None, _) => MappingState::Unloaded,
            (Some(_), false) => MappingState::RulesLoaded,
            (Some(_), true) => MappingState::Mapped,
        }
    }

    /// Reads the rule file. On failure the engine keeps its previous state.
    pub fn read_rules(&mut self, path: &Path) -> Result<(), MappingError> {
        log::info!("Reading country mapping rules");
        log::debug!("Parsing rules from file {}", path.display());
        let root = read_tree(path).map_err(|source| {
            log::error!("Failed to parse {}", path.display());
            MappingError::RulesUnreadable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.load_rules(&root, &path.display().to_string())
    }

    /// Reads rules held in memory; `name` labels the input in errors.
    pub fn read_rules_str(&mut self, text: &str, name: &str) -> Result<(), MappingError> {
        let root = parse_tree(text, name).map_err(|source| MappingError::RulesUnreadable {
            path: name.into(),
            source,
        })?;
        self.load_rules(&root, name)
    }

    fn load_rules(&mut self, root: &EU3TxtParseNode, name: &str) -> Result<(), MappingError> {
        let rules = parse_rules(root, name)?;
        log::debug!("Finished reading {} country mapping rules", rules.len());
        self.rules = Some(rules);
        self.clear_mapping();
        Ok(())
    }

    /// Candidates for `source_tag`, if a rule names it.
    pub fn rule(&self, source_tag: &str) -> Option<&[String]> {
        self.rules.as_ref()?.get(source_tag).map(Vec::as_slice)
    }

    pub fn rule_count(&self) -> usize {
        self.rules.as_ref().map_or(0, BTreeMap::len)
    }

    fn clear_mapping(&mut self) {
        self.forward.clear();
        self.inverse.clear();
        self.decisions.clear();
        self.mapped = false;
    }

    /// Assigns a destination tag to every source tag, in ascending tag order.
    /// Any earlier mapping is discarded first, and a failed run keeps none.
    /// Reserved rebel tags are skipped.
    pub fn create_mapping<'a, I, P>(
        &mut self,
        source_tags: I,
        potential: &P,
    ) -> Result<(), MappingError>
    where
        I: IntoIterator<Item = &'a str>,
        P: PotentialTags + ?Sized,
    {
        let Some(rules) = self.rules.take() else {
            return Err(MappingError::RulesNotLoaded);
        };
        self.clear_mapping();
        let result = self.assign_all(&rules, source_tags, potential);
        self.rules = Some(rules);
        if let Err(e) = result {
            self.clear_mapping();
            return Err(e);
        }
        self.mapped = true;
        log::info!("Mapped {} countries", self.forward.len());
        Ok(())
    }

    fn assign_all<'a, I, P>(
        &mut self,
        rules: &BTreeMap<String, Vec<String>>,
        source_tags: I,
        potential: &P,
    ) -> Result<(), MappingError>
    where
        I: IntoIterator<Item = &'a str>,
        P: PotentialTags + ?Sized,
    {
        let to_map: BTreeSet<&str> = source_tags.into_iter().collect();
        let mut generator = TagGenerator::new();

        for source in to_map {
            if tags::is_rebel(source) {
                log::debug!("Not mapping reserved tag {}", source);
                continue;
            }

            let from_rule = rules.get(source).and_then(|candidates| {
                let unused = |c: &&String| !self.inverse.contains_key(c.as_str());
                candidates
                    .iter()
                    .filter(unused)
                    .find(|c| potential.contains_tag(c))
                    .map(|c| (c.clone(), MappingReason::DefaultDestination))
                    .or_else(|| {
                        candidates
                            .iter()
                            .find(unused)
                            .map(|c| (c.clone(), MappingReason::RuleOnly))
                    })
            });

            let (destination, reason) = match from_rule {
                Some(choice) => choice,
                None => (self.generate_tag(&mut generator, source)?, MappingReason::Generated),
            };
            self.record(source, destination, reason);
        }
        Ok(())
    }

    fn generate_tag(
        &self,
        generator: &mut TagGenerator,
        source: &str,
    ) -> Result<String, MappingError> {
        loop {
            let Some(tag) = generator.next_tag() else {
                log::error!("No generated tag left for {}", source);
                return Err(MappingError::GeneratedTagsExhausted(source.to_string()));
            };
            if !self.inverse.contains_key(&tag) {
                return Ok(tag);
            }
        }
    }

    fn record(&mut self, source: &str, destination: String, reason: MappingReason) {
        log::debug!("Mapping {} -> {} ({})", source, destination, reason);
        self.forward.insert(source.to_string(), destination.clone());
        self.inverse.insert(destination.clone(), source.to_string());
        self.decisions.push(MappingDecision {
            source: source.to_string(),
            destination,
            reason,
        });
    }

    /// Destination tag for `source_tag`. Rebel, pirate and native factions
    /// always map to the destination rebel tag.
    pub fn get_destination_tag(&self, source_tag: &str) -> Option<&str> {
        if tags::is_rebel(source_tag) {
            return Some(tags::DESTINATION_REBEL_TAG);
        }
        self.forward.get(source_tag).map(String::as_str)
    }

    pub fn get_source_tag(&self, destination_tag: &str) -> Option<&str> {
        self.inverse.get(destination_tag).map(String::as_str)
    }

    pub fn forward_map(&self) -> &BTreeMap<String, String> {
        &self.forward
    }

    pub fn inverse_map(&self) -> &BTreeMap<String, String> {
        &self.inverse
    }

    /// Every assignment of the last run, in the order they were made.
    pub fn decisions(&self) -> &[MappingDecision] {
        &self.decisions
    }
}

fn parse_rules(
    root: &EU3TxtParseNode,
    name: &str,
) -> Result<BTreeMap<String, Vec<String>>, MappingError> {
    let Some(mappings) = root.get("mappings").find(|n| n.is_list()) else {
        log::error!("{} does not contain a mapping", name);
        return Err(MappingError::NoMappings(name.to_string()));
    };

    let mut rules = BTreeMap::new();
    for link in mappings.get("link") {
        let mut source = None;
        let mut candidates = Vec::new();
        for (key, value) in link.assignments() {
            match key.as_str() {
                Some("eu3") => source = value.key_string(),
                Some("vic") => candidates.extend(value.key_string()),
                _ => log::warn!(
                    "Ignoring unknown key '{}' while mapping countries",
                    key.key_string().unwrap_or_default()
                ),
            }
        }
        let Some(source) = source else {
            log::warn!("Skipping mapping link without an eu3 tag");
            continue;
        };
        if let Some(previous) = rules.insert(source.clone(), candidates) {
            log::debug!("Later rule for {} replaces {:?}", source, previous);
        }
    }
    Ok(rules)
}
