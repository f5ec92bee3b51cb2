use eu3data::LoadError;
use eu3data::defines::tags;
use eu3data::tree::read_tree;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// Answers whether a tag names a country the destination world can hold.
pub trait PotentialTags {
    fn contains_tag(&self, tag: &str) -> bool;
}

impl PotentialTags for HashSet<String> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }
}

impl PotentialTags for BTreeSet<String> {
    fn contains_tag(&self, tag: &str) -> bool {
        self.contains(tag)
    }
}

/// Destination-world countries listed in `common/countries.txt`, with the
/// definition file each one points at (relative to `common/`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PotentialCountries {
    countries: BTreeMap<String, PathBuf>,
}

impl PotentialCountries {
    pub fn load(v2_root: &Path) -> Result<Self, LoadError> {
        let index_path = v2_root.join("common/countries.txt");
        let index = read_tree(&index_path)?;

        let mut countries = BTreeMap::new();
        for (key, value) in index.assignments() {
            // dynamic_tags = yes and friends
            let Some(tag) = key.as_str().filter(|k| tags::is_country_tag(k)) else {
                continue;
            };
            match value.as_str() {
                Some(path) => {
                    countries.insert(tag.to_string(), PathBuf::from(path.replace('\\', "/")));
                }
                None => log::warn!(
                    "Country {} in {} has no definition file",
                    tag,
                    index_path.display()
                ),
            }
        }
        log::info!("Read {} potential destination countries", countries.len());
        Ok(Self { countries })
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            countries: tags.into_iter().map(|t| (t.into(), PathBuf::new())).collect(),
        }
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.countries.keys().map(String::as_str)
    }

    pub fn definition_file(&self, tag: &str) -> Option<&Path> {
        self.countries.get(tag).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl PotentialTags for PotentialCountries {
    fn contains_tag(&self, tag: &str) -> bool {
        self.countries.contains_key(tag)
    }
}
