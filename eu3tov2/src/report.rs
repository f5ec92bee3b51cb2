use crate::country_mapping::MappingDecision;
use eu3data::{WeightVector, WorldType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

/// What one source country brings into the conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySummary {
    pub source: String,
    pub destination: Option<String>,
    pub provinces: usize,
    pub cores: usize,
    pub weight: WeightVector,
    /// Share of the world weight sum, 0 when the world has no weight.
    pub weight_share: f64,
}

/// Outcome of a conversion run, handed to the destination-world stages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub world_type: WorldType,
    pub world_weight_sum: f64,
    pub removed_countries: Vec<String>,
    /// Source tag -> destination tag.
    pub mapping: BTreeMap<String, String>,
    pub decisions: Vec<MappingDecision>,
    pub countries: Vec<CountrySummary>,
    /// Aggregates keyed by raw owner string, unresolved owners included.
    pub tag_weights: BTreeMap<String, WeightVector>,
}

impl ConversionReport {
    pub fn country(&self, source: &str) -> Option<&CountrySummary> {
        self.countries.iter().find(|c| c.source == source)
    }
}

pub fn print_report(report: &ConversionReport, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "\n=== Conversion Report ===")?;
    writeln!(writer)?;
    writeln!(writer, "World type: {}", report.world_type)?;
    writeln!(writer, "World weight sum: {:.2}", report.world_weight_sum)?;
    writeln!(
        writer,
        "Countries mapped: {} | Removed: {}",
        report.mapping.len(),
        report.removed_countries.len()
    )?;
    writeln!(writer)?;

    if !report.decisions.is_empty() {
        writeln!(writer, "--- MAPPING ---")?;
        for decision in &report.decisions {
            writeln!(
                writer,
                "{} -> {} ({})",
                decision.source, decision.destination, decision.reason
            )?;
        }
        writeln!(writer)?;
    }

    if !report.countries.is_empty() {
        writeln!(writer, "--- WEIGHTS ---")?;
        for country in &report.countries {
            writeln!(
                writer,
                "{}: provinces={}, weight={:.2} ({:.1}%)",
                country.source,
                country.provinces,
                country.weight.total,
                country.weight_share * 100.0
            )?;
        }
        writeln!(writer)?;
    }

    if !report.removed_countries.is_empty() {
        writeln!(writer, "--- REMOVED ---")?;
        writeln!(writer, "{}", report.removed_countries.join(", "))?;
    }

    Ok(())
}

pub fn json_report(report: &ConversionReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
