use crate::error::LoadError;
use crate::province::ProvinceId;
use crate::world::World;

/// Renders a small synthetic save so tests can exercise the real loader.
#[derive(Debug, Default)]
pub struct SaveBuilder {
    items: Vec<String>,
    agreements: Vec<String>,
    cots: Vec<ProvinceId>,
}

impl SaveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw save text verbatim.
    pub fn raw(mut self, text: &str) -> Self {
        self.items.push(text.to_string());
        self
    }

    pub fn country(mut self, tag: &str) -> Self {
        self.items.push(format!("{} = {{ }}", tag));
        self
    }

    pub fn province(mut self, num: ProvinceId, owner: &str, base_tax: f64) -> Self {
        self.items.push(format!(
            "{} = {{ owner = \"{}\" base_tax = {:.3} }}",
            num, owner, base_tax
        ));
        self
    }

    /// A province block with an arbitrary body.
    pub fn province_with(mut self, num: ProvinceId, body: &str) -> Self {
        self.items.push(format!("{} = {{ {} }}", num, body));
        self
    }

    pub fn cot(mut self, location: ProvinceId) -> Self {
        self.cots.push(location);
        self
    }

    pub fn diplomacy(mut self, kind: &str, first: &str, second: &str) -> Self {
        self.agreements.push(format!(
            "{} = {{ first = \"{}\" second = \"{}\" }}",
            kind, first, second
        ));
        self
    }

    pub fn build(&self) -> String {
        let mut save = self.items.join("\n");
        if !self.agreements.is_empty() {
            save.push_str(&format!("\ndiplomacy = {{\n{}\n}}", self.agreements.join("\n")));
        }
        if !self.cots.is_empty() {
            let cots: Vec<String> = self
                .cots
                .iter()
                .map(|loc| format!("cot = {{ location = {} level = 1 }}", loc))
                .collect();
            save.push_str(&format!("\ntrade = {{\n{}\n}}", cots.join("\n")));
        }
        save.push('\n');
        save
    }

    pub fn world(&self) -> Result<World, LoadError> {
        World::parse_str(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let builder = SaveBuilder::default()
            .country("SWE")
            .province(1, "SWE", 4.0)
            .cot(1)
            .diplomacy("alliance", "SWE", "DAN");

        let text = builder.build();
        assert!(text.contains("1 = { owner = \"SWE\" base_tax = 4.000 }"));
        assert!(text.contains("diplomacy = {"));

        let world = builder.world().unwrap();
        assert!(world.country("SWE").is_some());
        assert!(world.province(1).unwrap().is_center_of_trade());
        assert_eq!(world.diplomacy().agreements().len(), 1);
    }

    #[test]
    fn test_empty_save_fails() {
        assert!(SaveBuilder::new().world().is_err());
    }
}
