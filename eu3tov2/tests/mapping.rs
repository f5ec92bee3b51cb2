use eu3data::World;
use eu3data::testing::SaveBuilder;
use eu3tov2::{ConversionRun, MappingReason, PotentialCountries};
use std::fs;
use std::path::Path;

fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

#[test]
fn test_swe_and_dnk_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join("save.eu3");
    let rules = dir.path().join("country_mappings.txt");
    let v2 = dir.path().join("v2");

    write(
        &save,
        &SaveBuilder::new()
            .country("SWE")
            .country("DNK")
            .province(1, "SWE", 5.0)
            .province(12, "DNK", 4.0)
            .build(),
    );
    write(
        &rules,
        "mappings = {\n\tlink = { eu3 = SWE vic = SWE vic = SWE2 }\n}\n",
    );
    write(
        &v2.join("common/countries.txt"),
        "SWE = \"countries/Sweden.txt\"\nENG = \"countries/England.txt\"\n",
    );

    let world = World::load(&save).unwrap();
    let potential = PotentialCountries::load(&v2).unwrap();
    let mut run = ConversionRun::new(world, potential, None);
    let report = run.execute(&rules).unwrap();

    let mapping = run.mapping();
    assert_eq!(mapping.get_destination_tag("SWE"), Some("SWE"));
    assert_eq!(mapping.get_destination_tag("DNK"), Some("X00"));
    assert_eq!(mapping.get_source_tag("SWE"), Some("SWE"));
    assert_eq!(mapping.get_source_tag("X00"), Some("DNK"));

    let reasons: Vec<(&str, MappingReason)> = report
        .decisions
        .iter()
        .map(|d| (d.source.as_str(), d.reason))
        .collect();
    assert_eq!(
        reasons,
        vec![
            ("DNK", MappingReason::Generated),
            ("SWE", MappingReason::DefaultDestination),
        ]
    );
}

#[test]
fn test_aggregates_match_province_sums() {
    let world = SaveBuilder::new()
        .country("AAA")
        .country("BBB")
        .province_with(1, r#"owner = "AAA" base_tax = 3 manpower = 2 trade_goods = wine"#)
        .province_with(2, r#"owner = "AAA" base_tax = 5 trade_goods = grain marketplace = yes"#)
        .province_with(3, r#"owner = "BBB" base_tax = 8 manpower = 4 fort2 = yes"#)
        .raw("trade = { cot = { location = 2 } }")
        .world()
        .unwrap();

    let mut aaa = [0.0; 6];
    for num in [1, 2] {
        let weights = world.province(num).unwrap().weight_vector().as_array();
        for (sum, w) in aaa.iter_mut().zip(weights) {
            *sum += w;
        }
    }
    assert_eq!(world.tag_weight("AAA").unwrap().as_array(), aaa);
    assert_eq!(
        world.tag_weight("BBB").unwrap().as_array(),
        world.province(3).unwrap().weight_vector().as_array()
    );
    assert!(world.province(2).unwrap().is_center_of_trade());
}

#[test]
fn test_missing_rules_file_aborts() {
    let world = SaveBuilder::new()
        .country("SWE")
        .province(1, "SWE", 1.0)
        .world()
        .unwrap();
    let mut run = ConversionRun::new(world, PotentialCountries::default(), None);
    let err = run
        .execute(Path::new("/nonexistent/country_mappings.txt"))
        .unwrap_err();
    assert!(err.to_string().contains("country_mappings.txt"));
    assert!(run.mapping().forward_map().is_empty());
}
