use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use eu3data::World;
use eu3tov2::{Configuration, ConversionRun, PotentialCountries, report};

#[derive(Parser)]
#[command(name = "eu3tov2")]
#[command(about = "Map EU3 save countries onto Victoria 2 tags and weigh their provinces")]
struct Cli {
    /// Path to the EU3 save file (.eu3)
    save_path: PathBuf,

    /// Country mapping rules (country_mappings.txt)
    #[arg(short, long)]
    rules: PathBuf,

    /// Converter configuration (configuration.txt)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Victoria 2 install directory, read for potential countries
    #[arg(long)]
    v2_path: Option<PathBuf>,

    /// Destination tags to use instead of a Victoria 2 install (comma-separated)
    #[arg(long, value_delimiter = ',', conflicts_with = "v2_path")]
    dest_tags: Vec<String>,

    /// EU3 install directory, read for country colors
    #[arg(long)]
    eu3_path: Option<PathBuf>,

    /// Force the source world type: dw, httt, in or auto
    #[arg(long)]
    eu3_gametype: Option<String>,

    /// Output report as JSON
    #[arg(long)]
    json: bool,

    /// Write report to file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match &cli.config {
        Some(path) => Configuration::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(game_type) = cli.eu3_gametype {
        config.game_type = Some(game_type);
    }

    let mut world = World::load(&cli.save_path)
        .with_context(|| format!("Failed to load save {}", cli.save_path.display()))?;

    if let Some(eu3_root) = cli.eu3_path.or(config.eu3_root.clone()) {
        let colored = world
            .read_common_countries(&eu3_root)
            .with_context(|| format!("Failed to read countries from {}", eu3_root.display()))?;
        log::info!("Read colors for {} countries", colored);
    }

    let potential = if !cli.dest_tags.is_empty() {
        PotentialCountries::from_tags(cli.dest_tags)
    } else if let Some(v2_root) = cli.v2_path.or(config.v2_root.clone()) {
        PotentialCountries::load(&v2_root).with_context(|| {
            format!(
                "Failed to read potential countries from {}",
                v2_root.display()
            )
        })?
    } else {
        log::warn!("No Victoria 2 install given, no rule candidate counts as a real country");
        PotentialCountries::default()
    };

    let mut run = ConversionRun::new(world, potential, config.game_type_override());
    let summary = run.execute(&cli.rules).context("Country mapping failed")?;

    if cli.json {
        let json_output = report::json_report(&summary)?;
        if let Some(path) = cli.output {
            std::fs::write(&path, &json_output)?;
            log::info!("Report written to: {}", path.display());
        } else {
            println!("{}", json_output);
        }
    } else {
        let mut writer: Box<dyn std::io::Write> = if let Some(path) = cli.output {
            Box::new(std::fs::File::create(&path)?)
        } else {
            Box::new(std::io::stdout())
        };
        report::print_report(&summary, &mut writer)?;
    }

    Ok(())
}
