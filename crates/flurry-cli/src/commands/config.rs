//! Configuration commands: print defaults, check a file

use anyhow::{Context, Result};
use flurry_runtime::ChoreographyConfig;
use std::path::Path;

/// Print the default configuration as TOML.
pub fn show_defaults() -> Result<()> {
    let text = ChoreographyConfig::default()
        .to_toml_string()
        .context("Failed to serialize default config")?;
    print!("{}", text);
    Ok(())
}

/// Load and validate a config file, then print the merged result.
pub fn check(path: &Path) -> Result<()> {
    let config = ChoreographyConfig::load(path)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    println!("{}: ok", path.display());
    println!("  particles: {}", config.particles.count);
    match config.particles.seed {
        Some(seed) => println!("  seed: {}", seed),
        None => println!("  seed: (entropy)"),
    }
    println!(
        "  autoplay: {} every {}s",
        config.schedule.autoplay, config.schedule.advance_interval
    );
    if let Some(logo) = &config.assets.logo_image {
        println!("  logo: {}", logo.display());
    }
    Ok(())
}
