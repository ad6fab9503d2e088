use anyhow::Result;
use std::path::Path;

use mediadrop_core::config::Config;

pub async fn run(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("# mediadrop configuration\n");
    println!("{}", toml::to_string_pretty(&config)?);

    if config.paths.yt_dlp.is_none() {
        match config.yt_dlp_path() {
            Ok(p) => println!("# yt-dlp auto-detected at {}", p.display()),
            Err(_) => println!("# yt-dlp not found in PATH"),
        }
    }

    // Show config file locations
    println!("\nConfig sources (later entries win):");
    if let Some(config_dir) = dirs::config_dir() {
        println!("  1. {}/mediadrop/config.toml", config_dir.display());
    }
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    println!("  3. PORT");
    println!("  4. Environment variables (MEDIADROP_*, nested keys joined with __)");

    Ok(())
}
