/// Strata Terminal Demo - tile map and layered parallax scene
///
/// Usage: strata-terminal [config.json] [texture.png]
///
/// Controls:
///   - WASD / Arrow Keys: Move the player (tiles) or pan the camera (layers)
///   - Tab: Switch scene
///   - Q/ESC: Quit

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;
use strata_core::{init_logging, LoggingConfig, RenderConfig};
use strata_terminal::TerminalApp;

fn load_config(path: Option<&PathBuf>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::quiet());

    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    let mut config = load_config(args.first())?;

    // One framebuffer pixel per terminal cell.
    let (cols, rows) = crossterm::terminal::size().context("failed to query terminal size")?;
    config.window_width = cols as u32;
    config.window_height = rows as u32;

    let mut app = TerminalApp::new(config, args.get(1).map(PathBuf::as_path))?;
    app.run()?;

    println!("Thank you for using Strata Terminal!");
    Ok(())
}
