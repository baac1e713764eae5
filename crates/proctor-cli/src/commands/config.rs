/// Configuration management command handlers
use anyhow::{Context, Result};
use proctor_core::config::{default_config_path, EngineConfig};
use std::path::{Path, PathBuf};

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path().context("Could not determine the configuration directory"),
    }
}

pub fn handle_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = EngineConfig::load_or_default(config_path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn handle_config_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = resolve_path(config_path)?;
    write_default_config(&path, force)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn handle_config_path(config_path: Option<&Path>) -> Result<()> {
    let path = resolve_path(config_path)?;
    let state = if path.exists() { "exists" } else { "not created" };
    println!("{} ({state})", path.display());
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; use --force to overwrite it",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, EngineConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
