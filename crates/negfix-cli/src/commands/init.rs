use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use negfix_core::config::{default_user_config_path, PipelineConfig};

/// Write the built-in pipeline defaults as a YAML config file.
///
/// Defaults to the platform config directory (`<config_dir>/negfix/negfix.yml`).
/// Existing files are left alone unless `force` is true.
pub fn cmd_init(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => default_user_config_path()
            .context("Could not determine the user config directory; pass --path")?,
    };

    if path.exists() && !force {
        println!(
            "Skipped: {} (already exists, use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    if path.is_dir() {
        bail!("{} is a directory", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let yaml = PipelineConfig::default()
        .to_yaml()
        .map_err(anyhow::Error::msg)?;
    std::fs::write(&path, yaml)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote pipeline defaults to {}", path.display());
    println!("Edit this file to change the defaults used by convert and batch.");
    Ok(())
}
