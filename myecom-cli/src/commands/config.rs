use anyhow::{Context, Result};
use clap::ValueEnum;
use shared::config::Config;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// File format for `myecom config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    const fn default_file_name(self) -> &'static str {
        match self {
            Self::Yaml => "config.yaml",
            Self::Json => "config.json",
        }
    }
}

/// Writes a configuration file holding the default values.
///
/// # Errors
/// Returns an error if serialization or writing the file fails.
pub fn generate_config(format: ConfigFormat, output: Option<&Path>) -> Result<()> {
    let config = Config::with_defaults();
    let path = output.map_or_else(|| PathBuf::from(format.default_file_name()), Path::to_path_buf);

    let serialized = match format {
        ConfigFormat::Yaml => serde_yml::to_string(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Configuration file '{}' generated successfully.", path.display());
    Ok(())
}
