//! Application configuration for opagen.
//!
//! User config lives at `~/.opagen/opagen.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OpagenError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "opagen.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".opagen";

// ---------------------------------------------------------------------------
// Config structs (matching opagen.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding installed `.docx` templates.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Directory delivered artifacts are persisted into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Template name requested when the CLI is given none.
    #[serde(default = "default_template")]
    pub template: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            templates_dir: default_templates_dir(),
            output_dir: default_output_dir(),
            template: default_template(),
        }
    }
}

fn default_templates_dir() -> String {
    "~/.opagen/templates".into()
}
fn default_output_dir() -> String {
    "~/opagen-documents".into()
}
fn default_template() -> String {
    "default".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.opagen/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| OpagenError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.opagen/opagen.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content =
        std::fs::read_to_string(path).map_err(|e| OpagenError::artifact_io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| OpagenError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| OpagenError::artifact_io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| OpagenError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| OpagenError::artifact_io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("templates_dir"));
        assert!(toml_str.contains("output_dir"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.template, "default");
        assert_eq!(parsed.defaults.templates_dir, "~/.opagen/templates");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
output_dir = "/srv/agreements"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.output_dir, "/srv/agreements");
        assert_eq!(config.defaults.template, "default");
    }

    #[test]
    fn tilde_expansion_leaves_absolute_paths() {
        let path = expand_tilde("/var/templates");
        assert_eq!(path, PathBuf::from("/var/templates"));
    }
}
