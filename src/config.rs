//! Configuration management for the spec generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (specgen.toml)
//! - Environment variables (SPECGEN__*)
//!
//! ## Example config file (specgen.toml):
//! ```toml
//! [input]
//! path = "attributes_def.json"
//!
//! [output]
//! directory = "include"
//! prefix = "escdf"
//!
//! [generation]
//! dimension_refs = "validate"
//! strict = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolve::DimensionPolicy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecgenConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Definitions document
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the headers
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// Library prefix used in file, type and function names
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Treatment of Dims_definitions entries
    #[serde(default)]
    pub dimension_refs: DimensionPolicy,

    /// Fail the run when any warning is reported
    #[serde(default)]
    pub strict: bool,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("attributes_def.json")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_prefix() -> String {
    "escdf".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            prefix: default_prefix(),
        }
    }
}

impl SpecgenConfig {
    /// Load configuration, with `config_path` layered over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["specgen.toml", ".specgen.toml", "config/specgen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "escdf", "specgen") {
            let xdg_config = config_dir.config_dir().join("specgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SPECGEN__OUTPUT__PREFIX=mylib
        builder = builder.add_source(
            Environment::with_prefix("SPECGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpecgenConfig::default();
        assert_eq!(config.input.path, PathBuf::from("attributes_def.json"));
        assert_eq!(config.output.prefix, "escdf");
        assert_eq!(config.generation.dimension_refs, DimensionPolicy::Validate);
        assert!(!config.generation.strict);
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = toml::to_string_pretty(&SpecgenConfig::default()).unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("dimension_refs = \"validate\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[output]\nprefix = \"mylib\"\n\n[generation]\ndimension_refs = \"legacy\"\n",
        )
        .unwrap();

        let config = SpecgenConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.output.prefix, "mylib");
        assert_eq!(config.output.directory, PathBuf::from("."));
        assert_eq!(config.generation.dimension_refs, DimensionPolicy::Legacy);
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strict.toml");
        std::fs::write(&path, "[generation]\nstrict = false\n").unwrap();

        std::env::set_var("SPECGEN__GENERATION__STRICT", "true");
        let loaded = SpecgenConfig::load_from(path.to_str());
        std::env::remove_var("SPECGEN__GENERATION__STRICT");

        let config = loaded.unwrap();
        assert!(config.generation.strict);
        assert_eq!(config.output.prefix, "escdf");
    }
}
