//! Configuration handling for the GBKviz CLI
//!
//! Supports loading configuration from gbkviz.toml files with CLI argument overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use gbkviz_core::aligner::default_threads;
use gbkviz_core::session::DEFAULT_SESSION_TTL;
use gbkviz_core::{DrawParams, MapType, SeqType, ToolPaths};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub draw: DrawParams,
    #[serde(default)]
    pub align: AlignConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub tools: ToolPaths,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignConfig {
    /// nucleotide (nucmer) or protein (promer)
    #[serde(default = "default_seqtype")]
    pub seqtype: SeqType,

    /// delta-filter mode
    #[serde(default = "default_maptype")]
    pub maptype: MapType,

    /// Drop alignments shorter than this on either genome
    #[serde(default)]
    pub min_length: Option<u64>,

    /// Drop alignments below this percent identity
    #[serde(default)]
    pub min_identity: Option<f64>,

    /// Pairwise alignment jobs run at once
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Raster resolution for png/jpg output
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Stamp version and generation time in the bottom-left corner
    #[serde(default)]
    pub show_footer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Parent of the per-run working directories
    #[serde(default = "default_session_root")]
    pub root: PathBuf,

    /// Working directories older than this are removed by `sweep` and at the start of each run
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_seqtype() -> SeqType { SeqType::Nucleotide }
fn default_maptype() -> MapType { MapType::OneToOne }
fn default_dpi() -> u32 { 300 }
fn default_font_family() -> String { "Helvetica, Arial, sans-serif".to_string() }
fn default_session_root() -> PathBuf { std::env::temp_dir().join("gbkviz") }
fn default_ttl_secs() -> u64 { DEFAULT_SESSION_TTL.as_secs() }

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            seqtype: default_seqtype(),
            maptype: default_maptype(),
            min_length: None,
            min_identity: None,
            threads: default_threads(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dpi: default_dpi(),
            font_family: default_font_family(),
            show_footer: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            root: default_session_root(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("gbkviz.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: gbkviz.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Generate example configuration file content
    pub fn example_toml() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbkviz_core::{FeatureSymbol, TrackAlignment};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.align.seqtype, SeqType::Nucleotide);
        assert_eq!(config.align.maptype, MapType::OneToOne);
        assert!(config.align.threads >= 1);
        assert_eq!(config.session.ttl_secs, 600);
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.tools, ToolPaths::default());
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.draw.show_label = true;
        config.draw.identity_floor = Some(20.0);
        config.align.min_length = Some(250);
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;

        assert_eq!(loaded.draw, config.draw);
        assert_eq!(loaded.align.min_length, Some(250));
        assert_eq!(loaded.align.min_identity, None);
        assert_eq!(loaded.session.root, config.session.root);

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            "[draw]\nfeature_symbol = \"OCTO\"\ntrack_alignment = \"center\"\n\n[align]\nseqtype = \"protein\"\nmaptype = \"many-to-many\"\n\n[tools]\nnucmer = \"/opt/mummer/nucmer\""
        )?;

        let config = Config::load_from_file(temp_file.path())?;
        assert_eq!(config.draw.feature_symbol, FeatureSymbol::Octo);
        assert_eq!(config.draw.track_alignment, TrackAlignment::Center);
        assert_eq!(config.draw.label_angle, 30.0);
        assert_eq!(config.align.seqtype, SeqType::Protein);
        assert_eq!(config.align.maptype, MapType::ManyToMany);
        assert_eq!(config.tools.nucmer, PathBuf::from("/opt/mummer/nucmer"));
        assert_eq!(config.tools.promer, PathBuf::from("promer"));
        assert_eq!(config.session.ttl_secs, 600);

        Ok(())
    }

    #[test]
    fn test_bad_value_is_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[align]\nseqtype = \"rna\"")?;
        assert!(Config::load_from_file(temp_file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() -> Result<()> {
        let example = Config::example_toml()?;
        assert!(example.contains("[draw]"));
        assert!(example.contains("[align]"));
        assert!(example.contains("[tools]"));
        assert!(example.contains("[session]"));
        assert!(example.contains("show-coords"));
        Ok(())
    }
}
