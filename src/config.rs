//! Layered application settings.
//!
//! Settings are merged with `figment`, later layers winning:
//! built-in defaults < TOML file < `DUPFINDER_*` environment < CLI flags.
//!
//! The TOML file is the one given with `--config`, or `config.toml` in the
//! platform config directory (for example `~/.config/dupfinder/config.toml`).
//!
//! ```toml
//! chunk_size = 131072
//! min_size = 1024
//! exclude = ['\.git/']
//! skip_hidden = true
//! ```
//!
//! In the environment, `include` and `exclude` take either one pattern
//! (`DUPFINDER_EXCLUDE='\.git/'`) or a bracketed list
//! (`DUPFINDER_EXCLUDE='[a, b]'`).

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Deserializer, Serialize};

use crate::duplicates::DEFAULT_CHUNK_SIZE;
use crate::scanner::WalkerConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DUPFINDER_";

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bytes read from each file per comparison step
    pub chunk_size: usize,
    /// Files smaller than this are skipped when walking directories
    pub min_size: u64,
    /// Files larger than this are skipped when walking directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    /// Regexes; when any are given a path must match one
    #[serde(deserialize_with = "one_or_many")]
    pub include: Vec<String>,
    /// Regexes; a matching path is skipped
    #[serde(deserialize_with = "one_or_many")]
    pub exclude: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Skip dot files and directories while walking
    pub skip_hidden: bool,
}

/// A pattern list, or a single pattern standing for a list of one.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Patterns {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Patterns::deserialize(deserializer)? {
        Patterns::One(pattern) => vec![pattern],
        Patterns::Many(patterns) => patterns,
    })
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size: 1,
            max_size: None,
            include: Vec::new(),
            exclude: Vec::new(),
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[allow(missing_docs)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub follow_symlinks: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_hidden: bool,
}

impl Settings {
    /// Platform config file location, if a home directory is known.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupfinder").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, file and environment layers.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings, applying `overrides` last.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly given config file does not exist, if any layer
    /// does not parse, or if the result is invalid.
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => {
                if !path.is_file() {
                    bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_config_path().filter(|p| p.is_file()),
        };

        if let Some(ref path) = file {
            log::debug!("Loading config from {}", path.display());
        }

        let settings: Settings = Self::figment(file.as_deref())
            .merge(Serialized::defaults(overrides))
            .extract()
            .with_context(|| match file {
                Some(ref path) => format!("Invalid configuration in {}", path.display()),
                None => "Invalid configuration".to_string(),
            })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Fails on a zero chunk size or an empty size range.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk_size must be at least 1 byte");
        }
        if let Some(max) = self.max_size {
            if max < self.min_size {
                bail!("max_size ({max}) is smaller than min_size ({})", self.min_size);
            }
        }
        Ok(())
    }

    /// Build the walker configuration, compiling the regexes.
    ///
    /// # Errors
    ///
    /// Fails on the first pattern that does not compile.
    pub fn walker_config(&self) -> Result<WalkerConfig> {
        let config = WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            min_size: self.min_size,
            max_size: self.max_size,
            ..Default::default()
        };
        config
            .with_patterns(&self.include, &self.exclude)
            .context("Invalid include/exclude pattern")
    }
}
