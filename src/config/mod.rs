// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Application settings.
//!
//! Defaults for new songs and layers plus file naming conventions, loaded
//! from YAML (or TOML, chosen by file extension).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{LayerColor, DEFAULT_TEMPO, TEMPOS, VOLUMES};

/// Root settings document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Settings {
    /// Defaults for new songs
    #[serde(default)]
    pub song: SongDefaults,
    /// Defaults for new layers
    #[serde(default)]
    pub layer: LayerDefaults,
    /// File naming
    #[serde(default)]
    pub files: FileSettings,
}

impl Settings {
    /// Load settings from a YAML or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {:?}", path))?;

        let settings = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };

        let problems = settings.validate();
        if !problems.is_empty() {
            bail!("Invalid settings in {:?}: {}", path, problems.join("; "));
        }
        Ok(settings)
    }

    /// Load settings from `path`, or use defaults when no path is given
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML settings")
    }

    /// Parse settings from a TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML settings")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize settings to YAML")
    }

    /// Save settings as YAML
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write settings file: {:?}", path.as_ref()))
    }

    /// List every setting that is out of range
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if !TEMPOS.contains(&self.song.default_tempo) {
            problems.push(format!(
                "song.default_tempo {} must be between 10 and 500",
                self.song.default_tempo
            ));
        }
        if !VOLUMES.contains(&self.layer.default_volume) {
            problems.push(format!(
                "layer.default_volume {} must be between 0 and 100",
                self.layer.default_volume
            ));
        }
        for (key, ext) in [
            ("files.project_extension", &self.files.project_extension),
            ("files.midi_extension", &self.files.midi_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                problems.push(format!("{} {:?} must be non-empty without a leading dot", key, ext));
            }
        }

        problems
    }
}

/// Defaults applied to new songs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongDefaults {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub default_tempo: u16,
}

fn default_tempo() -> u16 {
    DEFAULT_TEMPO
}

impl Default for SongDefaults {
    fn default() -> Self {
        Self {
            default_tempo: default_tempo(),
        }
    }
}

/// Defaults applied to new layers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayerDefaults {
    /// Volume (0-100)
    #[serde(default = "default_volume")]
    pub default_volume: u8,
    /// Color
    #[serde(default = "default_color")]
    pub default_color: LayerColor,
}

fn default_volume() -> u8 {
    100
}
fn default_color() -> LayerColor {
    LayerColor::Pink
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            default_color: default_color(),
        }
    }
}

/// File naming conventions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileSettings {
    /// Extension for project files, without the dot
    #[serde(default = "default_project_extension")]
    pub project_extension: String,
    /// Extension for exported MIDI files, without the dot
    #[serde(default = "default_midi_extension")]
    pub midi_extension: String,
}

fn default_project_extension() -> String {
    "mycomposer".to_string()
}
fn default_midi_extension() -> String {
    "mid".to_string()
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            project_extension: default_project_extension(),
            midi_extension: default_midi_extension(),
        }
    }
}

impl FileSettings {
    /// `path` with the project extension, unless it already has one
    pub fn project_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        with_default_extension(path.as_ref(), &self.project_extension)
    }

    /// `path` with the MIDI extension, unless it already has one
    pub fn midi_path<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        with_default_extension(path.as_ref(), &self.midi_extension)
    }
}

fn with_default_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}
