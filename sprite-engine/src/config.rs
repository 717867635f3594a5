// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Engine configuration
//!
//! Every section has defaults matching the classic demo setup (an 800x600
//! stage, ~30 updates and ~60 renders per second, three sine channels), so a
//! config file only needs to list what it changes. Files are TOML or RON,
//! chosen by extension.
//!
//! ```toml
//! [stage]
//! width = 640.0
//!
//! [loop]
//! update_interval_ms = 20.0
//! render_while_paused = false
//! ```

use crate::audio::Oscillator;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration loading errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported file extension
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values parsed but failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// File-backed configuration
pub trait Config: Serialize + DeserializeOwned + Default {
    /// Load configuration from a `.toml` or `.ron` file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to a `.toml` or `.ron` file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Drawing surface size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Surface width in pixels
    pub width: f64,
    /// Surface height in pixels
    pub height: f64,
}

impl Default for StageConfig {
    fn default() -> Self {
        StageConfig {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Update and render cadences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Nominal interval between update ticks
    pub update_interval_ms: f64,
    /// Nominal interval between render frames when the loop drives itself
    pub render_interval_ms: f64,
    /// Keep rendering while the loop is paused
    pub render_while_paused: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig {
            update_interval_ms: 1000.0 / 30.0,
            render_interval_ms: 1000.0 / 60.0,
            render_while_paused: true,
        }
    }
}

impl LoopConfig {
    /// Check that both cadences are positive and finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("update_interval_ms", self.update_interval_ms),
            ("render_interval_ms", self.render_interval_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Sound channel layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Oscillator for each channel, indexed by channel number
    pub channels: Vec<Oscillator>,
    /// Default note volume in `[0, 1]`
    pub volume: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            channels: vec![Oscillator::Sine; 3],
            volume: 0.5,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drawing surface
    pub stage: StageConfig,
    /// Game loop cadences
    #[serde(rename = "loop")]
    pub game_loop: LoopConfig,
    /// Sound channels
    pub audio: AudioConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.stage.width > 0.0 && self.stage.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "stage size must be positive, got {}x{}",
                self.stage.width, self.stage.height
            )));
        }
        self.game_loop.validate()?;
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::Invalid(format!(
                "audio volume must be within [0, 1], got {}",
                self.audio.volume
            )));
        }
        Ok(())
    }
}
