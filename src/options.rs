//! Render Configuration
//!
//! Every knob has a default. Caller overrides are merged field by field,
//! with no validation of sizes or color syntax.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_category_color")]
    pub category_color: String,
}

fn default_width() -> u32 { 1200 }
fn default_height() -> u32 { 630 }
fn default_background_color() -> String { "#1e40af".to_string() }
fn default_text_color() -> String { "#ffffff".to_string() }
fn default_category_color() -> String { crate::palette::DEFAULT_CATEGORY_COLOR.to_string() }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background_color(),
            text_color: default_text_color(),
            category_color: default_category_color(),
        }
    }
}

impl RenderOptions {
    /// Shallow merge: any field present in `overrides` wins.
    pub fn merged(&self, overrides: &OptionOverrides) -> Self {
        Self {
            width: overrides.width.unwrap_or(self.width),
            height: overrides.height.unwrap_or(self.height),
            background_color: overrides
                .background_color
                .clone()
                .unwrap_or_else(|| self.background_color.clone()),
            text_color: overrides
                .text_color
                .clone()
                .unwrap_or_else(|| self.text_color.clone()),
            category_color: overrides
                .category_color
                .clone()
                .unwrap_or_else(|| self.category_color.clone()),
        }
    }
}

/// Per-call option overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_color: Option<String>,
}

/// PNG encoder settings.
///
/// `quality` only matters to palette-quantizing encoders; output here is
/// lossless RGBA, so it is carried through for reproducibility only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeOptions {
    #[serde(default = "default_quality")]
    pub quality: u8,
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
}

fn default_quality() -> u8 { 90 }
fn default_compression_level() -> u8 { 6 }

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            compression_level: default_compression_level(),
        }
    }
}

/// Composer-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    #[serde(default)]
    pub options: RenderOptions,
    #[serde(default)]
    pub encode: EncodeOptions,
    /// Worker limit for the settled batch mode.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

fn default_batch_concurrency() -> usize { 8 }

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            options: RenderOptions::default(),
            encode: EncodeOptions::default(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

impl ComposerConfig {
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_json_str(&content)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
