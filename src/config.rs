//! Gallery configuration.
//!
//! Handles loading and validating `gallery.toml`. A missing file is not
//! an error; stock defaults apply and user files override just the
//! values they name.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! manifest = "data/sections.json"  # Manifest path, relative to the site root
//!
//! [grid]
//! page_size = 24            # Images per grid page
//! default_sizes = "(max-width: 600px) 100vw, (max-width: 1200px) 50vw, 33vw"
//!
//! [carousel]
//! interval_ms = 5000        # Auto-advance interval
//! transition_ms = 1000      # Slide transition duration
//! sample_size = 10          # Images sampled for the mixed carousel
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `gallery.toml`.
///
/// All fields have defaults. User config files need only specify the
/// values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Manifest path, relative to the site root.
    pub manifest: String,
    pub grid: GridConfig,
    pub carousel: CarouselConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Images per grid page. Sections larger than this paginate.
    pub page_size: usize,
    /// `sizes` attribute used when an item carries no sizing hint.
    pub default_sizes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselConfig {
    /// Milliseconds between automatic advances.
    pub interval_ms: u64,
    /// Milliseconds a slide transition runs before finalizing.
    pub transition_ms: u64,
    /// How many images the mixed carousel samples across all sections.
    pub sample_size: usize,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            manifest: "data/sections.json".to_string(),
            grid: GridConfig::default(),
            carousel: CarouselConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: 24,
            default_sizes: "(max-width: 600px) 100vw, (max-width: 1200px) 50vw, 33vw".to_string(),
        }
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            transition_ms: 1000,
            sample_size: 10,
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.page_size == 0 {
            return Err(ConfigError::Validation(
                "grid.page_size must be at least 1".into(),
            ));
        }
        if self.carousel.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "carousel.interval_ms must be non-zero".into(),
            ));
        }
        if self.carousel.sample_size == 0 {
            return Err(ConfigError::Validation(
                "carousel.sample_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl CarouselConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }
}

/// Load `gallery.toml` from the given path, falling back to defaults if
/// the file doesn't exist.
pub fn load_config(path: &Path) -> Result<GalleryConfig, ConfigError> {
    if !path.exists() {
        return Ok(GalleryConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: GalleryConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented stock `gallery.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> String {
    r#"# shutterbox gallery configuration
# All options are optional - defaults shown below.

# Manifest path, relative to the site root
manifest = "data/sections.json"

[grid]
# Images per grid page; sections larger than this paginate
page_size = 24
# "sizes" attribute used when an item carries no sizing hint
default_sizes = "(max-width: 600px) 100vw, (max-width: 1200px) 50vw, 33vw"

[carousel]
# Auto-advance interval in milliseconds
interval_ms = 5000
# Slide transition duration in milliseconds
transition_ms = 1000
# Images sampled across all sections for the mixed carousel
sample_size = 10
"#
    .to_string()
}
