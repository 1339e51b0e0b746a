//! Universe configuration loading and validation
//!
//! Every field has a default, so a missing or empty `starfield.toml`
//! yields the stock timing constants and layout tiers.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::camera::{AnimationMode, DIRECT_EASE_MS, SPIN_TURNS, TRIPLE_SPIN_MS};
use crate::orbit::BodyColor;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Animation pacing. The guard window of a mode is its nominal duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Click-driven flight duration in milliseconds
    #[serde(default = "default_direct_ease_ms")]
    pub direct_ease_ms: u64,
    /// Search-driven flight duration in milliseconds
    #[serde(default = "default_triple_spin_ms")]
    pub triple_spin_ms: u64,
    /// Full azimuthal turns made by a search-driven flight
    #[serde(default = "default_spin_turns")]
    pub spin_turns: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            direct_ease_ms: default_direct_ease_ms(),
            triple_spin_ms: default_triple_spin_ms(),
            spin_turns: default_spin_turns(),
        }
    }
}

impl TimingConfig {
    /// Nominal duration (and guard window) for an animation mode
    pub fn duration_for(&self, mode: AnimationMode) -> Duration {
        match mode {
            AnimationMode::DirectEase => Duration::from_millis(self.direct_ease_ms),
            AnimationMode::TripleSpin => Duration::from_millis(self.triple_spin_ms),
        }
    }

    /// Spin turns for an animation mode (zero for direct flights)
    pub fn turns_for(&self, mode: AnimationMode) -> u32 {
        match mode {
            AnimationMode::DirectEase => 0,
            AnimationMode::TripleSpin => self.spin_turns,
        }
    }
}

fn default_direct_ease_ms() -> u64 {
    DIRECT_EASE_MS
}

fn default_triple_spin_ms() -> u64 {
    TRIPLE_SPIN_MS
}

fn default_spin_turns() -> u32 {
    SPIN_TURNS
}

/// Deterministic placement tiers used by `derive_visuals`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_golden_angle")]
    pub golden_angle_deg: f32,
    #[serde(default = "default_base_radius")]
    pub base_radius: f32,
    #[serde(default = "default_radius_step")]
    pub radius_step: f32,
    #[serde(default = "default_radius_tiers")]
    pub radius_tiers: usize,
    #[serde(default = "default_height_tiers")]
    pub height_tiers: usize,
    #[serde(default = "default_height_offset")]
    pub height_offset: f32,
    #[serde(default = "default_orbit_radius_base")]
    pub orbit_radius_base: f32,
    #[serde(default = "default_orbit_radius_step")]
    pub orbit_radius_step: f32,
    #[serde(default = "default_orbit_radius_tiers")]
    pub orbit_radius_tiers: usize,
    #[serde(default = "default_orbit_speed_base")]
    pub orbit_speed_base: f32,
    #[serde(default = "default_orbit_speed_step")]
    pub orbit_speed_step: f32,
    #[serde(default = "default_orbit_speed_tiers")]
    pub orbit_speed_tiers: usize,
    #[serde(default = "default_size_base")]
    pub size_base: f32,
    #[serde(default = "default_size_step")]
    pub size_step: f32,
    #[serde(default = "default_size_tiers")]
    pub size_tiers: usize,
    /// Body colors as `#rrggbb`
    #[serde(default = "default_palette")]
    pub palette: Vec<BodyColor>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            golden_angle_deg: default_golden_angle(),
            base_radius: default_base_radius(),
            radius_step: default_radius_step(),
            radius_tiers: default_radius_tiers(),
            height_tiers: default_height_tiers(),
            height_offset: default_height_offset(),
            orbit_radius_base: default_orbit_radius_base(),
            orbit_radius_step: default_orbit_radius_step(),
            orbit_radius_tiers: default_orbit_radius_tiers(),
            orbit_speed_base: default_orbit_speed_base(),
            orbit_speed_step: default_orbit_speed_step(),
            orbit_speed_tiers: default_orbit_speed_tiers(),
            size_base: default_size_base(),
            size_step: default_size_step(),
            size_tiers: default_size_tiers(),
            palette: default_palette(),
        }
    }
}

fn default_golden_angle() -> f32 {
    137.5
}

fn default_base_radius() -> f32 {
    8.0
}

fn default_radius_step() -> f32 {
    2.0
}

fn default_radius_tiers() -> usize {
    3
}

fn default_height_tiers() -> usize {
    7
}

fn default_height_offset() -> f32 {
    3.0
}

fn default_orbit_radius_base() -> f32 {
    0.3
}

fn default_orbit_radius_step() -> f32 {
    0.1
}

fn default_orbit_radius_tiers() -> usize {
    4
}

fn default_orbit_speed_base() -> f32 {
    0.08
}

fn default_orbit_speed_step() -> f32 {
    0.03
}

fn default_orbit_speed_tiers() -> usize {
    5
}

fn default_size_base() -> f32 {
    80.0
}

fn default_size_step() -> f32 {
    20.0
}

fn default_size_tiers() -> usize {
    5
}

fn default_palette() -> Vec<BodyColor> {
    vec![
        BodyColor::from_hex(0x6366f1), // indigo
        BodyColor::from_hex(0x8b5cf6), // violet
        BodyColor::from_hex(0xec4899), // pink
        BodyColor::from_hex(0xf59e0b), // amber
        BodyColor::from_hex(0x10b981), // emerald
        BodyColor::from_hex(0x3b82f6), // blue
        BodyColor::from_hex(0xef4444), // red
        BodyColor::from_hex(0x14b8a6), // teal
    ]
}

/// Which body position a camera request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusAnchor {
    /// Orbit center, stable across frames
    #[default]
    Base,
    /// Position including the secondary wobble at request time
    Instantaneous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Camera offset from the look-at target once a body is framed
    #[serde(default = "default_framing_offset")]
    pub framing_offset: [f32; 3],
    #[serde(default = "default_initial_position")]
    pub initial_position: [f32; 3],
    #[serde(default)]
    pub initial_look_at: [f32; 3],
    #[serde(default)]
    pub focus: FocusAnchor,
    /// Radians per pixel of drag
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            framing_offset: default_framing_offset(),
            initial_position: default_initial_position(),
            initial_look_at: [0.0; 3],
            focus: FocusAnchor::default(),
            sensitivity: default_sensitivity(),
            zoom_speed: default_zoom_speed(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
        }
    }
}

fn default_framing_offset() -> [f32; 3] {
    [0.0, 2.0, 6.0]
}

fn default_initial_position() -> [f32; 3] {
    [0.0, 6.0, 22.0]
}

fn default_sensitivity() -> f32 {
    0.005
}

fn default_zoom_speed() -> f32 {
    0.1
}

fn default_min_distance() -> f32 {
    2.0
}

fn default_max_distance() -> f32 {
    60.0
}

impl UniverseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: UniverseConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded universe configuration");
        Ok(config)
    }

    /// Load configuration or fall back to defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.direct_ease_ms == 0 || self.timing.triple_spin_ms == 0 {
            return Err(ConfigError::Invalid(
                "animation durations must be non-zero".to_string(),
            ));
        }

        let layout = &self.layout;
        let tiers = [
            ("radius_tiers", layout.radius_tiers),
            ("height_tiers", layout.height_tiers),
            ("orbit_radius_tiers", layout.orbit_radius_tiers),
            ("orbit_speed_tiers", layout.orbit_speed_tiers),
            ("size_tiers", layout.size_tiers),
        ];
        if let Some((name, _)) = tiers.iter().find(|(_, count)| *count == 0) {
            return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
        }

        if layout.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".to_string()));
        }

        let camera = &self.camera;
        if camera.min_distance <= 0.0 || camera.min_distance > camera.max_distance {
            return Err(ConfigError::Invalid(format!(
                "zoom limits out of order: {} .. {}",
                camera.min_distance, camera.max_distance
            )));
        }

        Ok(())
    }
}
