//! TOML Configuration File Support
//!
//! Every tunable the pet uses (tick rate, speeds, gesture thresholds, sprite
//! size) is loaded from `~/.config/desktop-pet/pet.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables (`PET_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file lives at `$XDG_CONFIG_HOME/desktop-pet/pet.toml`
//! (typically `~/.config/desktop-pet/pet.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [motion]
//! tick_interval_ms = 50
//! walk_speed = 5
//! fall_speed = 20
//! jump_x_speed = 10
//! jump_y_speed = 5
//! seed = 42
//!
//! [gesture]
//! touch_slop = 8.0
//! long_press_timeout_ms = 500
//! settle_duration_ms = 1000
//! settle_frame_interval_ms = 16
//! fling_factor = 100.0
//! min_fling_velocity = 50.0
//! max_fling_velocity = 8000.0
//! estimate_fling = true
//!
//! [display]
//! sprite_size_dp = 60
//! density = 2.75
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::DEFAULT_SETTLE_DURATION;
use crate::gesture::GestureTuning;
use crate::motion::MotionTuning;

/// Default motion tick period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);
/// Default spacing between return-to-ground frames (about 60 fps)
pub const DEFAULT_SETTLE_FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Default sprite edge length in density-independent pixels
pub const DEFAULT_SPRITE_SIZE_DP: u32 = 60;
/// Default display density (px per dp)
pub const DEFAULT_DENSITY: f32 = 1.0;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Motion section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionToml {
    /// Tick period in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Horizontal walk step per tick
    pub walk_speed: Option<i32>,

    /// Vertical descent step per tick
    pub fall_speed: Option<i32>,

    /// Horizontal jump/climb step per tick
    pub jump_x_speed: Option<i32>,

    /// Vertical jump/climb step per tick
    pub jump_y_speed: Option<i32>,

    /// Seed for the decision rolls (unseeded when absent)
    pub seed: Option<u64>,
}

/// Gesture section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureToml {
    /// Movement in px before a press becomes a drag
    pub touch_slop: Option<f32>,

    /// Long-press timeout in milliseconds
    pub long_press_timeout_ms: Option<u64>,

    /// Return-to-ground duration in milliseconds
    pub settle_duration_ms: Option<u64>,

    /// Return-to-ground frame spacing in milliseconds
    pub settle_frame_interval_ms: Option<u64>,

    /// Fling velocity divisor
    pub fling_factor: Option<f32>,

    /// Minimum estimated fling speed in px/s
    pub min_fling_velocity: Option<f32>,

    /// Maximum fling speed per axis in px/s
    pub max_fling_velocity: Option<f32>,

    /// Estimate flings when the platform reports none
    pub estimate_fling: Option<bool>,
}

/// Display section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToml {
    /// Sprite edge length in dp
    pub sprite_size_dp: Option<u32>,

    /// Pixels per dp
    pub density: Option<f32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetToml {
    /// Motion configuration section
    pub motion: MotionToml,

    /// Gesture configuration section
    pub gesture: GestureToml,

    /// Display configuration section
    pub display: DisplayToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved pet configuration
///
/// Use [`load_config`] to load it with proper priority handling.
#[derive(Clone, Debug)]
pub struct PetConfig {
    /// Motion tick period
    pub tick_interval: Duration,

    /// Per-tick speeds
    pub motion: MotionTuning,

    /// Seed for the decision rolls
    pub seed: Option<u64>,

    /// Gesture thresholds
    pub gesture: GestureTuning,

    /// Return-to-ground duration
    pub settle_duration: Duration,

    /// Return-to-ground frame spacing
    pub settle_frame_interval: Duration,

    /// Sprite edge length in dp
    pub sprite_size_dp: u32,

    /// Pixels per dp
    pub density: f32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            motion: MotionTuning::default(),
            seed: None,
            gesture: GestureTuning::default(),
            settle_duration: DEFAULT_SETTLE_DURATION,
            settle_frame_interval: DEFAULT_SETTLE_FRAME_INTERVAL,
            sprite_size_dp: DEFAULT_SPRITE_SIZE_DP,
            density: DEFAULT_DENSITY,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl PetConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Sprite edge length in physical pixels
    #[must_use]
    pub fn sprite_px(&self) -> i32 {
        (self.sprite_size_dp as f32 * self.density).round() as i32
    }

    /// Reject values the session cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.tick_interval.is_zero() {
            return invalid("tick_interval_ms must be greater than zero");
        }
        if self.settle_frame_interval.is_zero() {
            return invalid("settle_frame_interval_ms must be greater than zero");
        }
        let m = self.motion;
        if m.walk_speed <= 0 || m.fall_speed <= 0 || m.jump_x_speed <= 0 || m.jump_y_speed <= 0 {
            return invalid("motion speeds must be positive");
        }
        let g = self.gesture;
        if !g.touch_slop.is_finite() || g.touch_slop < 0.0 {
            return invalid("touch_slop must be a non-negative number");
        }
        if !g.fling_factor.is_finite() || g.fling_factor <= 0.0 {
            return invalid("fling_factor must be positive");
        }
        if g.min_fling_velocity < 0.0 || g.min_fling_velocity > g.max_fling_velocity {
            return invalid("fling velocities must satisfy 0 <= min <= max");
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return invalid("density must be positive");
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/desktop-pet/pet.toml` or
/// `~/.config/desktop-pet/pet.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("desktop-pet").join("pet.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<PetConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// With `None`, only defaults and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the result is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PetConfig, ConfigError> {
    let mut config = PetConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: PetToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut PetConfig, toml: &PetToml) {
    let motion = &toml.motion;
    if let Some(ms) = motion.tick_interval_ms {
        config.tick_interval = Duration::from_millis(ms);
    }
    if let Some(speed) = motion.walk_speed {
        config.motion.walk_speed = speed;
    }
    if let Some(speed) = motion.fall_speed {
        config.motion.fall_speed = speed;
    }
    if let Some(speed) = motion.jump_x_speed {
        config.motion.jump_x_speed = speed;
    }
    if let Some(speed) = motion.jump_y_speed {
        config.motion.jump_y_speed = speed;
    }
    if motion.seed.is_some() {
        config.seed = motion.seed;
    }

    let gesture = &toml.gesture;
    if let Some(slop) = gesture.touch_slop {
        config.gesture.touch_slop = slop;
    }
    if let Some(ms) = gesture.long_press_timeout_ms {
        config.gesture.long_press_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = gesture.settle_duration_ms {
        config.settle_duration = Duration::from_millis(ms);
    }
    if let Some(ms) = gesture.settle_frame_interval_ms {
        config.settle_frame_interval = Duration::from_millis(ms);
    }
    if let Some(factor) = gesture.fling_factor {
        config.gesture.fling_factor = factor;
    }
    if let Some(v) = gesture.min_fling_velocity {
        config.gesture.min_fling_velocity = v;
    }
    if let Some(v) = gesture.max_fling_velocity {
        config.gesture.max_fling_velocity = v;
    }
    if let Some(enabled) = gesture.estimate_fling {
        config.gesture.estimate_fling = enabled;
    }

    if let Some(dp) = toml.display.sprite_size_dp {
        config.sprite_size_dp = dp;
    }
    if let Some(density) = toml.display.density {
        config.density = density;
    }
}

/// Apply `PET_*` overrides read through `lookup`
///
/// Unparseable values are logged and skipped.
fn apply_env_config<F>(config: &mut PetConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    fn parsed<T: std::str::FromStr>(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
        let raw = lookup(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
                None
            }
        }
    }

    let lookup: &dyn Fn(&str) -> Option<String> = &lookup;
    let mut touched = false;

    if let Some(ms) = parsed::<u64>(lookup, "PET_TICK_INTERVAL_MS") {
        config.tick_interval = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(speed) = parsed::<i32>(lookup, "PET_WALK_SPEED") {
        config.motion.walk_speed = speed;
        touched = true;
    }
    if let Some(speed) = parsed::<i32>(lookup, "PET_FALL_SPEED") {
        config.motion.fall_speed = speed;
        touched = true;
    }
    if let Some(speed) = parsed::<i32>(lookup, "PET_JUMP_X_SPEED") {
        config.motion.jump_x_speed = speed;
        touched = true;
    }
    if let Some(speed) = parsed::<i32>(lookup, "PET_JUMP_Y_SPEED") {
        config.motion.jump_y_speed = speed;
        touched = true;
    }
    if let Some(seed) = parsed::<u64>(lookup, "PET_SEED") {
        config.seed = Some(seed);
        touched = true;
    }
    if let Some(ms) = parsed::<u64>(lookup, "PET_LONG_PRESS_MS") {
        config.gesture.long_press_timeout = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(ms) = parsed::<u64>(lookup, "PET_SETTLE_DURATION_MS") {
        config.settle_duration = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(ms) = parsed::<u64>(lookup, "PET_SETTLE_FRAME_INTERVAL_MS") {
        config.settle_frame_interval = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(slop) = parsed::<f32>(lookup, "PET_TOUCH_SLOP") {
        config.gesture.touch_slop = slop;
        touched = true;
    }
    if let Some(factor) = parsed::<f32>(lookup, "PET_FLING_FACTOR") {
        config.gesture.fling_factor = factor;
        touched = true;
    }
    if let Some(v) = parsed::<f32>(lookup, "PET_MIN_FLING_VELOCITY") {
        config.gesture.min_fling_velocity = v;
        touched = true;
    }
    if let Some(v) = parsed::<f32>(lookup, "PET_MAX_FLING_VELOCITY") {
        config.gesture.max_fling_velocity = v;
        touched = true;
    }
    if let Some(dp) = parsed::<u32>(lookup, "PET_SPRITE_SIZE_DP") {
        config.sprite_size_dp = dp;
        touched = true;
    }
    if let Some(density) = parsed::<f32>(lookup, "PET_DENSITY") {
        config.density = density;
        touched = true;
    }
    if let Some(raw) = lookup("PET_ESTIMATE_FLING") {
        config.gesture.estimate_fling = raw != "0" && !raw.eq_ignore_ascii_case("false");
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Tick interval override (milliseconds)
    pub tick_interval_ms: Option<u64>,

    /// Decision seed override
    pub seed: Option<u64>,

    /// Sprite size override (dp)
    pub sprite_size_dp: Option<u32>,

    /// Density override
    pub density: Option<f32>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tick interval override
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = Some(ms);
        self
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set sprite size override
    #[must_use]
    pub fn with_sprite_size_dp(mut self, dp: u32) -> Self {
        self.sprite_size_dp = Some(dp);
        self
    }

    /// Set density override
    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = Some(density);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut PetConfig) {
        if self.tick_interval_ms.is_some()
            || self.seed.is_some()
            || self.sprite_size_dp.is_some()
            || self.density.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.tick_interval_ms {
            config.tick_interval = Duration::from_millis(ms);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(dp) = self.sprite_size_dp {
            config.sprite_size_dp = dp;
        }
        if let Some(density) = self.density {
            config.density = density;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
