// SPDX-License-Identifier: GPL-3.0-only

//! Tunable configuration
//!
//! All quality thresholds are empirical and device dependent, so every one of
//! them can be overridden from a JSON file. Missing keys take the defaults in
//! [`crate::constants`].

use crate::constants::{self, exposure, motion, sampling, sharpness};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-frame quality thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Acceptable mean brightness band, inclusive
    pub mean_min: f32,
    pub mean_max: f32,
    /// Clipping and specular levels
    pub white_clip_level: u8,
    pub black_clip_level: u8,
    pub specular_level: u8,
    /// Maximum white- and black-clipped share, percent
    pub max_clip_pct: f32,
    /// Maximum specular share, percent
    pub max_specular_pct: f32,
    /// Minimum noise-normalized sharpness score
    pub min_sharp_score: f32,
    /// Maximum frame-to-frame motion MAD
    pub max_motion_mad: f32,
    /// Passing frames in a row before the gate reports stable
    pub streak_required: u32,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            mean_min: exposure::TARGET_MEAN_MIN,
            mean_max: exposure::TARGET_MEAN_MAX,
            white_clip_level: exposure::WHITE_CLIP_LEVEL,
            black_clip_level: exposure::BLACK_CLIP_LEVEL,
            specular_level: exposure::SPECULAR_LEVEL,
            max_clip_pct: exposure::MAX_CLIP_PCT,
            max_specular_pct: exposure::MAX_SPECULAR_PCT,
            min_sharp_score: sharpness::MIN_SHARP_SCORE,
            max_motion_mad: motion::MAX_MOTION_MAD,
            streak_required: constants::STREAK_REQUIRED,
        }
    }
}

/// Region-of-interest sampling geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Fraction trimmed from each side of the frame, in [0, 0.5)
    pub roi_inset: f32,
    pub exposure_step: u32,
    pub sharpness_step: u32,
    pub laplacian_lag: u32,
    pub noise_offset: u32,
    pub motion_grid: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            roi_inset: sampling::ROI_INSET,
            exposure_step: sampling::EXPOSURE_STEP,
            sharpness_step: sampling::SHARPNESS_STEP,
            laplacian_lag: sharpness::LAPLACIAN_LAG,
            noise_offset: sharpness::NOISE_OFFSET,
            motion_grid: motion::SIGNATURE_GRID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub quality: QualityThresholds,
    pub sampling: SamplingConfig,
    /// Margin kept between the longest shutter and the frame period
    pub shutter_margin_ns: i64,
    /// Frame rate the video shutter ceiling is computed for
    pub target_fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: QualityThresholds::default(),
            sampling: SamplingConfig::default(),
            shutter_margin_ns: constants::SHUTTER_MARGIN_NS,
            target_fps: constants::DEFAULT_TARGET_FPS,
        }
    }
}

impl Config {
    /// `<config dir>/pgcapture/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pgcapture").join("config.json"))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load an explicit path, or the default path if it exists, or defaults
    ///
    /// An explicitly given path that cannot be read is an error. A missing
    /// default file is not.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            Some(default) => {
                debug!(path = %default.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            None => {
                warn!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the analyzers cannot work with
    pub fn validate(&self) -> AppResult<()> {
        let q = &self.quality;
        let s = &self.sampling;

        if !(q.mean_min <= q.mean_max) {
            return Err(AppError::Config(format!(
                "brightness band is inverted: [{}, {}]",
                q.mean_min, q.mean_max
            )));
        }
        if q.streak_required == 0 {
            return Err(AppError::Config("streak_required must be at least 1".into()));
        }
        if !(0.0..0.5).contains(&s.roi_inset) {
            return Err(AppError::Config(format!(
                "roi_inset must be in [0, 0.5), got {}",
                s.roi_inset
            )));
        }
        if s.exposure_step == 0 || s.sharpness_step == 0 || s.motion_grid == 0 {
            return Err(AppError::Config("sampling steps must be non-zero".into()));
        }
        if s.laplacian_lag == 0 || s.noise_offset == 0 {
            return Err(AppError::Config(
                "laplacian_lag and noise_offset must be non-zero".into(),
            ));
        }
        if self.shutter_margin_ns < 0 {
            return Err(AppError::Config("shutter_margin_ns must not be negative".into()));
        }
        if self.target_fps == 0 {
            return Err(AppError::Config("target_fps must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "quality": { "min_sharp_score": 12.5 } }"#).unwrap();
        assert_eq!(config.quality.min_sharp_score, 12.5);
        assert_eq!(config.quality.streak_required, 12);
        assert_eq!(config.sampling, SamplingConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let mut config = Config::default();
        config.sampling.sharpness_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let mut config = Config::default();
        config.quality.mean_min = 200.0;
        assert!(config.validate().is_err());
    }
}
