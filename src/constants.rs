// SPDX-License-Identifier: GPL-3.0-only

//! Default thresholds and calibration constants
//!
//! These are hand-tuned values carried over from field use. They are the
//! defaults of [`crate::config::Config`] and can all be overridden there.

/// Exposure analysis defaults (8-bit luma scale)
pub mod exposure {
    /// Lower bound of the acceptable mean brightness band
    pub const TARGET_MEAN_MIN: f32 = 90.0;
    /// Upper bound of the acceptable mean brightness band
    pub const TARGET_MEAN_MAX: f32 = 180.0;
    /// Samples at or above this are white-clipped
    pub const WHITE_CLIP_LEVEL: u8 = 250;
    /// Samples at or below this are black-clipped
    pub const BLACK_CLIP_LEVEL: u8 = 5;
    /// Samples at or above this count as specular highlights
    pub const SPECULAR_LEVEL: u8 = 245;
    /// Maximum white- or black-clipped share, in percent
    pub const MAX_CLIP_PCT: f32 = 1.0;
    /// Maximum specular share, in percent
    pub const MAX_SPECULAR_PCT: f32 = 0.2;
}

/// Sharpness analysis defaults
pub mod sharpness {
    /// Minimum noise-normalized Laplacian variance
    pub const MIN_SHARP_SCORE: f32 = 8.0;
    /// Neighbor distance for the discrete Laplacian, in pixels
    pub const LAPLACIAN_LAG: u32 = 10;
    /// Neighbor distance for the noise estimate, in pixels
    pub const NOISE_OFFSET: u32 = 2;
}

/// Motion analysis defaults
pub mod motion {
    /// Maximum mean absolute difference between consecutive signatures
    pub const MAX_MOTION_MAD: f32 = 10.0;
    /// Grid spacing of the motion signature, in pixels
    pub const SIGNATURE_GRID: u32 = 16;
}

/// Region sampling defaults
pub mod sampling {
    /// Fraction of width/height trimmed from each side to form the ROI
    pub const ROI_INSET: f32 = 0.25;
    /// Sampling stride of the exposure pass
    pub const EXPOSURE_STEP: u32 = 4;
    /// Sampling stride of the sharpness pass (coarser than exposure)
    pub const SHARPNESS_STEP: u32 = 8;
}

/// Consecutive passing frames required before the gate reports stable
pub const STREAK_REQUIRED: u32 = 12;

/// Safety margin subtracted from the frame period when capping shutter time
pub const SHUTTER_MARGIN_NS: i64 = 1_000_000;

/// Nanoseconds per second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Default video frame rate the shutter ceiling is derived from
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
