// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the capture-control layer

use serde::{Deserialize, Serialize};

/// Inclusive range reported by the hardware
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: Copy + PartialOrd> ValueRange<T> {
    /// Build a range, swapping the bounds if they arrive inverted
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { lower: b, upper: a }
        } else {
            Self { lower: a, upper: b }
        }
    }

    /// Smaller and larger bound, even if the fields were set inverted
    pub fn ordered(&self) -> (T, T) {
        if self.upper < self.lower {
            (self.upper, self.lower)
        } else {
            (self.lower, self.upper)
        }
    }

    pub fn contains(&self, value: T) -> bool {
        let (lo, hi) = self.ordered();
        value >= lo && value <= hi
    }

    pub fn clamp(&self, value: T) -> T {
        let (lo, hi) = self.ordered();
        if value < lo {
            lo
        } else if value > hi {
            hi
        } else {
            value
        }
    }
}

/// Advertised auto-exposure target frame-rate range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FpsRange {
    pub min: u32,
    pub max: u32,
}

impl FpsRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn fixed(fps: u32) -> Self {
        Self { min: fps, max: fps }
    }

    /// Smaller and larger bound; deserialized ranges may arrive inverted
    pub fn ordered(&self) -> (u32, u32) {
        (self.min.min(self.max), self.min.max(self.max))
    }

    pub fn contains(&self, fps: u32) -> bool {
        let (lo, hi) = self.ordered();
        lo <= fps && fps <= hi
    }

    pub fn span(&self) -> u32 {
        self.max.abs_diff(self.min)
    }
}

/// What the device reports about manual control support
///
/// Read once when the camera is bound and immutable for the session. Every
/// range is optional because devices omit optional characteristics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareCapabilities {
    pub iso_range: Option<ValueRange<i32>>,
    pub exposure_range_ns: Option<ValueRange<i64>>,
    /// Closest focus in diopters; 0 or absent means fixed focus
    pub min_focus_distance: Option<f32>,
    pub supports_manual_sensor: bool,
    pub supports_awb_lock: bool,
    pub fps_ranges: Vec<FpsRange>,
}

impl HardwareCapabilities {
    /// Focus range in diopters, `[0 (infinity), min_focus_distance]`
    pub fn focus_range(&self) -> Option<ValueRange<f32>> {
        match self.min_focus_distance {
            Some(mfd) if mfd.is_finite() && mfd > 0.0 => Some(ValueRange::new(0.0, mfd)),
            _ => None,
        }
    }
}

/// Autofocus state reported in capture results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AfState {
    #[default]
    Idle,
    Scanning,
    Focused,
    Failed,
}

/// Auto exposure state reported in capture results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AeState {
    #[default]
    Inactive,
    Searching,
    Converged,
    Locked,
}

/// Auto white balance state reported in capture results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AwbState {
    #[default]
    Inactive,
    Searching,
    Converged,
    Locked,
}

impl AwbState {
    /// AWB has settled on values worth freezing
    pub fn is_settled(self) -> bool {
        matches!(self, AwbState::Converged | AwbState::Locked)
    }
}

/// Per-channel white balance gains (Bayer RGGB order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorGains {
    pub red: f32,
    pub green_even: f32,
    pub green_odd: f32,
    pub blue: f32,
}

impl ColorGains {
    pub fn is_usable(&self) -> bool {
        [self.red, self.green_even, self.green_odd, self.blue]
            .iter()
            .all(|g| g.is_finite() && *g > 0.0)
    }
}

/// 3x3 colour correction matrix (row-major) from sensor RGB to output RGB
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorTransform(pub [[f32; 3]; 3]);

impl ColorTransform {
    pub fn is_usable(&self) -> bool {
        self.0.iter().flatten().all(|v| v.is_finite())
    }
}

/// White balance captured at AWB convergence and re-applied as fixed values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalanceFreeze {
    pub gains: ColorGains,
    pub transform: ColorTransform,
}

/// Completed-capture result record
///
/// Carries what the ISP actually applied for one frame. Fields the device
/// does not report stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    pub frame_number: Option<u64>,
    pub iso: Option<i32>,
    pub exposure_time_ns: Option<i64>,
    pub focus_distance_diopters: Option<f32>,
    pub ae_state: Option<AeState>,
    pub af_state: Option<AfState>,
    pub awb_state: Option<AwbState>,
    pub color_gains: Option<ColorGains>,
    pub color_transform: Option<ColorTransform>,
}

/// Post-application values read back from capture results
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReadback {
    pub iso: Option<i32>,
    pub exposure_time_ns: Option<i64>,
    pub focus_distance_diopters: Option<f32>,
}

impl SensorReadback {
    /// Take every value the result reports, keep the rest
    pub fn merge(&mut self, result: &CaptureResult) {
        if result.iso.is_some() {
            self.iso = result.iso;
        }
        if result.exposure_time_ns.is_some() {
            self.exposure_time_ns = result.exposure_time_ns;
        }
        if result.focus_distance_diopters.is_some() {
            self.focus_distance_diopters = result.focus_distance_diopters;
        }
    }
}
