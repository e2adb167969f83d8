// SPDX-License-Identifier: GPL-3.0-only

//! Capture parameter mapping
//!
//! Converts slider positions (`t` in `[0, 1]`) and stored calibration values
//! into device-native units, clamped against the ranges the hardware reports.
//! Everything here is pure: the same inputs always give the same values.

use super::types::{FpsRange, HardwareCapabilities, ValueRange};
use crate::constants::{NANOS_PER_SECOND, SHUTTER_MARGIN_NS};
use serde::{Deserialize, Serialize};

/// Device-native unit a normalized value can be mapped into
///
/// The control kind is carried by the type: ISO is `i32`, exposure time is
/// `i64` nanoseconds, focus distance is `f32` diopters.
pub trait NativeUnit: Copy + PartialOrd {
    fn to_f64(self) -> f64;
    fn from_f64(value: f64) -> Self;
}

impl NativeUnit for i32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }
}

impl NativeUnit for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i64
    }
}

impl NativeUnit for f32 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

/// Linear interpolation of `t` across `range`, clamped to the range
///
/// `t` outside `[0, 1]` is clamped first; a non-finite `t` maps to the lower
/// bound.
pub fn map_normalized_to_native<T: NativeUnit>(t: f32, range: ValueRange<T>) -> T {
    let (lo, hi) = range.ordered();
    if !t.is_finite() || t <= 0.0 {
        return lo;
    }
    if t >= 1.0 {
        return hi;
    }

    let value = lo.to_f64() + (hi.to_f64() - lo.to_f64()) * t as f64;
    range.clamp(T::from_f64(value))
}

/// Inverse of [`map_normalized_to_native`]; a zero-width range maps to 0
pub fn native_to_normalized<T: NativeUnit>(value: T, range: ValueRange<T>) -> f32 {
    let (lo, hi) = range.ordered();
    let span = hi.to_f64() - lo.to_f64();
    if span <= 0.0 || !span.is_finite() {
        return 0.0;
    }

    let t = (value.to_f64() - lo.to_f64()) / span;
    if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 }
}

/// Clamp to the reported range, or pass through unchanged when the device
/// reported none
pub fn clamp_native<T: NativeUnit>(value: T, range: Option<ValueRange<T>>) -> T {
    match range {
        Some(range) => range.clamp(value),
        None => value,
    }
}

/// Frame period for `fps`; zero is treated as 1 fps
pub fn frame_duration_ns(fps: u32) -> i64 {
    NANOS_PER_SECOND / fps.max(1) as i64
}

/// Longest exposure that still fits within one frame period at `fps`,
/// keeping the default 1 ms margin
pub fn compute_max_shutter_for_fps(fps: u32) -> i64 {
    max_shutter_for_fps(fps, SHUTTER_MARGIN_NS)
}

/// Longest exposure that fits within one frame period, never negative
pub fn max_shutter_for_fps(fps: u32, margin_ns: i64) -> i64 {
    (frame_duration_ns(fps) - margin_ns.max(0)).max(0)
}

/// A requested control value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Setpoint<T> {
    /// Slider position in `[0, 1]`
    Normalized(f32),
    /// Value already in device units, e.g. a stored calibration
    Native(T),
}

/// Manual parameters asked for by the UI or a stored calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedParams {
    pub iso: Option<Setpoint<i32>>,
    pub exposure_time_ns: Option<Setpoint<i64>>,
    pub focus_diopters: Option<Setpoint<f32>>,
    pub target_fps: u32,
}

impl Default for RequestedParams {
    fn default() -> Self {
        Self {
            iso: None,
            exposure_time_ns: None,
            focus_diopters: None,
            target_fps: crate::constants::DEFAULT_TARGET_FPS,
        }
    }
}

/// Requested parameters in device units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResolvedParams {
    pub iso: Option<i32>,
    pub exposure_time_ns: Option<i64>,
    pub focus_diopters: Option<f32>,
    pub frame_duration_ns: i64,
    pub max_exposure_ns: i64,
}

impl ResolvedParams {
    /// Whether the exposure is known to fit within one frame period
    pub fn exposure_fits_frame(&self) -> bool {
        matches!(self.exposure_time_ns, Some(e) if e <= self.max_exposure_ns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterMapper {
    margin_ns: i64,
}

impl Default for ParameterMapper {
    fn default() -> Self {
        Self::new(SHUTTER_MARGIN_NS)
    }
}

impl ParameterMapper {
    pub fn new(margin_ns: i64) -> Self {
        Self {
            margin_ns: margin_ns.max(0),
        }
    }

    pub fn margin_ns(&self) -> i64 {
        self.margin_ns
    }

    pub fn max_shutter_for_fps(&self, fps: u32) -> i64 {
        max_shutter_for_fps(fps, self.margin_ns)
    }

    /// `None` when a slider value has no reported range to map onto
    pub fn resolve_iso(
        &self,
        setpoint: Setpoint<i32>,
        capabilities: &HardwareCapabilities,
    ) -> Option<i32> {
        resolve(setpoint, capabilities.iso_range)
    }

    /// Exposure capped at the frame period for `fps`, then clamped again to
    /// the hardware range
    pub fn resolve_exposure(
        &self,
        setpoint: Setpoint<i64>,
        capabilities: &HardwareCapabilities,
        fps: u32,
    ) -> Option<i64> {
        let range = capabilities.exposure_range_ns?;
        let value = match setpoint {
            Setpoint::Normalized(t) => map_normalized_to_native(t, range),
            Setpoint::Native(ns) => ns,
        };
        Some(range.clamp(value.min(self.max_shutter_for_fps(fps))))
    }

    pub fn resolve_focus(
        &self,
        setpoint: Setpoint<f32>,
        capabilities: &HardwareCapabilities,
    ) -> Option<f32> {
        resolve(setpoint, capabilities.focus_range())
    }

    pub fn resolve_all(
        &self,
        requested: &RequestedParams,
        capabilities: &HardwareCapabilities,
    ) -> ResolvedParams {
        let fps = requested.target_fps;
        let exposure_time_ns = requested.exposure_time_ns.and_then(|sp| match sp {
            // No range: raw calibration value goes through untouched
            Setpoint::Native(ns) if capabilities.exposure_range_ns.is_none() => Some(ns),
            sp => self.resolve_exposure(sp, capabilities, fps),
        });

        ResolvedParams {
            iso: requested
                .iso
                .and_then(|sp| self.resolve_iso(sp, capabilities)),
            exposure_time_ns,
            focus_diopters: requested
                .focus_diopters
                .and_then(|sp| self.resolve_focus(sp, capabilities)),
            frame_duration_ns: frame_duration_ns(fps),
            max_exposure_ns: self.max_shutter_for_fps(fps),
        }
    }
}

fn resolve<T: NativeUnit>(setpoint: Setpoint<T>, range: Option<ValueRange<T>>) -> Option<T> {
    match setpoint {
        Setpoint::Normalized(t) => range.map(|range| map_normalized_to_native(t, range)),
        Setpoint::Native(value) => Some(clamp_native(value, range)),
    }
}

/// Narrowest advertised range containing `target`, else the one whose upper
/// bound is closest to it
pub fn choose_best_fps_range(ranges: &[FpsRange], target: u32) -> Option<FpsRange> {
    ranges
        .iter()
        .filter(|r| r.contains(target))
        .min_by_key(|r| r.span())
        .or_else(|| ranges.iter().min_by_key(|r| r.ordered().1.abs_diff(target)))
        .copied()
}

/// Stable frame rate for the automatic branch: fixed 30 fps if advertised,
/// else the narrowest range
pub fn preferred_auto_fps_range(ranges: &[FpsRange]) -> Option<FpsRange> {
    ranges
        .iter()
        .find(|r| **r == FpsRange::fixed(30))
        .or_else(|| ranges.iter().min_by_key(|r| r.span()))
        .copied()
}

/// Focus distance for display, converting diopters to centimetres
pub fn focus_distance_label(diopters: f32) -> String {
    if !diopters.is_finite() || diopters <= 0.0 {
        "Focus: ∞".to_string()
    } else {
        format!("Focus: {:.1} cm", 100.0 / diopters)
    }
}

pub fn shutter_label(exposure_ns: i64) -> String {
    format!("Shutter {:.3} ms", exposure_ns as f64 / 1_000_000.0)
}
