// SPDX-License-Identifier: GPL-3.0-only

//! Capture-request model
//!
//! A [`CaptureRequest`] is always built completely before it is handed to the
//! hardware, so a rejected or abandoned request never leaves a half-applied
//! set of controls behind.

use super::types::{FpsRange, HardwareCapabilities, WhiteBalanceFreeze};
use serde::{Deserialize, Serialize};

/// Exposure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposureMode {
    /// Automatic exposure (AE enabled)
    Auto,
    /// Manual exposure (AE disabled, ISO and exposure time set explicitly)
    Manual,
}

/// Autofocus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfMode {
    /// Autofocus disabled, lens held at an explicit focus distance
    Manual,
    /// Continuous autofocus for still capture
    Continuous,
}

/// Auto white balance mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwbMode {
    Auto,
    /// AWB disabled; colour correction comes from the request
    Off,
}

/// One complete set of controls to submit to the hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub ae_mode: ExposureMode,
    pub af_mode: AfMode,
    pub awb_mode: AwbMode,
    /// Explicit AWB lock value; `None` leaves the control unset
    pub awb_lock: Option<bool>,
    pub sensitivity_iso: Option<i32>,
    pub exposure_time_ns: Option<i64>,
    pub frame_duration_ns: Option<i64>,
    pub focus_distance_diopters: Option<f32>,
    pub target_fps_range: Option<FpsRange>,
    /// Fixed gains and transform; only meaningful with [`AwbMode::Off`]
    pub color_correction: Option<WhiteBalanceFreeze>,
    pub flash_off: bool,
}

impl CaptureRequest {
    /// Pure auto exposure, continuous autofocus and auto white balance
    ///
    /// Leaves every optional control unset so any compliant device accepts it.
    pub fn full_auto(capabilities: &HardwareCapabilities) -> Self {
        Self {
            ae_mode: ExposureMode::Auto,
            af_mode: AfMode::Continuous,
            awb_mode: AwbMode::Auto,
            awb_lock: capabilities.supports_awb_lock.then_some(false),
            sensitivity_iso: None,
            exposure_time_ns: None,
            frame_duration_ns: None,
            focus_distance_diopters: None,
            target_fps_range: None,
            color_correction: None,
            flash_off: false,
        }
    }

    /// Use frozen white balance if there is one, else run AWB in auto
    pub fn with_white_balance(
        mut self,
        frozen: Option<&WhiteBalanceFreeze>,
        capabilities: &HardwareCapabilities,
    ) -> Self {
        match frozen {
            Some(wb) => {
                self.awb_mode = AwbMode::Off;
                self.awb_lock = None;
                self.color_correction = Some(*wb);
            }
            None => {
                self.awb_mode = AwbMode::Auto;
                self.awb_lock = capabilities.supports_awb_lock.then_some(false);
                self.color_correction = None;
            }
        }
        self
    }

    /// Control combinations some hardware silently rejects
    ///
    /// Disabled auto exposure is never paired with a forced AE target fps
    /// range, and colour correction is only sent with AWB off.
    pub fn is_consistent(&self) -> bool {
        let fps_with_manual_ae =
            self.ae_mode == ExposureMode::Manual && self.target_fps_range.is_some();
        let cc_with_auto_awb = self.awb_mode == AwbMode::Auto && self.color_correction.is_some();
        !fps_with_manual_ae && !cc_with_auto_awb
    }
}
