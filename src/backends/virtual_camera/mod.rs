// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera device
//!
//! A simulated sensor that accepts or rejects capture requests according to
//! configurable rules and produces a synthetic capture-result stream. Auto
//! white balance searches for a fixed number of frames before reporting
//! convergence, which is enough to drive the freeze protocol end to end.
//!
//! ```text
//! CaptureRequest ──▶ RejectionRules ──reject──▶ ControlRejection
//!                         │
//!                      accept
//!                         ▼
//!                  active request ──▶ next_result() ──▶ CaptureResult
//! ```

mod file_source;

pub use file_source::{OwnedLumaFrame, is_image_extension, load_luma_frame};

use crate::backends::camera::{
    AeState, AfMode, AfState, AwbMode, AwbState, CaptureRequest, CaptureResult, ColorGains,
    ColorTransform, ControlApplier, ExposureMode, FpsRange, HardwareCapabilities, ValueRange,
};
use crate::errors::ControlRejection;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Frames AWB spends searching after it is (re)started in auto
pub const AWB_CONVERGENCE_FRAMES: u32 = 5;

/// Gains the simulated AWB settles on
pub const CONVERGED_GAINS: ColorGains = ColorGains {
    red: 1.95,
    green_even: 1.0,
    green_odd: 1.0,
    blue: 1.62,
};

const AUTO_ISO: i32 = 400;
const AUTO_EXPOSURE_NS: i64 = 16_666_666;
const AUTO_FOCUS_DIOPTERS: f32 = 2.0;

/// Which requests the simulated hardware refuses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionRules {
    /// Reject any request with auto exposure off
    pub manual_exposure: bool,
    /// Reject any request with autofocus off
    pub manual_focus: bool,
    /// Reject everything, including full auto
    pub everything: bool,
}

#[derive(Debug, Clone)]
pub struct VirtualCamera {
    capabilities: HardwareCapabilities,
    rules: RejectionRules,
    history: Vec<CaptureRequest>,
    active: Option<CaptureRequest>,
    frame_number: u64,
    awb_frames: u32,
}

impl VirtualCamera {
    pub fn new(capabilities: HardwareCapabilities, rules: RejectionRules) -> Self {
        Self {
            capabilities,
            rules,
            history: Vec::new(),
            active: None,
            frame_number: 0,
            awb_frames: 0,
        }
    }

    /// A typical phone main camera with full manual support
    pub fn sample_capabilities() -> HardwareCapabilities {
        HardwareCapabilities {
            iso_range: Some(ValueRange::new(50, 3200)),
            exposure_range_ns: Some(ValueRange::new(100_000, 500_000_000)),
            min_focus_distance: Some(10.0),
            supports_manual_sensor: true,
            supports_awb_lock: true,
            fps_ranges: vec![
                FpsRange::new(15, 30),
                FpsRange::fixed(30),
                FpsRange::new(7, 60),
            ],
        }
    }

    pub fn capabilities(&self) -> &HardwareCapabilities {
        &self.capabilities
    }

    /// Every request submitted, accepted or not
    pub fn history(&self) -> &[CaptureRequest] {
        &self.history
    }

    pub fn active_request(&self) -> Option<&CaptureRequest> {
        self.active.as_ref()
    }

    /// Result record for the next frame under the active request
    pub fn next_result(&mut self) -> CaptureResult {
        self.frame_number += 1;
        let Some(request) = self.active.as_ref() else {
            return CaptureResult {
                frame_number: Some(self.frame_number),
                ..Default::default()
            };
        };

        let manual_ae = request.ae_mode == ExposureMode::Manual;
        let (awb_state, gains, transform) = match (request.awb_mode, request.color_correction) {
            (AwbMode::Off, Some(wb)) => (AwbState::Inactive, wb.gains, wb.transform),
            _ => {
                self.awb_frames = self.awb_frames.saturating_add(1);
                let state = if self.awb_frames >= AWB_CONVERGENCE_FRAMES {
                    AwbState::Converged
                } else {
                    AwbState::Searching
                };
                (state, CONVERGED_GAINS, identity())
            }
        };

        CaptureResult {
            frame_number: Some(self.frame_number),
            iso: Some(request.sensitivity_iso.filter(|_| manual_ae).unwrap_or(AUTO_ISO)),
            exposure_time_ns: Some(
                request
                    .exposure_time_ns
                    .filter(|_| manual_ae)
                    .unwrap_or(AUTO_EXPOSURE_NS),
            ),
            focus_distance_diopters: Some(match request.af_mode {
                AfMode::Manual => request.focus_distance_diopters.unwrap_or(0.0),
                AfMode::Continuous => AUTO_FOCUS_DIOPTERS,
            }),
            ae_state: Some(if manual_ae {
                AeState::Inactive
            } else {
                AeState::Converged
            }),
            af_state: Some(match request.af_mode {
                AfMode::Manual => AfState::Idle,
                AfMode::Continuous => AfState::Focused,
            }),
            awb_state: Some(awb_state),
            color_gains: Some(gains),
            color_transform: Some(transform),
        }
    }

    fn check(&self, request: &CaptureRequest) -> Result<(), ControlRejection> {
        if self.rules.everything {
            return Err(ControlRejection::new("camera device error"));
        }
        if !request.is_consistent() {
            return Err(ControlRejection::new("inconsistent control combination"));
        }
        if self.rules.manual_exposure && request.ae_mode == ExposureMode::Manual {
            return Err(ControlRejection::new("manual exposure not supported"));
        }
        if self.rules.manual_focus && request.af_mode == AfMode::Manual {
            return Err(ControlRejection::new("manual focus not supported"));
        }
        Ok(())
    }
}

impl ControlApplier for VirtualCamera {
    fn apply(&mut self, request: &CaptureRequest) -> Result<(), ControlRejection> {
        self.history.push(request.clone());
        self.check(request)?;

        // AWB restarts its search whenever it is switched back to auto
        let awb_was_auto = self
            .active
            .as_ref()
            .is_some_and(|r| r.awb_mode == AwbMode::Auto);
        if request.awb_mode == AwbMode::Auto && !awb_was_auto {
            self.awb_frames = 0;
        }

        debug!(ae = ?request.ae_mode, af = ?request.af_mode, awb = ?request.awb_mode, "Virtual camera accepted request");
        self.active = Some(request.clone());
        Ok(())
    }
}

fn identity() -> ColorTransform {
    ColorTransform([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
}
