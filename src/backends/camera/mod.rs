// SPDX-License-Identifier: GPL-3.0-only

//! Capture-control backend
//!
//! Everything between a calibration request and the hardware:
//!
//! ```text
//! ┌─────────────────────┐
//! │  RequestedParams    │  ← sliders or stored calibration
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  ParameterMapper    │  ← normalized → native, shutter ceiling
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐       ┌──────────────────────┐
//! │  ControlNegotiator  │ ◀──── │ WhiteBalanceFreezer  │
//! └──────────┬──────────┘       └──────────▲───────────┘
//!            │                             │
//!            ▼                             │
//! ┌─────────────────────┐                  │
//! │ ControlApplier trait│ ──capture results┘
//! └─────────────────────┘
//! ```

pub mod controls;
pub mod mapper;
pub mod negotiator;
pub mod types;
pub mod wb_freezer;

pub use controls::{AfMode, AwbMode, CaptureRequest, ExposureMode};
pub use mapper::{
    ParameterMapper, RequestedParams, ResolvedParams, Setpoint, compute_max_shutter_for_fps,
    map_normalized_to_native, native_to_normalized,
};
pub use negotiator::{AppliedCaptureState, CancelToken, CaptureTier, ControlMode, ControlNegotiator};
pub use types::*;
pub use wb_freezer::{FreezeUpdate, WhiteBalanceFreezer};

use crate::errors::ControlRejection;

/// Submits one complete capture request to the hardware
///
/// Implemented by whatever binds the camera. The call blocks until the
/// hardware has accepted or rejected the request; a rejection must leave the
/// previously accepted request in effect.
pub trait ControlApplier {
    fn apply(&mut self, request: &CaptureRequest) -> Result<(), ControlRejection>;
}

impl<F> ControlApplier for F
where
    F: FnMut(&CaptureRequest) -> Result<(), ControlRejection>,
{
    fn apply(&mut self, request: &CaptureRequest) -> Result<(), ControlRejection> {
        self(request)
    }
}
