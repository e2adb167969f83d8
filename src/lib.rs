// SPDX-License-Identifier: GPL-3.0-only

//! Photogrammetry capture core
//!
//! Decides frame by frame whether exposure, sharpness and stillness are good
//! enough to take a photo, and drives the sensor into a locked manual state
//! on hardware that may silently refuse manual controls.
//!
//! # Architecture
//!
//! - [`app`]: frame analysis, quality gate and the per-session controller
//! - [`backends`]: capture-request model, parameter mapping, tiered control
//!   negotiation, white-balance freeze and a virtual camera
//! - [`config`]: tunable thresholds and sampling parameters
//! - [`errors`]: error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use pgcapture::{CaptureSession, Config, LumaFrame};
//! use pgcapture::backends::virtual_camera::{RejectionRules, VirtualCamera};
//!
//! let caps = VirtualCamera::sample_capabilities();
//! let mut camera = VirtualCamera::new(caps.clone(), RejectionRules::default());
//! let mut session = CaptureSession::new(&Config::default(), caps);
//! session.set_lock_mode(true, &mut camera).ok();
//!
//! let pixels = vec![128u8; 640 * 480];
//! let frame = LumaFrame::packed(&pixels, 640, 480).unwrap();
//! if let Some(verdict) = session.analyze_frame(&frame) {
//!     println!("{}", verdict.status());
//! }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used types
pub use app::frame_processor::{FrameAnalyzer, LumaFrame, QualityStatus, QualityVerdict};
pub use app::{CaptureMetadata, CaptureSession};
pub use backends::camera::{
    AppliedCaptureState, CancelToken, CaptureTier, ControlApplier, ControlNegotiator,
    HardwareCapabilities, ParameterMapper, RequestedParams, Setpoint, WhiteBalanceFreezer,
    compute_max_shutter_for_fps, map_normalized_to_native,
};
pub use config::Config;
pub use errors::{AppError, AppResult, ControlError, ControlRejection, FrameError};
