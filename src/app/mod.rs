// SPDX-License-Identifier: GPL-3.0-only

//! Application layer
//!
//! - `frame_processor`: per-frame quality analysis and the stability gate
//! - `session`: per-camera controller tying analysis and capture controls
//!   together

pub mod frame_processor;
pub mod session;

pub use session::{CaptureMetadata, CaptureSession};
