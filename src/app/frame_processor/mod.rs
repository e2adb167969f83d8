// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor module for per-frame quality analysis
//!
//! Frames flow through the region sampler into the exposure, sharpness and
//! motion estimators; their pass/fail results feed the stability gate.
//!
//! ```text
//! LumaFrame ─► RoiBounds ─┬─► exposure  ─┐
//!                         ├─► sharpness ─┼─► QualityGate ─► QualityVerdict
//!                         └─► motion    ─┘
//! ```

pub mod analyzer;
pub mod quality_gate;
pub mod tasks;
pub mod types;

pub use analyzer::FrameAnalyzer;
pub use quality_gate::{FrameChecks, QualityGate};
pub use tasks::region::{RoiBounds, SampleGrid};
pub use types::{GateState, LumaFrame, QualityStatus, QualityVerdict, RoiStats};
