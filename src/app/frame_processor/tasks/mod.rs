// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis tasks
//!
//! One module per estimator, plus the shared ROI sampler.

pub mod exposure;
pub mod motion;
pub mod region;
pub mod sharpness;

pub use exposure::ExposureStats;
pub use motion::MotionEstimator;
pub use sharpness::SharpnessStats;
