// SPDX-License-Identifier: GPL-3.0-only

//! Camera-shake detection
//!
//! The ROI is subsampled on a coarse grid into a "motion signature". Shake
//! shows up as a large mean absolute difference between consecutive
//! signatures, without any optical flow.

use super::region::SampleGrid;
use crate::app::frame_processor::types::LumaFrame;

/// Holds the previous frame's signature between calls
///
/// Both signature buffers are reused, so steady-state analysis does not
/// allocate.
#[derive(Debug, Default)]
pub struct MotionEstimator {
    previous: Vec<u8>,
    previous_shape: Option<(u32, u32)>,
    current: Vec<u8>,
}

impl MotionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample the current signature and compare it to the previous one
    ///
    /// Returns `None` when there is nothing comparable: first frame after a
    /// reset, a grid shape change (resolution switch) or an empty grid. The
    /// current signature replaces the previous one in every case.
    pub fn update(&mut self, frame: &LumaFrame<'_>, grid: &SampleGrid) -> Option<f32> {
        self.current.clear();
        self.current.extend(grid.points().map(|(x, y)| frame.at(x, y)));
        let shape = grid.shape();

        let mad = match self.previous_shape {
            Some(prev) if prev == shape && !self.current.is_empty() => {
                let total: u64 = self
                    .previous
                    .iter()
                    .zip(&self.current)
                    .map(|(&a, &b)| a.abs_diff(b) as u64)
                    .sum();
                Some(total as f32 / self.current.len() as f32)
            }
            _ => None,
        };

        std::mem::swap(&mut self.previous, &mut self.current);
        self.previous_shape = Some(shape);
        mad
    }

    /// Forget the stored signature
    pub fn reset(&mut self) {
        self.previous.clear();
        self.previous_shape = None;
    }

    pub fn has_signature(&self) -> bool {
        self.previous_shape.is_some()
    }
}

/// Unknown motion fails closed
pub fn motion_ok(mad: Option<f32>, max_motion_mad: f32) -> bool {
    matches!(mad, Some(m) if m < max_motion_mad)
}
