// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame analysis results
//!
//! These types are produced once per analyzed frame and consumed by whatever
//! drives the shutter control and status text.

use crate::errors::FrameError;
use serde::Serialize;
use std::fmt;

/// Borrowed view over a single-channel 8-bit luma plane
///
/// The analyzer only reads from the view for the duration of one call and
/// never keeps the borrow, so callers can recycle the buffer as soon as
/// analysis returns.
#[derive(Debug, Clone, Copy)]
pub struct LumaFrame<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    stride: u32,
}

impl<'a> LumaFrame<'a> {
    /// Wrap a luma plane, checking that every row is backed by the buffer
    pub fn new(data: &'a [u8], width: u32, height: u32, stride: u32) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        if stride < width {
            return Err(FrameError::StrideTooSmall { stride, width });
        }

        let required = stride as usize * (height as usize - 1) + width as usize;
        if data.len() < required {
            return Err(FrameError::BufferTooSmall {
                len: data.len(),
                required,
            });
        }

        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Tightly packed plane (stride == width)
    pub fn packed(data: &'a [u8], width: u32, height: u32) -> Result<Self, FrameError> {
        Self::new(data, width, height, width)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Luma at (x, y); callers keep coordinates inside the frame
    #[inline]
    pub(crate) fn at(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.stride as usize + x as usize]
    }
}

/// Statistics measured over the region of interest of one frame
///
/// Percentages are of the sample count of the pass that produced them.
/// Values are `NaN` when the pass had no samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoiStats {
    pub mean: f32,
    pub clip_white_pct: f32,
    pub clip_black_pct: f32,
    pub specular_pct: f32,
    pub laplacian_variance: f32,
    pub noise_estimate: f32,
    pub sharp_score: f32,
    /// `None` when there was no comparable previous frame
    pub motion_mad: Option<f32>,
}

/// Tri-state view of the stability gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateState {
    /// No passing frame since the last reset or failure
    Idle,
    /// Passing frames counted so far
    Accumulating(u32),
    /// Streak has reached the required length
    Stable,
}

/// Result of analyzing one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityVerdict {
    pub exposure_ok: bool,
    pub focus_ok: bool,
    pub motion_ok: bool,
    pub streak_count: u32,
    pub streak_required: u32,
    pub is_stable: bool,
    pub stats: RoiStats,
}

impl QualityVerdict {
    pub fn quality_ok(&self) -> bool {
        self.exposure_ok && self.focus_ok && self.motion_ok
    }

    pub fn gate_state(&self) -> GateState {
        if self.is_stable {
            GateState::Stable
        } else if self.streak_count == 0 {
            GateState::Idle
        } else {
            GateState::Accumulating(self.streak_count)
        }
    }

    /// Most pressing problem, in the order a user should fix them
    pub fn status(&self) -> QualityStatus {
        if !self.exposure_ok {
            QualityStatus::BadExposure
        } else if !self.focus_ok {
            QualityStatus::BadFocus
        } else if !self.motion_ok {
            QualityStatus::Shake
        } else if !self.is_stable {
            QualityStatus::Stabilizing {
                streak: self.streak_count,
                required: self.streak_required,
            }
        } else {
            QualityStatus::Good
        }
    }
}

/// Informational status classification used for UI text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityStatus {
    BadExposure,
    BadFocus,
    Shake,
    Stabilizing { streak: u32, required: u32 },
    Good,
}

impl QualityStatus {
    /// Whether the capture action should be enabled
    pub fn allows_capture(&self) -> bool {
        matches!(self, QualityStatus::Good)
    }
}

impl fmt::Display for QualityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityStatus::BadExposure => write!(f, "Bad Exposure"),
            QualityStatus::BadFocus => write!(f, "Bad Focus"),
            QualityStatus::Shake => write!(f, "Hold Still"),
            QualityStatus::Stabilizing { streak, required } => {
                write!(f, "Stabilizing {}/{}", streak, required)
            }
            QualityStatus::Good => write!(f, "Good"),
        }
    }
}
