// SPDX-License-Identifier: GPL-3.0-only

//! Region-of-interest sampling
//!
//! Every estimator looks at the same centered rectangle of the frame, at its
//! own stride. Bounds are pure arithmetic on the frame size; an ROI that is
//! too small for the requested stride simply yields no samples, and the
//! estimators turn that into an "insufficient data" result.

/// Half-open pixel rectangle `[left, right) x [top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl RoiBounds {
    /// Centered rectangle with `inset` of the width/height trimmed from each side
    ///
    /// `inset` is clamped to `[0, 0.5)`; the result always lies within the frame.
    pub fn centered(width: u32, height: u32, inset: f32) -> Self {
        let inset = if inset.is_finite() {
            inset.clamp(0.0, 0.499)
        } else {
            0.0
        };
        let left = (width as f32 * inset) as u32;
        let top = (height as f32 * inset) as u32;

        Self {
            left: left.min(width),
            top: top.min(height),
            right: width.saturating_sub(left).max(left.min(width)),
            bottom: height.saturating_sub(top).max(top.min(height)),
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Restrict to points whose neighbors `margin` pixels away in every
    /// direction are still inside a `frame_width` x `frame_height` frame
    pub fn interior(&self, frame_width: u32, frame_height: u32, margin: u32) -> Self {
        let left = self.left.max(margin);
        let top = self.top.max(margin);
        let right = self.right.min(frame_width.saturating_sub(margin));
        let bottom = self.bottom.min(frame_height.saturating_sub(margin));

        Self {
            left,
            top,
            right: right.max(left),
            bottom: bottom.max(top),
        }
    }

    /// Sampling grid over this rectangle at `step` pixels in both axes
    pub fn grid(&self, step: u32) -> SampleGrid {
        SampleGrid {
            bounds: *self,
            step: step.max(1),
        }
    }
}

/// Iteration bounds plus stride handed to the estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleGrid {
    pub bounds: RoiBounds,
    pub step: u32,
}

impl SampleGrid {
    /// Number of sample columns and rows
    pub fn shape(&self) -> (u32, u32) {
        (
            self.bounds.width().div_ceil(self.step),
            self.bounds.height().div_ceil(self.step),
        )
    }

    pub fn sample_count(&self) -> usize {
        let (cols, rows) = self.shape();
        cols as usize * rows as usize
    }

    /// Sample coordinates in row-major order
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> + use<> {
        let RoiBounds {
            left,
            top,
            right,
            bottom,
        } = self.bounds;
        let step = self.step as usize;

        (top..bottom)
            .step_by(step)
            .flat_map(move |y| (left..right).step_by(step).map(move |x| (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_quarter_inset() {
        let roi = RoiBounds::centered(640, 480, 0.25);
        assert_eq!(
            roi,
            RoiBounds {
                left: 160,
                top: 120,
                right: 480,
                bottom: 360
            }
        );
    }

    #[test]
    fn test_tiny_frame_stays_in_bounds() {
        let roi = RoiBounds::centered(1, 1, 0.25);
        assert!(roi.right <= 1 && roi.bottom <= 1);
        assert_eq!(roi.grid(4).sample_count(), 1);
    }

    #[test]
    fn test_interior_can_be_empty() {
        let roi = RoiBounds::centered(16, 16, 0.25);
        let interior = roi.interior(16, 16, 10);
        assert!(interior.is_empty());
        assert_eq!(interior.grid(8).points().count(), 0);
    }

    #[test]
    fn test_grid_points_match_count() {
        let grid = RoiBounds::centered(100, 60, 0.25).grid(7);
        assert_eq!(grid.points().count(), grid.sample_count());
        assert!(grid.points().all(|(x, y)| (25..75).contains(&x) && (15..45).contains(&y)));
    }
}
