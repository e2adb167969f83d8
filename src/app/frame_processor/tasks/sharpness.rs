// SPDX-License-Identifier: GPL-3.0-only

//! Sharpness estimation
//!
//! Discrete Laplacian variance over the ROI, normalized by a local noise
//! estimate so sensor grain at high gain does not read as texture:
//!
//! ```text
//! L          = 4*c - up - down - left - right      (neighbors at `lag`)
//! variance   = E[L^2] - E[L]^2
//! noise      = mean(|c - right| + |c - down|) / 2  (neighbors at `noise_offset`)
//! sharpScore = variance / (noise + 1)^2
//! ```

use super::region::RoiBounds;
use crate::app::frame_processor::types::LumaFrame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpnessStats {
    pub laplacian_variance: f32,
    pub noise_mad: f32,
    pub sharp_score: f32,
    pub samples: usize,
}

impl SharpnessStats {
    fn insufficient() -> Self {
        Self {
            laplacian_variance: f32::NAN,
            noise_mad: f32::NAN,
            sharp_score: f32::NAN,
            samples: 0,
        }
    }
}

pub fn measure_sharpness(
    frame: &LumaFrame<'_>,
    roi: &RoiBounds,
    step: u32,
    lag: u32,
    noise_offset: u32,
) -> SharpnessStats {
    let margin = lag.max(noise_offset);
    let grid = roi.interior(frame.width(), frame.height(), margin).grid(step);

    let mut sum = 0f64;
    let mut sum_sq = 0f64;
    let mut noise_sum = 0f64;
    let mut count = 0usize;

    for (x, y) in grid.points() {
        let c = frame.at(x, y) as i32;

        let lap = 4 * c
            - frame.at(x, y - lag) as i32
            - frame.at(x, y + lag) as i32
            - frame.at(x - lag, y) as i32
            - frame.at(x + lag, y) as i32;
        let lap = lap as f64;
        sum += lap;
        sum_sq += lap * lap;

        let right = (c - frame.at(x + noise_offset, y) as i32).abs();
        let down = (c - frame.at(x, y + noise_offset) as i32).abs();
        noise_sum += (right + down) as f64 / 2.0;

        count += 1;
    }

    if count == 0 {
        return SharpnessStats::insufficient();
    }

    let n = count as f64;
    let mean = sum / n;
    // Rounding can push a flat field a hair below zero
    let variance = (sum_sq / n - mean * mean).max(0.0);
    let noise = noise_sum / n;
    let score = variance / ((noise + 1.0) * (noise + 1.0));

    SharpnessStats {
        laplacian_variance: variance as f32,
        noise_mad: noise as f32,
        sharp_score: score as f32,
        samples: count,
    }
}

pub fn focus_ok(stats: &SharpnessStats, min_sharp_score: f32) -> bool {
    stats.samples > 0 && stats.sharp_score > min_sharp_score
}
