// SPDX-License-Identifier: GPL-3.0-only

//! Exposure estimation
//!
//! Mean brightness plus the share of white-clipped, black-clipped and
//! specular samples over the ROI.

use super::region::SampleGrid;
use crate::app::frame_processor::types::LumaFrame;
use crate::config::QualityThresholds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureStats {
    pub mean: f32,
    pub white_pct: f32,
    pub black_pct: f32,
    pub specular_pct: f32,
    pub samples: usize,
}

impl ExposureStats {
    fn insufficient() -> Self {
        Self {
            mean: f32::NAN,
            white_pct: f32::NAN,
            black_pct: f32::NAN,
            specular_pct: f32::NAN,
            samples: 0,
        }
    }
}

pub fn measure_exposure(
    frame: &LumaFrame<'_>,
    grid: &SampleGrid,
    thresholds: &QualityThresholds,
) -> ExposureStats {
    let mut sum: u64 = 0;
    let mut count: usize = 0;
    let mut white = 0usize;
    let mut black = 0usize;
    let mut specular = 0usize;

    for (x, y) in grid.points() {
        let v = frame.at(x, y);
        sum += v as u64;
        count += 1;
        if v >= thresholds.white_clip_level {
            white += 1;
        }
        if v <= thresholds.black_clip_level {
            black += 1;
        }
        if v >= thresholds.specular_level {
            specular += 1;
        }
    }

    if count == 0 {
        return ExposureStats::insufficient();
    }

    let pct = |n: usize| n as f32 * 100.0 / count as f32;
    ExposureStats {
        mean: sum as f32 / count as f32,
        white_pct: pct(white),
        black_pct: pct(black),
        specular_pct: pct(specular),
        samples: count,
    }
}

/// Mean inside the band, clipping below the limit on both ends, few highlights
pub fn exposure_ok(stats: &ExposureStats, thresholds: &QualityThresholds) -> bool {
    stats.samples > 0
        && stats.mean >= thresholds.mean_min
        && stats.mean <= thresholds.mean_max
        && stats.white_pct < thresholds.max_clip_pct
        && stats.black_pct < thresholds.max_clip_pct
        && stats.specular_pct < thresholds.max_specular_pct
}
