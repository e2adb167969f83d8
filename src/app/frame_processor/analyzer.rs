// SPDX-License-Identifier: GPL-3.0-only

//! Frame analyzer
//!
//! Runs the exposure, sharpness and motion estimators over the ROI of one
//! frame and folds the result into the quality gate. Calls are strictly
//! synchronous: the frame borrow ends when [`FrameAnalyzer::analyze`]
//! returns, and only the motion signature is carried to the next frame.

use super::quality_gate::{FrameChecks, QualityGate};
use super::tasks::exposure::{exposure_ok, measure_exposure};
use super::tasks::motion::{MotionEstimator, motion_ok};
use super::tasks::region::RoiBounds;
use super::tasks::sharpness::{focus_ok, measure_sharpness};
use super::types::{LumaFrame, QualityVerdict, RoiStats};
use crate::config::{QualityThresholds, SamplingConfig};
use tracing::trace;

#[derive(Debug)]
pub struct FrameAnalyzer {
    thresholds: QualityThresholds,
    sampling: SamplingConfig,
    motion: MotionEstimator,
    gate: QualityGate,
}

impl Default for FrameAnalyzer {
    fn default() -> Self {
        Self::new(QualityThresholds::default(), SamplingConfig::default())
    }
}

impl FrameAnalyzer {
    pub fn new(thresholds: QualityThresholds, sampling: SamplingConfig) -> Self {
        let gate = QualityGate::new(thresholds.streak_required);
        Self {
            thresholds,
            sampling,
            motion: MotionEstimator::new(),
            gate,
        }
    }

    pub fn analyze(&mut self, frame: &LumaFrame<'_>) -> QualityVerdict {
        let roi = RoiBounds::centered(frame.width(), frame.height(), self.sampling.roi_inset);

        let exposure = measure_exposure(
            frame,
            &roi.grid(self.sampling.exposure_step),
            &self.thresholds,
        );
        let sharpness = measure_sharpness(
            frame,
            &roi,
            self.sampling.sharpness_step,
            self.sampling.laplacian_lag,
            self.sampling.noise_offset,
        );
        let motion_mad = self
            .motion
            .update(frame, &roi.grid(self.sampling.motion_grid));

        let checks = FrameChecks {
            exposure_ok: exposure_ok(&exposure, &self.thresholds),
            focus_ok: focus_ok(&sharpness, self.thresholds.min_sharp_score),
            motion_ok: motion_ok(motion_mad, self.thresholds.max_motion_mad),
        };
        self.gate.observe(checks);

        trace!(
            mean = exposure.mean,
            sharp_score = sharpness.sharp_score,
            motion_mad = ?motion_mad,
            streak = self.gate.streak(),
            "Analyzed frame"
        );

        QualityVerdict {
            exposure_ok: checks.exposure_ok,
            focus_ok: checks.focus_ok,
            motion_ok: checks.motion_ok,
            streak_count: self.gate.streak(),
            streak_required: self.gate.required(),
            is_stable: self.gate.is_stable(),
            stats: RoiStats {
                mean: exposure.mean,
                clip_white_pct: exposure.white_pct,
                clip_black_pct: exposure.black_pct,
                specular_pct: exposure.specular_pct,
                laplacian_variance: sharpness.laplacian_variance,
                noise_estimate: sharpness.noise_mad,
                sharp_score: sharpness.sharp_score,
                motion_mad,
            },
        }
    }

    /// Start over: zero the streak and drop the stored motion signature
    ///
    /// Called when analysis is resumed after a suspension, so a stale streak
    /// or a signature from before the pause is never reused.
    pub fn reset(&mut self) {
        self.gate.reset();
        self.motion.reset();
    }

    pub fn streak(&self) -> u32 {
        self.gate.streak()
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::QualityStatus;

    fn textured(width: u32, height: u32) -> Vec<u8> {
        (0..height)
            .flat_map(|y| (0..width).map(move |x| if (x / 10 + y / 10) % 2 == 0 { 100 } else { 160 }))
            .collect()
    }

    #[test]
    fn test_first_frame_reports_shake() {
        let mut analyzer = FrameAnalyzer::default();
        let data = textured(160, 120);
        let frame = LumaFrame::packed(&data, 160, 120).unwrap();
        let verdict = analyzer.analyze(&frame);
        assert!(verdict.exposure_ok);
        assert!(verdict.focus_ok);
        assert!(!verdict.motion_ok);
        assert_eq!(verdict.status(), QualityStatus::Shake);
    }

    #[test]
    fn test_still_textured_scene_becomes_stable() {
        let mut analyzer = FrameAnalyzer::default();
        let data = textured(160, 120);
        let frame = LumaFrame::packed(&data, 160, 120).unwrap();

        analyzer.analyze(&frame);
        for i in 1..=11 {
            let verdict = analyzer.analyze(&frame);
            assert_eq!(verdict.streak_count, i);
            assert!(!verdict.is_stable);
        }
        let verdict = analyzer.analyze(&frame);
        assert!(verdict.is_stable);
        assert_eq!(verdict.status(), QualityStatus::Good);
    }

    #[test]
    fn test_reset_requires_fresh_signature() {
        let mut analyzer = FrameAnalyzer::default();
        let data = textured(160, 120);
        let frame = LumaFrame::packed(&data, 160, 120).unwrap();
        for _ in 0..5 {
            analyzer.analyze(&frame);
        }
        assert_eq!(analyzer.streak(), 4);

        analyzer.reset();
        let verdict = analyzer.analyze(&frame);
        assert!(!verdict.motion_ok);
        assert_eq!(verdict.streak_count, 0);
    }

    #[test]
    fn test_flat_frame_is_bad_focus() {
        let mut analyzer = FrameAnalyzer::default();
        let data = vec![128u8; 160 * 120];
        let frame = LumaFrame::packed(&data, 160, 120).unwrap();
        let verdict = analyzer.analyze(&frame);
        assert!(verdict.exposure_ok);
        assert_eq!(verdict.status(), QualityStatus::BadFocus);
    }
}
