// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the frame quality gate

use pgcapture::app::frame_processor::{FrameAnalyzer, LumaFrame, QualityStatus};
use pgcapture::errors::FrameError;

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;

/// 10 px checkerboard, shifted right by `shift` pixels
fn textured(shift: u32) -> Vec<u8> {
    (0..HEIGHT)
        .flat_map(|y| {
            (0..WIDTH).map(move |x| if ((x + shift) / 10 + y / 10) % 2 == 0 { 100 } else { 160 })
        })
        .collect()
}

#[test]
fn test_uniform_in_band_exposure_ok() {
    for brightness in [90u8, 128, 180] {
        let mut analyzer = FrameAnalyzer::default();
        let data = vec![brightness; (WIDTH * HEIGHT) as usize];
        let frame = LumaFrame::packed(&data, WIDTH, HEIGHT).unwrap();
        let verdict = analyzer.analyze(&frame);
        assert!(verdict.exposure_ok, "brightness {} should pass", brightness);
    }
}

#[test]
fn test_clipped_column_fails_exposure() {
    // One white column in the sampled ROI is 5% of the exposure samples
    let mut data = vec![128u8; (WIDTH * HEIGHT) as usize];
    for y in 0..HEIGHT {
        for x in 80..84 {
            data[(y * WIDTH + x) as usize] = 255;
        }
    }
    let frame = LumaFrame::packed(&data, WIDTH, HEIGHT).unwrap();
    let verdict = FrameAnalyzer::default().analyze(&frame);

    assert!(!verdict.exposure_ok);
    assert!(verdict.stats.clip_white_pct > 1.0);
    assert_eq!(verdict.status(), QualityStatus::BadExposure);
}

#[test]
fn test_dark_frame_fails_exposure() {
    let data = vec![3u8; (WIDTH * HEIGHT) as usize];
    let frame = LumaFrame::packed(&data, WIDTH, HEIGHT).unwrap();
    assert!(!FrameAnalyzer::default().analyze(&frame).exposure_ok);
}

#[test]
fn test_shift_between_frames_is_shake() {
    let mut analyzer = FrameAnalyzer::default();
    let still = textured(0);
    let moved = textured(10);

    analyzer.analyze(&LumaFrame::packed(&still, WIDTH, HEIGHT).unwrap());
    let steady = analyzer.analyze(&LumaFrame::packed(&still, WIDTH, HEIGHT).unwrap());
    assert!(steady.motion_ok);

    let shaken = analyzer.analyze(&LumaFrame::packed(&moved, WIDTH, HEIGHT).unwrap());
    assert!(!shaken.motion_ok);
    assert_eq!(shaken.streak_count, 0);
    assert_eq!(shaken.status(), QualityStatus::Shake);
}

#[test]
fn test_resolution_change_fails_closed_for_one_frame() {
    let mut analyzer = FrameAnalyzer::default();
    let large = textured(0);
    let small: Vec<u8> = vec![128; 80 * 60];

    analyzer.analyze(&LumaFrame::packed(&large, WIDTH, HEIGHT).unwrap());
    let verdict = analyzer.analyze(&LumaFrame::packed(&small, 80, 60).unwrap());
    assert!(!verdict.motion_ok);
    assert!(verdict.stats.motion_mad.is_none());

    let verdict = analyzer.analyze(&LumaFrame::packed(&small, 80, 60).unwrap());
    assert!(verdict.motion_ok);
}

#[test]
fn test_stable_then_fail_resets() {
    let mut analyzer = FrameAnalyzer::default();
    let still = textured(0);
    let frame = LumaFrame::packed(&still, WIDTH, HEIGHT).unwrap();

    // First frame only primes the motion signature
    analyzer.analyze(&frame);
    for _ in 0..12 {
        analyzer.analyze(&frame);
    }
    assert!(analyzer.analyze(&frame).is_stable);

    let flat = vec![128u8; (WIDTH * HEIGHT) as usize];
    let verdict = analyzer.analyze(&LumaFrame::packed(&flat, WIDTH, HEIGHT).unwrap());
    assert!(!verdict.is_stable);
    assert_eq!(verdict.streak_count, 0);
}

#[test]
fn test_padded_stride_matches_packed() {
    let packed = textured(0);
    let stride = WIDTH + 32;
    let mut padded = vec![0u8; (stride * HEIGHT) as usize];
    for y in 0..HEIGHT as usize {
        let row = &packed[y * WIDTH as usize..(y + 1) * WIDTH as usize];
        padded[y * stride as usize..y * stride as usize + WIDTH as usize].copy_from_slice(row);
    }

    let a = FrameAnalyzer::default().analyze(&LumaFrame::packed(&packed, WIDTH, HEIGHT).unwrap());
    let b = FrameAnalyzer::default()
        .analyze(&LumaFrame::new(&padded, WIDTH, HEIGHT, stride).unwrap());
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_tiny_frame_never_panics() {
    for (w, h) in [(1, 1), (2, 3), (7, 5), (30, 2)] {
        let data = vec![128u8; (w * h) as usize];
        let frame = LumaFrame::packed(&data, w, h).unwrap();
        let verdict = FrameAnalyzer::default().analyze(&frame);
        assert!(!verdict.quality_ok());
    }
}

#[test]
fn test_invalid_geometry_rejected() {
    let data = vec![0u8; 10];
    assert_eq!(
        LumaFrame::new(&data, 4, 4, 2).unwrap_err(),
        FrameError::StrideTooSmall {
            stride: 2,
            width: 4
        }
    );
    assert!(matches!(
        LumaFrame::packed(&data, 4, 4),
        Err(FrameError::BufferTooSmall { .. })
    ));
    assert!(matches!(
        LumaFrame::packed(&data, 0, 4),
        Err(FrameError::EmptyDimensions { .. })
    ));
}
