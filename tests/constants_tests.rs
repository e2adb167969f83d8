// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use pgcapture::constants::{self, exposure, motion, sampling, sharpness};

#[test]
fn test_brightness_band_ordered() {
    assert!(exposure::TARGET_MEAN_MIN < exposure::TARGET_MEAN_MAX);
    assert!(exposure::BLACK_CLIP_LEVEL < exposure::SPECULAR_LEVEL);
    assert!(exposure::SPECULAR_LEVEL < exposure::WHITE_CLIP_LEVEL);
}

#[test]
fn test_sampling_strides_get_coarser() {
    // Exposure is sampled finest, motion coarsest
    assert!(sampling::EXPOSURE_STEP < sampling::SHARPNESS_STEP);
    assert!(sampling::SHARPNESS_STEP < motion::SIGNATURE_GRID);
}

#[test]
fn test_noise_offset_differs_from_lag() {
    assert_ne!(sharpness::NOISE_OFFSET, sharpness::LAPLACIAN_LAG);
}

#[test]
fn test_shutter_margin_fits_frame() {
    let frame_ns = constants::NANOS_PER_SECOND / constants::DEFAULT_TARGET_FPS as i64;
    assert!(constants::SHUTTER_MARGIN_NS < frame_ns);
}

#[test]
fn test_version_not_empty() {
    assert!(!constants::app_info::version().is_empty());
}
