// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Running the quality gate over image sequences
//! - Shutter ceiling for a frame rate
//! - Control negotiation against the virtual camera

use pgcapture::backends::camera::mapper::shutter_label;
use pgcapture::backends::camera::{
    HardwareCapabilities, ParameterMapper, RequestedParams, Setpoint, ValueRange,
};
use pgcapture::backends::virtual_camera::{RejectionRules, VirtualCamera, load_luma_frame};
use pgcapture::{CaptureSession, Config, FrameAnalyzer};
use std::path::{Path, PathBuf};

/// Frames of capture results pumped after locking, enough for AWB to settle
const SETTLE_FRAMES: usize = 12;

pub struct NegotiateArgs {
    pub caps: Option<PathBuf>,
    pub iso: Option<f32>,
    pub shutter: Option<f32>,
    pub focus: Option<f32>,
    pub fps: Option<u32>,
    pub reject_manual_exposure: bool,
    pub reject_manual_focus: bool,
}

/// Analyze images in order as consecutive frames of one stream
pub fn analyze_images(
    config: &Config,
    images: &[PathBuf],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut analyzer = FrameAnalyzer::new(config.quality.clone(), config.sampling.clone());

    for path in images {
        let owned = load_luma_frame(path)?;
        let frame = owned.as_frame()?;
        let verdict = analyzer.analyze(&frame);

        if json {
            println!("{}", serde_json::to_string(&verdict)?);
        } else {
            println!(
                "{}: {} (mean {:.1}, sharp {:.2}, motion {})",
                path.display(),
                verdict.status(),
                verdict.stats.mean,
                verdict.stats.sharp_score,
                verdict
                    .stats
                    .motion_mad
                    .map(|m| format!("{:.2}", m))
                    .unwrap_or_else(|| "n/a".to_string()),
            );
        }
    }

    Ok(())
}

pub fn print_shutter(
    config: &Config,
    fps: u32,
    min_ns: Option<i64>,
    max_ns: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mapper = ParameterMapper::new(config.shutter_margin_ns);
    let max_shutter = mapper.max_shutter_for_fps(fps);
    println!("{} fps: max {}", fps, shutter_label(max_shutter));

    if let (Some(lo), Some(hi)) = (min_ns, max_ns) {
        let ceiling = ValueRange::new(lo, hi).clamp(max_shutter);
        println!("Clamped to hardware: {}", shutter_label(ceiling));
    }

    Ok(())
}

/// Lock manual controls on the virtual camera and print the outcome
pub fn negotiate(config: &Config, args: NegotiateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let capabilities = match args.caps.as_deref() {
        Some(path) => load_capabilities(path)?,
        None => VirtualCamera::sample_capabilities(),
    };
    let rules = RejectionRules {
        manual_exposure: args.reject_manual_exposure,
        manual_focus: args.reject_manual_focus,
        everything: false,
    };

    let mut camera = VirtualCamera::new(capabilities.clone(), rules);
    let mut session = CaptureSession::new(config, capabilities);
    session.set_requested(RequestedParams {
        iso: args.iso.map(Setpoint::Normalized),
        exposure_time_ns: args.shutter.map(Setpoint::Normalized),
        focus_diopters: args.focus.map(Setpoint::Normalized),
        target_fps: args.fps.unwrap_or(config.target_fps),
    });

    session.set_lock_mode(true, &mut camera)?;
    for _ in 0..SETTLE_FRAMES {
        let result = camera.next_result();
        if session.on_capture_result(&result).newly_frozen {
            session.apply_controls(&mut camera)?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&session.metadata_snapshot())?);
    Ok(())
}

fn load_capabilities(path: &Path) -> Result<HardwareCapabilities, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
