// SPDX-License-Identifier: GPL-3.0-only

//! Per-session capture controller
//!
//! One [`CaptureSession`] exists per bound camera. It owns the quality gate,
//! the control negotiator and the white-balance freezer, each with a single
//! writer: frame analysis mutates only the gate, capture results mutate only
//! the freezer and readback, and control application mutates only the
//! negotiator's applied state.

use super::frame_processor::{FrameAnalyzer, LumaFrame, QualityVerdict};
use crate::backends::camera::mapper::{focus_distance_label, shutter_label};
use crate::backends::camera::{
    AppliedCaptureState, CancelToken, CaptureResult, CaptureTier, ControlApplier, ControlMode,
    ControlNegotiator, FreezeUpdate, HardwareCapabilities, ParameterMapper, RequestedParams,
    SensorReadback, WhiteBalanceFreeze, WhiteBalanceFreezer,
};
use crate::config::Config;
use crate::errors::ControlError;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Serializable summary of the session for sidecar metadata
#[derive(Debug, Clone, Serialize)]
pub struct CaptureMetadata {
    pub session_id: Uuid,
    pub timestamp: String,
    pub lock_mode: bool,
    pub supports_manual_sensor: bool,
    pub supports_awb_lock: bool,
    pub requested: RequestedParams,
    pub control_mode: Option<ControlMode>,
    pub tier: Option<CaptureTier>,
    pub readback: Option<SensorReadback>,
    pub wb_frozen: bool,
    pub focus_label: Option<String>,
    pub shutter_label: Option<String>,
    pub last_verdict: Option<QualityVerdict>,
}

pub struct CaptureSession {
    id: Uuid,
    analyzer: FrameAnalyzer,
    analysis_suspended: bool,
    last_verdict: Option<QualityVerdict>,
    negotiator: ControlNegotiator,
    wb_freezer: WhiteBalanceFreezer,
    lock_mode: bool,
    requested: RequestedParams,
    cancel: CancelToken,
}

impl CaptureSession {
    pub fn new(config: &Config, capabilities: HardwareCapabilities) -> Self {
        let id = Uuid::new_v4();
        info!(
            session = %id,
            manual_sensor = capabilities.supports_manual_sensor,
            awb_lock = capabilities.supports_awb_lock,
            "Capture session started"
        );

        Self {
            id,
            analyzer: FrameAnalyzer::new(config.quality.clone(), config.sampling.clone()),
            analysis_suspended: false,
            last_verdict: None,
            negotiator: ControlNegotiator::new(
                capabilities,
                ParameterMapper::new(config.shutter_margin_ns),
            ),
            wb_freezer: WhiteBalanceFreezer::new(),
            lock_mode: false,
            requested: RequestedParams {
                target_fps: config.target_fps,
                ..Default::default()
            },
            cancel: CancelToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    // ===== Frame analysis =====

    /// Analyze one frame; `None` while analysis is suspended
    pub fn analyze_frame(&mut self, frame: &LumaFrame<'_>) -> Option<QualityVerdict> {
        if self.analysis_suspended {
            return None;
        }
        let verdict = self.analyzer.analyze(frame);
        self.last_verdict = Some(verdict);
        Some(verdict)
    }

    pub fn reset_quality_streak(&mut self) {
        self.analyzer.reset();
        self.last_verdict = None;
    }

    /// Stop analyzing, e.g. while video is recording
    pub fn suspend_analysis(&mut self) {
        debug!("Frame analysis suspended");
        self.analysis_suspended = true;
    }

    /// Resume with a fresh streak and motion signature
    pub fn resume_analysis(&mut self) {
        debug!("Frame analysis resumed");
        self.analysis_suspended = false;
        self.reset_quality_streak();
    }

    pub fn is_analysis_suspended(&self) -> bool {
        self.analysis_suspended
    }

    // ===== Capture controls =====

    pub fn lock_mode(&self) -> bool {
        self.lock_mode
    }

    pub fn requested(&self) -> &RequestedParams {
        &self.requested
    }

    pub fn set_requested(&mut self, requested: RequestedParams) {
        self.requested = requested;
    }

    /// Token another thread can use to abandon an in-flight negotiation
    ///
    /// The same token is kept for the whole session, so a handle stays valid
    /// after it has been used once.
    pub fn cancel_handle(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enter or leave lock mode and apply the matching controls
    ///
    /// Leaving clears the frozen white balance so the next lock converges
    /// again from auto.
    pub fn set_lock_mode<A: ControlApplier + ?Sized>(
        &mut self,
        enabled: bool,
        applier: &mut A,
    ) -> Result<AppliedCaptureState, ControlError> {
        info!(enabled, "Lock mode changed");
        self.lock_mode = enabled;
        self.wb_freezer.set_lock_mode(enabled);
        self.apply_controls(applier)
    }

    /// Apply the current requested parameters for the current mode
    pub fn apply_controls<A: ControlApplier + ?Sized>(
        &mut self,
        applier: &mut A,
    ) -> Result<AppliedCaptureState, ControlError> {
        let result = if self.lock_mode {
            let frozen = self.wb_freezer.frozen().copied();
            self.negotiator.negotiate_and_apply(
                &self.requested,
                frozen.as_ref(),
                applier,
                &self.cancel,
            )
        } else {
            self.negotiator.apply_auto(applier)
        };

        // A cancel targets the negotiation in flight; once that is over,
        // finished or abandoned, it must not leak into the next one
        self.cancel.reset();
        result
    }

    /// Feed a completed capture result to the readback and the WB freezer
    ///
    /// When the result freezes white balance in lock mode the caller should
    /// re-apply controls so the frozen values reach the hardware.
    pub fn on_capture_result(&mut self, result: &CaptureResult) -> FreezeUpdate {
        self.negotiator.observe_result(result);
        self.wb_freezer.on_capture_result(result)
    }

    pub fn frozen_white_balance(&self) -> Option<&WhiteBalanceFreeze> {
        self.wb_freezer.frozen()
    }

    pub fn applied(&self) -> Option<&AppliedCaptureState> {
        self.negotiator.applied()
    }

    pub fn capabilities(&self) -> &HardwareCapabilities {
        self.negotiator.capabilities()
    }

    pub fn metadata_snapshot(&self) -> CaptureMetadata {
        let applied = self.negotiator.applied();
        let readback = applied.map(|a| a.readback);
        let caps = self.negotiator.capabilities();

        CaptureMetadata {
            session_id: self.id,
            timestamp: chrono::Local::now().to_rfc3339(),
            lock_mode: self.lock_mode,
            supports_manual_sensor: caps.supports_manual_sensor,
            supports_awb_lock: caps.supports_awb_lock,
            requested: self.requested.clone(),
            control_mode: applied.map(|a| a.mode),
            tier: applied.and_then(|a| a.mode.tier()),
            readback,
            wb_frozen: self.wb_freezer.frozen().is_some(),
            focus_label: readback
                .and_then(|r| r.focus_distance_diopters)
                .map(focus_distance_label),
            shutter_label: readback.and_then(|r| r.exposure_time_ns).map(shutter_label),
            last_verdict: self.last_verdict,
        }
    }
}
