// SPDX-License-Identifier: GPL-3.0-only

//! Tiered capture-control negotiation
//!
//! Hardware often rejects manual-control combinations it claims to support.
//! The negotiator walks a fixed ladder of progressively more conservative
//! requests until one is accepted:
//!
//! ```text
//! FullManual ──reject──▶ FocusOnlyManual ──reject──▶ FullAuto (terminal)
//! ```
//!
//! The ladder only moves forward within a session. Leaving lock mode applies
//! the automatic branch, which sits outside the ladder, and rewinds the
//! ladder to its initial rung for the next lock.

use super::ControlApplier;
use super::controls::{AfMode, CaptureRequest, ExposureMode};
use super::mapper::{
    ParameterMapper, RequestedParams, ResolvedParams, choose_best_fps_range,
    preferred_auto_fps_range,
};
use super::types::{CaptureResult, HardwareCapabilities, SensorReadback, WhiteBalanceFreeze};
use crate::errors::ControlError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// One rung of the fallback ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaptureTier {
    /// AE and AF off, manual ISO, shutter and focus distance
    FullManual,
    /// AE on, manual focus distance only
    FocusOnlyManual,
    /// Everything automatic; always acceptable
    FullAuto,
}

impl CaptureTier {
    /// The next more conservative rung, `None` for the terminal one
    pub fn next(self) -> Option<Self> {
        match self {
            CaptureTier::FullManual => Some(CaptureTier::FocusOnlyManual),
            CaptureTier::FocusOnlyManual => Some(CaptureTier::FullAuto),
            CaptureTier::FullAuto => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn label(self) -> &'static str {
        match self {
            CaptureTier::FullManual => "full manual",
            CaptureTier::FocusOnlyManual => "focus-only manual",
            CaptureTier::FullAuto => "full auto",
        }
    }
}

impl std::fmt::Display for CaptureTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which branch produced the applied request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// Lock mode off; not part of the ladder
    Auto,
    Locked(CaptureTier),
}

impl ControlMode {
    pub fn tier(self) -> Option<CaptureTier> {
        match self {
            ControlMode::Auto => None,
            ControlMode::Locked(tier) => Some(tier),
        }
    }
}

/// The last request the hardware fully accepted, plus what it reports back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCaptureState {
    pub mode: ControlMode,
    pub request: CaptureRequest,
    pub readback: SensorReadback,
}

/// Shared flag for abandoning a negotiation between tier attempts
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag; every clone sees the reset
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct ControlNegotiator {
    capabilities: HardwareCapabilities,
    mapper: ParameterMapper,
    tier: CaptureTier,
    applied: Option<AppliedCaptureState>,
}

impl ControlNegotiator {
    pub fn new(capabilities: HardwareCapabilities, mapper: ParameterMapper) -> Self {
        let tier = Self::initial_tier(&capabilities);
        debug!(initial_tier = %tier, "Control negotiator created");
        Self {
            capabilities,
            mapper,
            tier,
            applied: None,
        }
    }

    /// Full manual only when the device claims manual sensor support
    pub fn initial_tier(capabilities: &HardwareCapabilities) -> CaptureTier {
        if capabilities.supports_manual_sensor {
            CaptureTier::FullManual
        } else {
            CaptureTier::FocusOnlyManual
        }
    }

    pub fn capabilities(&self) -> &HardwareCapabilities {
        &self.capabilities
    }

    pub fn mapper(&self) -> &ParameterMapper {
        &self.mapper
    }

    /// Rung the next lock attempt starts from
    pub fn current_tier(&self) -> CaptureTier {
        self.tier
    }

    pub fn applied(&self) -> Option<&AppliedCaptureState> {
        self.applied.as_ref()
    }

    /// Apply the requested manual parameters, escalating on rejection
    ///
    /// Each attempt submits one complete request. On success the request
    /// becomes the applied state. Cancellation is checked before every
    /// attempt; a cancelled or failed negotiation leaves the applied state
    /// at whatever was last accepted.
    pub fn negotiate_and_apply<A: ControlApplier + ?Sized>(
        &mut self,
        requested: &RequestedParams,
        frozen_wb: Option<&WhiteBalanceFreeze>,
        applier: &mut A,
        cancel: &CancelToken,
    ) -> Result<AppliedCaptureState, ControlError> {
        let resolved = self.mapper.resolve_all(requested, &self.capabilities);

        loop {
            if cancel.is_cancelled() {
                warn!(tier = %self.tier, "Control negotiation cancelled");
                return Err(ControlError::Cancelled);
            }

            let tier = self.tier;
            let request = self.build_request(tier, &resolved, requested.target_fps, frozen_wb);

            match applier.apply(&request) {
                Ok(()) => {
                    info!(tier = %tier, "Capture request accepted");
                    return Ok(self.commit(ControlMode::Locked(tier), request));
                }
                Err(rejection) => match tier.next() {
                    Some(next) => {
                        warn!(
                            tier = %tier,
                            next = %next,
                            reason = %rejection,
                            "Capture request rejected, falling back"
                        );
                        self.tier = next;
                    }
                    None => {
                        error!(reason = %rejection, "Fully automatic request rejected");
                        return Err(ControlError::FallbackRejected(rejection.reason));
                    }
                },
            }
        }
    }

    /// Leave lock mode: apply the automatic branch and rewind the ladder
    pub fn apply_auto<A: ControlApplier + ?Sized>(
        &mut self,
        applier: &mut A,
    ) -> Result<AppliedCaptureState, ControlError> {
        self.reset_ladder();

        let mut request = CaptureRequest::full_auto(&self.capabilities);
        request.target_fps_range = preferred_auto_fps_range(&self.capabilities.fps_ranges);

        match applier.apply(&request) {
            Ok(()) => {
                info!(fps_range = ?request.target_fps_range, "Automatic controls applied");
                Ok(self.commit(ControlMode::Auto, request))
            }
            Err(rejection) => {
                error!(reason = %rejection, "Automatic request rejected");
                Err(ControlError::FallbackRejected(rejection.reason))
            }
        }
    }

    pub fn reset_ladder(&mut self) {
        self.tier = Self::initial_tier(&self.capabilities);
    }

    /// Fold a completed capture result into the applied readback
    pub fn observe_result(&mut self, result: &CaptureResult) {
        if let Some(applied) = self.applied.as_mut() {
            applied.readback.merge(result);
        }
    }

    /// The complete request for `tier`
    pub fn build_request(
        &self,
        tier: CaptureTier,
        resolved: &ResolvedParams,
        target_fps: u32,
        frozen_wb: Option<&WhiteBalanceFreeze>,
    ) -> CaptureRequest {
        let caps = &self.capabilities;
        let manual_af = |request: &mut CaptureRequest| {
            request.focus_distance_diopters = resolved.focus_diopters;
            request.af_mode = if resolved.focus_diopters.is_some() {
                AfMode::Manual
            } else {
                AfMode::Continuous
            };
        };

        match tier {
            CaptureTier::FullManual => {
                let mut request = CaptureRequest::full_auto(caps);
                request.ae_mode = ExposureMode::Manual;
                request.sensitivity_iso = resolved.iso;
                request.exposure_time_ns = resolved.exposure_time_ns;
                // Pin the frame period instead of an AE fps range
                request.frame_duration_ns = resolved
                    .exposure_fits_frame()
                    .then_some(resolved.frame_duration_ns);
                request.flash_off = true;
                manual_af(&mut request);
                request.with_white_balance(frozen_wb, caps)
            }
            CaptureTier::FocusOnlyManual => {
                let mut request = CaptureRequest::full_auto(caps);
                request.target_fps_range = choose_best_fps_range(&caps.fps_ranges, target_fps);
                request.flash_off = true;
                manual_af(&mut request);
                request.with_white_balance(frozen_wb, caps)
            }
            CaptureTier::FullAuto => CaptureRequest::full_auto(caps),
        }
    }

    fn commit(&mut self, mode: ControlMode, request: CaptureRequest) -> AppliedCaptureState {
        let state = AppliedCaptureState {
            mode,
            request,
            readback: SensorReadback::default(),
        };
        self.applied = Some(state.clone());
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::controls::AwbMode;
    use crate::backends::camera::mapper::Setpoint;
    use crate::backends::camera::types::{ColorGains, ColorTransform, FpsRange, ValueRange};
    use crate::errors::ControlRejection;

    fn manual_caps() -> HardwareCapabilities {
        HardwareCapabilities {
            iso_range: Some(ValueRange::new(100, 3200)),
            exposure_range_ns: Some(ValueRange::new(100_000, 400_000_000)),
            min_focus_distance: Some(10.0),
            supports_manual_sensor: true,
            supports_awb_lock: true,
            fps_ranges: vec![FpsRange::new(15, 30), FpsRange::fixed(30)],
        }
    }

    fn requested() -> RequestedParams {
        RequestedParams {
            iso: Some(Setpoint::Normalized(0.5)),
            exposure_time_ns: Some(Setpoint::Native(10_000_000)),
            focus_diopters: Some(Setpoint::Normalized(0.5)),
            target_fps: 30,
        }
    }

    fn frozen() -> WhiteBalanceFreeze {
        WhiteBalanceFreeze {
            gains: ColorGains {
                red: 1.9,
                green_even: 1.0,
                green_odd: 1.0,
                blue: 1.7,
            },
            transform: ColorTransform([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
        }
    }

    #[test]
    fn test_tier_ladder_order() {
        assert_eq!(CaptureTier::FullManual.next(), Some(CaptureTier::FocusOnlyManual));
        assert_eq!(CaptureTier::FocusOnlyManual.next(), Some(CaptureTier::FullAuto));
        assert!(CaptureTier::FullAuto.is_terminal());
    }

    #[test]
    fn test_initial_tier_without_manual_sensor() {
        let caps = HardwareCapabilities {
            supports_manual_sensor: false,
            ..manual_caps()
        };
        assert_eq!(
            ControlNegotiator::initial_tier(&caps),
            CaptureTier::FocusOnlyManual
        );
    }

    #[test]
    fn test_full_manual_accepted_first_try() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let mut seen = Vec::new();
        let mut applier = |request: &CaptureRequest| {
            seen.push(request.clone());
            Ok::<(), ControlRejection>(())
        };

        let state = negotiator
            .negotiate_and_apply(&requested(), None, &mut applier, &CancelToken::new())
            .unwrap();

        assert_eq!(seen.len(), 1);
        assert_eq!(state.mode, ControlMode::Locked(CaptureTier::FullManual));
        assert_eq!(state.request.ae_mode, ExposureMode::Manual);
        assert_eq!(state.request.sensitivity_iso, Some(1650));
        assert_eq!(state.request.exposure_time_ns, Some(10_000_000));
        assert_eq!(state.request.frame_duration_ns, Some(33_333_333));
        assert!(state.request.target_fps_range.is_none());
        assert!(state.request.is_consistent());
    }

    #[test]
    fn test_two_rejections_end_at_full_auto() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let mut attempts = 0;
        let mut applier = |request: &CaptureRequest| {
            attempts += 1;
            if request.af_mode == AfMode::Manual {
                Err(ControlRejection::new("manual control unsupported"))
            } else {
                Ok(())
            }
        };

        let state = negotiator
            .negotiate_and_apply(&requested(), Some(&frozen()), &mut applier, &CancelToken::new())
            .unwrap();

        assert_eq!(attempts, 3);
        assert_eq!(state.mode, ControlMode::Locked(CaptureTier::FullAuto));
        assert_eq!(state.request.awb_mode, AwbMode::Auto);
        assert_eq!(negotiator.current_tier(), CaptureTier::FullAuto);
    }

    #[test]
    fn test_rejected_full_auto_is_fatal() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let mut applier =
            |_: &CaptureRequest| Err::<(), _>(ControlRejection::new("device disconnected"));

        let err = negotiator
            .negotiate_and_apply(&requested(), None, &mut applier, &CancelToken::new())
            .unwrap_err();

        assert!(matches!(err, ControlError::FallbackRejected(_)));
        assert!(negotiator.applied().is_none());
    }

    #[test]
    fn test_cancel_keeps_last_accepted_state() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let mut accept = |_: &CaptureRequest| Ok::<(), ControlRejection>(());
        negotiator.apply_auto(&mut accept).unwrap();

        let cancel = CancelToken::new();
        let token = cancel.clone();
        let mut reject_then_cancel = |_: &CaptureRequest| {
            token.cancel();
            Err::<(), _>(ControlRejection::new("busy"))
        };
        let err = negotiator
            .negotiate_and_apply(&requested(), None, &mut reject_then_cancel, &cancel)
            .unwrap_err();

        assert_eq!(err, ControlError::Cancelled);
        assert_eq!(negotiator.applied().unwrap().mode, ControlMode::Auto);
        assert_eq!(negotiator.current_tier(), CaptureTier::FocusOnlyManual);
    }

    #[test]
    fn test_cancel_token_reset_shared_by_clones() {
        let token = CancelToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_long_exposure_drops_frame_duration() {
        let negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let resolved = ResolvedParams {
            exposure_time_ns: Some(200_000_000),
            max_exposure_ns: 32_333_333,
            frame_duration_ns: 33_333_333,
            ..Default::default()
        };
        let request = negotiator.build_request(CaptureTier::FullManual, &resolved, 30, None);
        assert_eq!(request.frame_duration_ns, None);
    }

    #[test]
    fn test_focus_only_tier_keeps_frozen_wb_and_fps_range() {
        let negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let resolved = ResolvedParams {
            focus_diopters: Some(5.0),
            ..Default::default()
        };
        let request =
            negotiator.build_request(CaptureTier::FocusOnlyManual, &resolved, 30, Some(&frozen()));
        assert_eq!(request.ae_mode, ExposureMode::Auto);
        assert_eq!(request.af_mode, AfMode::Manual);
        assert_eq!(request.focus_distance_diopters, Some(5.0));
        assert_eq!(request.awb_mode, AwbMode::Off);
        assert_eq!(request.target_fps_range, Some(FpsRange::fixed(30)));
    }

    #[test]
    fn test_apply_auto_rewinds_ladder() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        let mut reject_manual = |request: &CaptureRequest| {
            if request.ae_mode == ExposureMode::Manual {
                Err(ControlRejection::new("no manual exposure"))
            } else {
                Ok(())
            }
        };
        negotiator
            .negotiate_and_apply(&requested(), None, &mut reject_manual, &CancelToken::new())
            .unwrap();
        assert_eq!(negotiator.current_tier(), CaptureTier::FocusOnlyManual);

        let state = negotiator.apply_auto(&mut reject_manual).unwrap();
        assert_eq!(state.request.target_fps_range, Some(FpsRange::fixed(30)));
        assert_eq!(state.request.awb_lock, Some(false));
        assert_eq!(negotiator.current_tier(), CaptureTier::FullManual);
    }

    #[test]
    fn test_observe_result_updates_readback() {
        let mut negotiator = ControlNegotiator::new(manual_caps(), ParameterMapper::default());
        negotiator.observe_result(&CaptureResult {
            iso: Some(400),
            ..Default::default()
        });
        assert!(negotiator.applied().is_none());

        let mut accept = |_: &CaptureRequest| Ok::<(), ControlRejection>(());
        negotiator.apply_auto(&mut accept).unwrap();
        negotiator.observe_result(&CaptureResult {
            iso: Some(400),
            exposure_time_ns: Some(8_000_000),
            ..Default::default()
        });
        let readback = negotiator.applied().unwrap().readback;
        assert_eq!(readback.iso, Some(400));
        assert_eq!(readback.exposure_time_ns, Some(8_000_000));
    }
}
