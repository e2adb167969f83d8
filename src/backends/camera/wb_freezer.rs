// SPDX-License-Identifier: GPL-3.0-only

//! White-balance freeze on convergence
//!
//! Forcing AWB off before the auto algorithm has settled gives wrong colour
//! on many devices. While lock mode is active, AWB runs in auto until a
//! capture result reports convergence with usable gains and transform; those
//! values are then frozen once and re-applied with AWB off.

use super::types::{CaptureResult, WhiteBalanceFreeze};
use tracing::{debug, info};

/// Outcome of feeding one capture result to the freezer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreezeUpdate {
    /// Current freeze state, possibly empty
    pub state: Option<WhiteBalanceFreeze>,
    /// Set only on the result that produced the freeze
    pub newly_frozen: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WhiteBalanceFreezer {
    active: bool,
    frozen: Option<WhiteBalanceFreeze>,
}

impl WhiteBalanceFreezer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter or leave lock mode; leaving clears any frozen values
    pub fn set_lock_mode(&mut self, enabled: bool) {
        if !enabled && self.frozen.is_some() {
            debug!("Clearing frozen white balance");
        }
        self.active = enabled;
        if !enabled {
            self.frozen = None;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn on_capture_result(&mut self, result: &CaptureResult) -> FreezeUpdate {
        let newly_frozen = self.active && self.frozen.is_none() && self.try_freeze(result);
        FreezeUpdate {
            state: self.frozen,
            newly_frozen,
        }
    }

    pub fn frozen(&self) -> Option<&WhiteBalanceFreeze> {
        self.frozen.as_ref()
    }

    /// Drop the frozen values but stay in lock mode, so AWB re-converges
    pub fn clear(&mut self) {
        self.frozen = None;
    }

    fn try_freeze(&mut self, result: &CaptureResult) -> bool {
        if !result.awb_state.is_some_and(|s| s.is_settled()) {
            return false;
        }
        let (Some(gains), Some(transform)) = (result.color_gains, result.color_transform) else {
            return false;
        };
        if !gains.is_usable() || !transform.is_usable() {
            return false;
        }

        info!(
            frame = ?result.frame_number,
            red = gains.red,
            blue = gains.blue,
            "White balance converged, freezing"
        );
        self.frozen = Some(WhiteBalanceFreeze { gains, transform });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::{AwbState, ColorGains, ColorTransform};

    const IDENTITY: ColorTransform =
        ColorTransform([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);

    fn result(state: AwbState, red: f32) -> CaptureResult {
        CaptureResult {
            awb_state: Some(state),
            color_gains: Some(ColorGains {
                red,
                green_even: 1.0,
                green_odd: 1.0,
                blue: 1.5,
            }),
            color_transform: Some(IDENTITY),
            ..Default::default()
        }
    }

    #[test]
    fn test_ignored_outside_lock_mode() {
        let mut freezer = WhiteBalanceFreezer::new();
        let update = freezer.on_capture_result(&result(AwbState::Converged, 2.0));
        assert_eq!(update.state, None);
        assert!(!update.newly_frozen);
    }

    #[test]
    fn test_waits_for_convergence() {
        let mut freezer = WhiteBalanceFreezer::new();
        freezer.set_lock_mode(true);
        assert!(!freezer.on_capture_result(&result(AwbState::Searching, 2.0)).newly_frozen);
        let update = freezer.on_capture_result(&result(AwbState::Locked, 2.0));
        assert!(update.newly_frozen);
        assert_eq!(update.state.map(|wb| wb.gains.red), Some(2.0));
    }

    #[test]
    fn test_freezes_exactly_once() {
        let mut freezer = WhiteBalanceFreezer::new();
        freezer.set_lock_mode(true);
        freezer.on_capture_result(&result(AwbState::Converged, 2.0));
        let update = freezer.on_capture_result(&result(AwbState::Converged, 3.0));
        assert!(!update.newly_frozen);
        assert_eq!(freezer.frozen().map(|wb| wb.gains.red), Some(2.0));
    }

    #[test]
    fn test_requires_gains_and_transform() {
        let mut freezer = WhiteBalanceFreezer::new();
        freezer.set_lock_mode(true);
        let mut missing = result(AwbState::Converged, 2.0);
        missing.color_transform = None;
        assert!(!freezer.on_capture_result(&missing).newly_frozen);
        assert!(!freezer.on_capture_result(&result(AwbState::Converged, 0.0)).newly_frozen);
        assert!(freezer.frozen().is_none());
    }

    #[test]
    fn test_leaving_lock_mode_clears() {
        let mut freezer = WhiteBalanceFreezer::new();
        freezer.set_lock_mode(true);
        freezer.on_capture_result(&result(AwbState::Converged, 2.0));
        freezer.set_lock_mode(false);
        assert!(freezer.frozen().is_none());

        freezer.set_lock_mode(true);
        let update = freezer.on_capture_result(&result(AwbState::Converged, 2.4));
        assert!(update.newly_frozen);
    }
}
