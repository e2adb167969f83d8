// SPDX-License-Identifier: GPL-3.0-only

//! Debounced stability gate
//!
//! One integer of state: the number of consecutive frames whose exposure,
//! focus and motion checks all passed. Any failing frame drops it to zero.

use super::types::GateState;
use tracing::{debug, info};

/// Per-frame pass/fail inputs to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChecks {
    pub exposure_ok: bool,
    pub focus_ok: bool,
    pub motion_ok: bool,
}

impl FrameChecks {
    pub fn all_ok(&self) -> bool {
        self.exposure_ok && self.focus_ok && self.motion_ok
    }
}

#[derive(Debug, Clone)]
pub struct QualityGate {
    streak: u32,
    required: u32,
}

impl QualityGate {
    pub fn new(required: u32) -> Self {
        Self {
            streak: 0,
            required: required.max(1),
        }
    }

    /// Fold one frame into the streak and report the resulting state
    pub fn observe(&mut self, checks: FrameChecks) -> GateState {
        let was_stable = self.is_stable();

        if checks.all_ok() {
            self.streak = self.streak.saturating_add(1);
        } else {
            self.streak = 0;
        }

        let stable = self.is_stable();
        if stable && !was_stable {
            info!(streak = self.streak, "Quality gate stable");
        } else if was_stable && !stable {
            debug!(?checks, "Quality gate lost stability");
        }

        self.state()
    }

    pub fn state(&self) -> GateState {
        if self.is_stable() {
            GateState::Stable
        } else if self.streak == 0 {
            GateState::Idle
        } else {
            GateState::Accumulating(self.streak)
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn is_stable(&self) -> bool {
        self.streak >= self.required
    }

    /// Back to idle; used whenever analysis restarts
    pub fn reset(&mut self) {
        if self.streak > 0 {
            debug!(streak = self.streak, "Quality streak reset");
        }
        self.streak = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS: FrameChecks = FrameChecks {
        exposure_ok: true,
        focus_ok: true,
        motion_ok: true,
    };

    #[test]
    fn test_eleven_then_fail_never_stable() {
        let mut gate = QualityGate::new(12);
        for _ in 0..11 {
            assert_ne!(gate.observe(PASS), GateState::Stable);
        }
        let state = gate.observe(FrameChecks {
            motion_ok: false,
            ..PASS
        });
        assert_eq!(state, GateState::Idle);
        assert_eq!(gate.streak(), 0);
    }

    #[test]
    fn test_twelfth_pass_flips_stable() {
        let mut gate = QualityGate::new(12);
        for i in 1..=11 {
            assert_eq!(gate.observe(PASS), GateState::Accumulating(i));
        }
        assert_eq!(gate.observe(PASS), GateState::Stable);
        assert_eq!(gate.observe(PASS), GateState::Stable);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut gate = QualityGate::new(3);
        for _ in 0..5 {
            gate.observe(PASS);
        }
        assert!(gate.is_stable());
        gate.reset();
        assert_eq!(gate.state(), GateState::Idle);
    }
}
