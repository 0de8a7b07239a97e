//! # Throttle law
//!
//! Feed-forward plus PI on the speed error. The error is accumulated every tick and is never
//! reset implicitly, so a persistent error keeps winding the integral up unless a limit is
//! configured.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::CmdCtrlParams;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Speed controller state.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct SpeedController {
    /// Accumulated speed error.
    ///
    /// Units: meters
    integral: f64,
}

/// A throttle demand and the controller quantities behind it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct ThrottleDemand {
    pub throttle: f64,

    /// Units: meters/second
    pub speed_error_ms: f64,

    /// Accumulated speed error after this tick.
    ///
    /// Units: meters
    pub integral: f64,

    /// The accumulation was held at the configured limit.
    pub integral_limited: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the controller by one tick and get the throttle demand.
    pub fn update(
        &mut self,
        target_speed_ms: f64,
        current_speed_ms: f64,
        params: &CmdCtrlParams,
    ) -> ThrottleDemand {
        let speed_error_ms = target_speed_ms - current_speed_ms;

        let mut integral_limited = false;
        self.integral += speed_error_ms * params.tick_period_s;

        if let Some(limit) = params.integral_limit {
            let limited = clamp(self.integral, -limit, limit);
            integral_limited = limited != self.integral;
            self.integral = limited;
        }

        let throttle = target_speed_ms * params.throttle_ff_gain
            + speed_error_ms * params.throttle_p_gain
            + self.integral * params.throttle_i_gain;

        ThrottleDemand {
            throttle,
            speed_error_ms,
            integral: self.integral,
            integral_limited,
        }
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_single_tick() {
        let params = CmdCtrlParams::default();
        let mut ctrl = SpeedController::new();

        let d = ctrl.update(0.5, 0.3, &params);

        let err = 0.5 - 0.3;
        let integral = 0.05 * err;
        assert!((d.speed_error_ms - err).abs() < 1e-12);
        assert!((d.integral - integral).abs() < 1e-12);
        assert!((d.throttle - (0.5 * 30.0 + err * 8.0 + 0.5 * integral)).abs() < 1e-12);
        assert!(!d.integral_limited);
    }

    #[test]
    fn test_constant_error_winds_up() {
        let params = CmdCtrlParams::default();
        let mut ctrl = SpeedController::new();

        let mut prev = ctrl.update(0.5, 0.0, &params);
        for _ in 0..100 {
            let d = ctrl.update(0.5, 0.0, &params);
            assert!(d.integral > prev.integral);
            assert!(d.throttle > prev.throttle);
            prev = d;
        }

        // 101 ticks of 0.5 m/s error at 20 Hz
        assert!((ctrl.integral() - 101.0 * 0.5 * 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_integral_limit() {
        let mut params = CmdCtrlParams::default();
        params.integral_limit = Some(0.1);
        let mut ctrl = SpeedController::new();

        let mut d = ThrottleDemand::default();
        for _ in 0..20 {
            d = ctrl.update(0.5, 0.0, &params);
        }
        assert_eq!(d.integral, 0.1);
        assert!(d.integral_limited);

        // Negative error unwinds straight away
        let d = ctrl.update(0.0, 0.5, &params);
        assert!(d.integral < 0.1);
        assert!(!d.integral_limited);
    }

    #[test]
    fn test_zero_reference() {
        let params = CmdCtrlParams::default();
        let mut ctrl = SpeedController::new();

        let d = ctrl.update(0.0, 0.0, &params);
        assert_eq!(d.throttle, 0.0);
    }
}
