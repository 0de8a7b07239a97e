//! Command control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::params::Validate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for command control, as loaded from `cmd_ctrl.toml`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CmdCtrlParams {
    /// Distance between the front and rear axles.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// Steering demands smaller than this are zeroed.
    ///
    /// Units: degrees
    pub steer_deadband_deg: f64,

    /// Steering demands are saturated to +/- this limit.
    ///
    /// Units: degrees
    pub max_steer_deg: f64,

    /// Period of the control loop, also the integration step of the speed error.
    ///
    /// Units: seconds
    pub tick_period_s: f64,

    /// Throttle per unit of reference speed
    pub throttle_ff_gain: f64,

    /// Throttle per unit of speed error
    pub throttle_p_gain: f64,

    /// Throttle per unit of accumulated speed error
    pub throttle_i_gain: f64,

    /// Optional limit on the magnitude of the accumulated speed error. If not set the
    /// accumulation is unbounded.
    ///
    /// Units: meters
    #[serde(default)]
    pub integral_limit: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CmdCtrlParams {
    fn default() -> Self {
        Self {
            wheelbase_m: 0.313,
            steer_deadband_deg: 0.1,
            max_steer_deg: 60.0,
            tick_period_s: 0.05,
            throttle_ff_gain: 30.0,
            throttle_p_gain: 8.0,
            throttle_i_gain: 0.5,
            integral_limit: None,
        }
    }
}

impl Validate for CmdCtrlParams {
    fn validate(&self) -> Result<(), String> {
        let positive = [
            ("wheelbase_m", self.wheelbase_m),
            ("tick_period_s", self.tick_period_s),
            ("max_steer_deg", self.max_steer_deg),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(format!("{} must be positive, found {}", name, v));
        }

        let finite = [
            ("steer_deadband_deg", self.steer_deadband_deg),
            ("throttle_ff_gain", self.throttle_ff_gain),
            ("throttle_p_gain", self.throttle_p_gain),
            ("throttle_i_gain", self.throttle_i_gain),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} must be finite", name));
        }

        if self.steer_deadband_deg < 0.0 {
            return Err(format!(
                "steer_deadband_deg must not be negative, found {}",
                self.steer_deadband_deg
            ));
        }

        if let Some(l) = self.integral_limit {
            if !(l >= 0.0) {
                return Err(format!("integral_limit must not be negative, found {}", l));
            }
        }

        Ok(())
    }
}
