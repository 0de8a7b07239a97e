//! Local planner parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::frame::FrameParams;
use util::params::Validate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the local planner, as loaded from `local_plan.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Params {
    /// Dynamic window search parameters
    pub dwa: DwaParams,

    /// Goal and obstacle frame conversion parameters
    pub frame: FrameParams,
}

/// Limits, resolutions and cost gains of the dynamic window search.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DwaParams {
    // ---- CAPABILITIES ----
    /// Maximum forward speed.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Minimum forward speed, zero to disallow reversing.
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Maximum absolute yaw rate.
    ///
    /// Units: radians/second
    pub max_yaw_rate_rads: f64,

    /// Maximum forward acceleration.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Maximum yaw acceleration.
    ///
    /// Units: radians/second^2
    pub max_yaw_accel_radss: f64,

    // ---- SEARCH ----
    /// Speed grid resolution.
    ///
    /// Units: meters/second
    pub speed_resolution_ms: f64,

    /// Yaw rate grid resolution.
    ///
    /// Units: radians/second
    pub yaw_rate_resolution_rads: f64,

    /// Control period, used both for the dynamic window and as the rollout timestep.
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Length of the rollout.
    ///
    /// Units: seconds
    pub predict_time_s: f64,

    // ---- COST GAINS ----
    pub goal_cost_gain: f64,
    pub speed_cost_gain: f64,
    pub obstacle_cost_gain: f64,
    pub yaw_rate_cost_gain: f64,

    // ---- OUTPUT ----
    /// Floor applied to the speed of every selected command.
    ///
    /// Units: meters/second
    pub min_forward_speed_ms: f64,

    /// Speed assumed for the planning state when no chassis feedback has been received.
    ///
    /// Units: meters/second
    pub initial_speed_ms: f64,

    /// Distance to the end of the reference path within which the reference speed is zeroed.
    ///
    /// Units: meters
    pub goal_stop_distance_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DwaParams {
    /// Number of rollout steps covering the prediction horizon.
    ///
    /// The small tolerance stops horizons which are an exact multiple of `dt_s` (like 3.0 / 0.1)
    /// gaining an extra step from floating point error.
    pub fn num_rollout_steps(&self) -> usize {
        ((self.predict_time_s / self.dt_s) - 1e-9).ceil().max(0.0) as usize
    }
}

impl Default for DwaParams {
    fn default() -> Self {
        Self {
            max_speed_ms: 0.8,
            min_speed_ms: 0.0,
            max_yaw_rate_rads: 90f64.to_radians(),
            max_accel_mss: 0.8,
            max_yaw_accel_radss: 600f64.to_radians(),
            speed_resolution_ms: 0.25,
            yaw_rate_resolution_rads: 1.2f64.to_radians(),
            dt_s: 0.1,
            predict_time_s: 3.0,
            goal_cost_gain: 6.0,
            speed_cost_gain: 10.0,
            obstacle_cost_gain: 20.0,
            yaw_rate_cost_gain: 10.0,
            min_forward_speed_ms: 0.5,
            initial_speed_ms: 0.3,
            goal_stop_distance_m: 0.2,
        }
    }
}

impl Validate for DwaParams {
    fn validate(&self) -> Result<(), String> {
        let all = [
            ("max_speed_ms", self.max_speed_ms),
            ("min_speed_ms", self.min_speed_ms),
            ("max_yaw_rate_rads", self.max_yaw_rate_rads),
            ("max_accel_mss", self.max_accel_mss),
            ("max_yaw_accel_radss", self.max_yaw_accel_radss),
            ("speed_resolution_ms", self.speed_resolution_ms),
            ("yaw_rate_resolution_rads", self.yaw_rate_resolution_rads),
            ("dt_s", self.dt_s),
            ("predict_time_s", self.predict_time_s),
            ("goal_cost_gain", self.goal_cost_gain),
            ("speed_cost_gain", self.speed_cost_gain),
            ("obstacle_cost_gain", self.obstacle_cost_gain),
            ("yaw_rate_cost_gain", self.yaw_rate_cost_gain),
            ("min_forward_speed_ms", self.min_forward_speed_ms),
            ("initial_speed_ms", self.initial_speed_ms),
            ("goal_stop_distance_m", self.goal_stop_distance_m),
        ];

        if let Some((name, _)) = all.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{} must be finite", name));
        }

        if self.min_speed_ms > self.max_speed_ms {
            return Err(format!(
                "min_speed_ms ({}) is greater than max_speed_ms ({})",
                self.min_speed_ms, self.max_speed_ms
            ));
        }

        let non_negative = [
            ("max_yaw_rate_rads", self.max_yaw_rate_rads),
            ("max_accel_mss", self.max_accel_mss),
            ("max_yaw_accel_radss", self.max_yaw_accel_radss),
            ("predict_time_s", self.predict_time_s),
            ("goal_cost_gain", self.goal_cost_gain),
            ("speed_cost_gain", self.speed_cost_gain),
            ("obstacle_cost_gain", self.obstacle_cost_gain),
            ("yaw_rate_cost_gain", self.yaw_rate_cost_gain),
            ("goal_stop_distance_m", self.goal_stop_distance_m),
        ];
        if let Some((name, v)) = non_negative.iter().find(|(_, v)| *v < 0.0) {
            return Err(format!("{} must not be negative, found {}", name, v));
        }

        let positive = [
            ("speed_resolution_ms", self.speed_resolution_ms),
            ("yaw_rate_resolution_rads", self.yaw_rate_resolution_rads),
            ("dt_s", self.dt_s),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(format!("{} must be positive, found {}", name, v));
        }

        Ok(())
    }
}

impl Validate for Params {
    fn validate(&self) -> Result<(), String> {
        self.dwa.validate()?;
        self.frame.validate()
    }
}
