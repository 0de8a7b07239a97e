//! # Dynamic window
//!
//! The dynamic window is the rectangle of (speed, yaw rate) pairs which the vehicle can reach in
//! one control period, intersected with the vehicle's absolute limits.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::DwaParams;
use crate::motion::VehicleState;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Admissible velocity rectangle for the next cycle.
///
/// Both intervals are closed and never inverted, although either may be a single point.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DynamicWindow {
    pub speed_min_ms: f64,
    pub speed_max_ms: f64,
    pub yaw_rate_min_rads: f64,
    pub yaw_rate_max_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DynamicWindow {
    /// Calculate the dynamic window for the given state.
    ///
    /// Only the velocity fields of `state` are used.
    pub fn calculate(state: &VehicleState, params: &DwaParams) -> Self {
        let dv = params.max_accel_mss * params.dt_s;
        let dw = params.max_yaw_accel_radss * params.dt_s;

        let (speed_min_ms, speed_max_ms) = intersect(
            (params.min_speed_ms, params.max_speed_ms),
            (state.speed_ms - dv, state.speed_ms + dv),
        );
        let (yaw_rate_min_rads, yaw_rate_max_rads) = intersect(
            (-params.max_yaw_rate_rads, params.max_yaw_rate_rads),
            (state.yaw_rate_rads - dw, state.yaw_rate_rads + dw),
        );

        Self {
            speed_min_ms,
            speed_max_ms,
            yaw_rate_min_rads,
            yaw_rate_max_rads,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Intersect the capability interval with the reachable interval.
///
/// If the two do not overlap the result collapses onto the capability edge nearest the reachable
/// interval, which is where the vehicle will be braking or accelerating towards.
fn intersect(limits: (f64, f64), reachable: (f64, f64)) -> (f64, f64) {
    let lo = limits.0.max(reachable.0);
    let hi = limits.1.min(reachable.1);

    if lo <= hi {
        (lo, hi)
    } else if reachable.0 > limits.1 {
        (limits.1, limits.1)
    } else {
        (limits.0, limits.0)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
