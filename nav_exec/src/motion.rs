//! # Kinematic motion model
//!
//! Unicycle model used by the local planner to simulate candidate commands. Forward speed and
//! heading rate follow the commanded values exactly, there is no lower level dynamics.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The kinematic state of the vehicle.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position along the X axis.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position along the Y axis.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Angle to the +ve X axis.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Forward speed.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Heading rate, positive anticlockwise.
    ///
    /// Units: radians/second
    pub yaw_rate_rads: f64,
}

/// A velocity command, one point in the planner's search space.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VelCmd {
    /// Units: meters/second
    pub speed_ms: f64,

    /// Units: radians/second
    pub yaw_rate_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VehicleState {
    /// A state at the origin of the vehicle frame, pointing along +X, with the given velocities.
    pub fn at_origin(speed_ms: f64, yaw_rate_rads: f64) -> Self {
        Self {
            speed_ms,
            yaw_rate_rads,
            ..Default::default()
        }
    }

    /// The position of the state as an `[x, y]` pair.
    pub fn position_m(&self) -> [f64; 2] {
        [self.x_m, self.y_m]
    }

    /// Advance the state by one timestep under a constant command.
    ///
    /// The position is advanced along the heading held at the start of the step, then the heading
    /// is advanced. The velocity fields are overwritten with the command, so every state produced
    /// by a rollout records the commanded velocity rather than an observed one.
    pub fn step(&self, cmd: &VelCmd, dt_s: f64) -> Self {
        Self {
            x_m: self.x_m + cmd.speed_ms * self.heading_rad.cos() * dt_s,
            y_m: self.y_m + cmd.speed_ms * self.heading_rad.sin() * dt_s,
            heading_rad: self.heading_rad + cmd.yaw_rate_rads * dt_s,
            speed_ms: cmd.speed_ms,
            yaw_rate_rads: cmd.yaw_rate_rads,
        }
    }
}

impl VelCmd {
    pub fn new(speed_ms: f64, yaw_rate_rads: f64) -> Self {
        Self {
            speed_ms,
            yaw_rate_rads,
        }
    }

    /// The stop command.
    pub fn zero() -> Self {
        Self::default()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
