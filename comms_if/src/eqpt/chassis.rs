//! # Chassis Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Feedback from the chassis.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Chassis {
    /// Measured forward speed of the vehicle.
    ///
    /// Units: meters/second
    pub speed_ms: f64,
}

/// Actuator command sent to the chassis every control tick.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct ControlCommand {
    /// Steering angle demand, positive turns left.
    ///
    /// Units: degrees, range [-60, 60]
    pub steer_angle_deg: f64,

    /// Throttle demand. This value is not saturated.
    pub throttle: f64,
}
