//! # Localisation Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A pose update from the localisation system.
///
/// The position is given in world units, which are the same units the reference path is given in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LocPose {
    /// UTC timestamp at which the pose was measured
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Position along the world X axis, in world units
    pub x: f64,

    /// Position along the world Y axis, in world units
    pub y: f64,

    /// Heading (angle to the +ve world X axis), in radians
    pub yaw_rad: f64,
}

impl LocPose {
    /// Create a pose stamped with the current time.
    pub fn now(x: f64, y: f64, yaw_rad: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            x,
            y,
            yaw_rad,
        }
    }
}
