//! # Perception Communications Module
//!
//! Obstacle detections are given as axis-aligned boxes in the sensor frame, where Z points
//! forwards out of the sensor and X points to the right.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A box in the sensor's X-Z plane.
///
/// Units: meters
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct BBox2D {
    pub xmin: f64,
    pub xmax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

/// A single detected obstacle.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct PerceptionObstacle {
    pub id: u32,
    pub bbox2d: BBox2D,
}

/// The full set of obstacles detected in one perception cycle.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PerceptionObstacles {
    pub perception_obstacle: Vec<PerceptionObstacle>,
}
