//! # Planning Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point of a trajectory or path.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An ordered sequence of points.
///
/// Used both for the global reference path (world units) and for the planner's selected
/// trajectory (vehicle frame, meters).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub point: Vec<Point>,
}

/// The speed reference the planner hands to the controller.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct ControlReference {
    /// Units: meters/second
    pub vehicle_speed_ms: f64,
}
