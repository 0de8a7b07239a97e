//! # Local planner module
//!
//! The local planner picks the velocity command for the next control period using the Dynamic
//! Window Approach. Each cycle it:
//!
//!  1. Bounds the commands the vehicle can reach within one period (the dynamic window),
//!  1. Rolls out a constant command trajectory for every sample on a grid over that window,
//!  1. Scores each trajectory against the goal, the speed limit, the obstacles and the previous
//!     command, and
//!  1. Emits the cheapest trajectory's command.
//!
//! All planning happens in the vehicle frame: the vehicle sits at the origin with x forward and
//! y to the left. Conversion of the goal and obstacles from the world is handled by the
//! [`crate::frame`] module before they reach the planner.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cost;
mod params;
mod rollout;
mod selector;
mod state;
mod window;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

pub use cost::*;
pub use params::*;
pub use rollout::*;
pub use selector::*;
pub use state::*;
pub use window::*;

use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The point the planner is steering towards, in the vehicle frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub x_m: f64,
    pub y_m: f64,
}

/// A circular obstacle in the vehicle frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x_m: f64,
    pub y_m: f64,

    /// Clearance radius around the centre.
    ///
    /// Units: meters
    pub radius_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during local planning.
#[derive(Debug, thiserror::Error)]
pub enum LocalPlanError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not archive the status report: {0}")]
    ArchiveError(ArchiveError),

    #[error("Attempted to plan before the planner was initialised")]
    NotInit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Goal {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    pub fn position_m(&self) -> [f64; 2] {
        [self.x_m, self.y_m]
    }
}

impl Obstacle {
    pub fn new(x_m: f64, y_m: f64, radius_m: f64) -> Self {
        Self { x_m, y_m, radius_m }
    }

    pub fn position_m(&self) -> [f64; 2] {
        [self.x_m, self.y_m]
    }
}
