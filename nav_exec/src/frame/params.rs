//! Frame conversion parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use util::params::Validate;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the world to vehicle frame conversion, the `[frame]` table of `local_plan.toml`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FrameParams {
    /// Number of world (map) units in one meter.
    pub scale_per_m: f64,

    /// Number of path points to step back from the nearest point when choosing the goal.
    pub lookahead_offset: usize,

    /// Clearance radius given to every perceived obstacle.
    ///
    /// Units: meters
    pub perceived_obstacle_radius_m: f64,

    /// Static obstacles known in the world frame, converted into the vehicle frame every cycle.
    #[serde(default)]
    pub world_obstacles: Vec<WorldObstacle>,
}

/// An obstacle fixed in the world frame.
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct WorldObstacle {
    /// Units: world
    pub x: f64,

    /// Units: world
    pub y: f64,

    /// Units: world
    pub radius: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            scale_per_m: 144.9,
            lookahead_offset: 8,
            perceived_obstacle_radius_m: 0.2,
            world_obstacles: Vec::new(),
        }
    }
}

impl Validate for FrameParams {
    fn validate(&self) -> Result<(), String> {
        if !(self.scale_per_m.is_finite() && self.scale_per_m > 0.0) {
            return Err(format!(
                "scale_per_m must be positive and finite, found {}",
                self.scale_per_m
            ));
        }

        if !(self.perceived_obstacle_radius_m.is_finite() && self.perceived_obstacle_radius_m >= 0.0)
        {
            return Err(format!(
                "perceived_obstacle_radius_m must not be negative, found {}",
                self.perceived_obstacle_radius_m
            ));
        }

        for (i, ob) in self.world_obstacles.iter().enumerate() {
            if !(ob.x.is_finite() && ob.y.is_finite() && ob.radius.is_finite()) || ob.radius < 0.0 {
                return Err(format!("world obstacle {} is invalid: {:?}", i, ob));
            }
        }

        Ok(())
    }
}
