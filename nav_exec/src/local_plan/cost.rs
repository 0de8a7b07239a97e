//! # Trajectory cost evaluation
//!
//! Each candidate trajectory is scored by four independent terms, each multiplied by its gain:
//!
//! - goal: distance from the end of the trajectory to the goal,
//! - speed: shortfall of the final speed from the maximum speed,
//! - obstacle: reciprocal of the closest approach to any obstacle, or infinite on collision,
//! - yaw rate: change in yaw rate from the previously selected command.
//!
//! Lower is better. The gains are applied here and only here, the total is the plain sum.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::{DwaParams, Goal, Obstacle, Trajectory};
use crate::motion::VelCmd;
use util::maths::norm;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Only every n-th trajectory sample is checked against the obstacles.
pub const OBSTACLE_CHECK_STRIDE: usize = 2;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The gained cost terms of a single candidate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub goal: f64,
    pub speed: f64,
    pub obstacle: f64,
    pub yaw_rate: f64,
}

/// Scores trajectories against one cycle's goal, obstacles and previous command.
pub struct CostEvaluator<'a> {
    params: &'a DwaParams,
    goal: &'a Goal,
    obstacles: &'a [Obstacle],
    prev_yaw_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CostBreakdown {
    /// Sum of the terms. Infinite if the trajectory collides.
    pub fn total(&self) -> f64 {
        self.goal + self.speed + self.obstacle + self.yaw_rate
    }

    pub fn is_collision(&self) -> bool {
        self.obstacle == std::f64::INFINITY
    }
}

impl<'a> CostEvaluator<'a> {
    pub fn new(
        params: &'a DwaParams,
        goal: &'a Goal,
        obstacles: &'a [Obstacle],
        prev_yaw_rate_rads: f64,
    ) -> Self {
        Self {
            params,
            goal,
            obstacles,
            prev_yaw_rate_rads,
        }
    }

    /// Score the trajectory produced by `cmd`.
    pub fn evaluate(&self, traj: &Trajectory, cmd: &VelCmd) -> CostBreakdown {
        CostBreakdown {
            goal: goal_cost(traj, self.goal, self.params),
            speed: speed_cost(traj, self.params),
            obstacle: obstacle_cost(traj, self.obstacles, self.params),
            yaw_rate: yaw_rate_cost(cmd, self.prev_yaw_rate_rads, self.params),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Distance between the end of the trajectory and the goal.
pub fn goal_cost(traj: &Trajectory, goal: &Goal, params: &DwaParams) -> f64 {
    match traj.last() {
        Some(s) => params.goal_cost_gain * norm(&s.position_m(), &goal.position_m()),
        None => std::f64::INFINITY,
    }
}

/// Shortfall of the trajectory's final speed from the maximum speed.
pub fn speed_cost(traj: &Trajectory, params: &DwaParams) -> f64 {
    match traj.last() {
        Some(s) => params.speed_cost_gain * (params.max_speed_ms - s.speed_ms),
        None => std::f64::INFINITY,
    }
}

/// Obstacle proximity cost.
///
/// Zero if there are no obstacles. Infinite if any checked sample lies within an obstacle's
/// radius, whatever the gain. Otherwise the gain over the closest centre distance seen.
pub fn obstacle_cost(traj: &Trajectory, obstacles: &[Obstacle], params: &DwaParams) -> f64 {
    if obstacles.is_empty() {
        return 0.0;
    }

    let mut min_dist_m = std::f64::INFINITY;

    for state in traj.states().iter().step_by(OBSTACLE_CHECK_STRIDE) {
        for ob in obstacles {
            let dist_m = norm(&state.position_m(), &ob.position_m());

            if dist_m <= ob.radius_m {
                return std::f64::INFINITY;
            }

            min_dist_m = min_dist_m.min(dist_m);
        }
    }

    params.obstacle_cost_gain / min_dist_m
}

/// Change in yaw rate from the previous cycle's command.
pub fn yaw_rate_cost(cmd: &VelCmd, prev_yaw_rate_rads: f64, params: &DwaParams) -> f64 {
    params.yaw_rate_cost_gain * (cmd.yaw_rate_rads - prev_yaw_rate_rads).abs()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
