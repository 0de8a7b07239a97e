//! # Simulated vehicle
//!
//! Stands in for the real chassis, localisation and perception so the executable can be driven
//! end to end. The plant is a kinematic bicycle whose speed follows the throttle through a first
//! order lag. It provides:
//!
//! - The pose in the world frame, in world units,
//! - Chassis speed feedback,
//! - Perceived obstacles, as sensor frame bounding boxes of the scenario's obstacles in range.
//!
//! The scenario (start pose, reference path, obstacles) is loaded from `sim.toml`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::frame::WorldObstacle;
use comms_if::{
    eqpt::{
        chassis::{Chassis, ControlCommand},
        loc::LocPose,
        perception::{BBox2D, PerceptionObstacle, PerceptionObstacles},
    },
    plan::Point,
};
use util::{maths::wrap_pi, params::Validate};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulation, as loaded from `sim.toml`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimParams {
    pub vehicle: VehicleParams,
    pub scenario: ScenarioParams,
}

/// Simulated vehicle dynamics.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct VehicleParams {
    /// Units: meters
    pub wheelbase_m: f64,

    /// Steady state speed per unit throttle.
    ///
    /// Units: meters/second
    pub speed_per_throttle_ms: f64,

    /// Time constant of the speed response.
    ///
    /// Units: seconds
    pub speed_time_constant_s: f64,

    /// Maximum achievable speed.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Range within which obstacles ahead of the vehicle are perceived.
    ///
    /// Units: meters
    pub sensor_range_m: f64,
}

/// The situation the vehicle is placed in.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ScenarioParams {
    /// Number of world units in one meter, must match the planner's frame parameters.
    pub scale_per_m: f64,

    /// Starting pose as `[x, y, yaw_rad]`, position in world units.
    pub start_pose: [f64; 3],

    /// Waypoints of the reference path from start to destination, in world units.
    pub waypoints: Vec<[f64; 2]>,

    /// Spacing of the points the waypoints are interpolated into.
    ///
    /// Units: world
    pub path_spacing: f64,

    /// Obstacles which are only known through perception.
    #[serde(default)]
    pub obstacles: Vec<WorldObstacle>,

    /// Duration after which the run is stopped if the destination hasn't been reached.
    ///
    /// Units: seconds
    pub max_duration_s: f64,

    /// Distance from the destination at which the run is complete.
    ///
    /// Units: meters
    pub arrival_distance_m: f64,

    /// Number of control ticks between localisation updates.
    pub pose_period_ticks: u64,
}

/// The simulated vehicle.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    params: SimParams,

    /// Position in meters.
    x_m: f64,
    y_m: f64,

    heading_rad: f64,
    speed_ms: f64,

    /// Simulated time.
    ///
    /// Units: seconds
    time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Validate for SimParams {
    fn validate(&self) -> Result<(), String> {
        let v = &self.vehicle;
        let s = &self.scenario;

        let positive = [
            ("wheelbase_m", v.wheelbase_m),
            ("speed_per_throttle_ms", v.speed_per_throttle_ms),
            ("speed_time_constant_s", v.speed_time_constant_s),
            ("max_speed_ms", v.max_speed_ms),
            ("sensor_range_m", v.sensor_range_m),
            ("scale_per_m", s.scale_per_m),
            ("path_spacing", s.path_spacing),
            ("max_duration_s", s.max_duration_s),
        ];
        if let Some((name, val)) = positive.iter().find(|(_, x)| !(x.is_finite() && *x > 0.0)) {
            return Err(format!("{} must be positive, found {}", name, val));
        }

        if s.waypoints.is_empty() {
            return Err("The scenario must contain at least one waypoint".into());
        }

        if s.pose_period_ticks == 0 {
            return Err("pose_period_ticks must be at least 1".into());
        }

        Ok(())
    }
}

impl ScenarioParams {
    /// Build the reference path by interpolating the waypoints, destination first.
    pub fn reference_path(&self) -> Vec<Point> {
        let mut path = Vec::new();

        for pair in self.waypoints.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let len = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
            let num = (len / self.path_spacing - 1e-9).ceil().max(1.0) as usize;

            for i in 0..num {
                let t = i as f64 / num as f64;
                path.push(Point {
                    x: a[0] + t * (b[0] - a[0]),
                    y: a[1] + t * (b[1] - a[1]),
                });
            }
        }

        if let Some(last) = self.waypoints.last() {
            path.push(Point {
                x: last[0],
                y: last[1],
            });
        }

        path.reverse();
        path
    }

    /// The destination, the final waypoint.
    pub fn destination(&self) -> Option<Point> {
        self.waypoints.last().map(|w| Point { x: w[0], y: w[1] })
    }
}

impl SimVehicle {
    /// Place a stationary vehicle at the scenario's start pose.
    pub fn new(params: SimParams) -> Self {
        let [x, y, yaw] = params.scenario.start_pose;
        let scale = params.scenario.scale_per_m;

        Self {
            x_m: x / scale,
            y_m: y / scale,
            heading_rad: yaw,
            speed_ms: 0.0,
            time_s: 0.0,
            params,
        }
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    /// Advance the vehicle by `dt_s` under the given command.
    pub fn step(&mut self, cmd: &ControlCommand, dt_s: f64) {
        let v = &self.params.vehicle;

        // Position and heading move with the speed at the start of the step
        let yaw_rate_rads = self.speed_ms * cmd.steer_angle_deg.to_radians().tan() / v.wheelbase_m;
        self.x_m += self.speed_ms * self.heading_rad.cos() * dt_s;
        self.y_m += self.speed_ms * self.heading_rad.sin() * dt_s;
        self.heading_rad = wrap_pi(self.heading_rad + yaw_rate_rads * dt_s);

        let target_ms = (cmd.throttle * v.speed_per_throttle_ms).max(0.0).min(v.max_speed_ms);
        let alpha = (dt_s / v.speed_time_constant_s).min(1.0);
        self.speed_ms += alpha * (target_ms - self.speed_ms);

        self.time_s += dt_s;
    }

    /// Current pose in the world frame.
    pub fn pose(&self) -> LocPose {
        let scale = self.params.scenario.scale_per_m;
        LocPose::now(self.x_m * scale, self.y_m * scale, self.heading_rad)
    }

    pub fn chassis(&self) -> Chassis {
        Chassis {
            speed_ms: self.speed_ms,
        }
    }

    /// Distance to a world frame point.
    ///
    /// Units: meters
    pub fn distance_m(&self, point: &Point) -> f64 {
        let scale = self.params.scenario.scale_per_m;
        ((point.x / scale - self.x_m).powi(2) + (point.y / scale - self.y_m).powi(2)).sqrt()
    }

    /// Bounding boxes, in the sensor frame, of the obstacles ahead of the vehicle and in range.
    pub fn perception(&self) -> PerceptionObstacles {
        let scale = self.params.scenario.scale_per_m;
        let (sin, cos) = self.heading_rad.sin_cos();

        let perception_obstacle = self
            .params
            .scenario
            .obstacles
            .iter()
            .enumerate()
            .filter_map(|(i, ob)| {
                let dx = ob.x / scale - self.x_m;
                let dy = ob.y / scale - self.y_m;
                let r = ob.radius / scale;

                // Vehicle frame, x forward and y left
                let fwd = cos * dx + sin * dy;
                let left = -sin * dx + cos * dy;

                if fwd <= 0.0 || (fwd * fwd + left * left).sqrt() > self.params.vehicle.sensor_range_m {
                    return None;
                }

                // Sensor frame has z forward and x to the right
                Some(PerceptionObstacle {
                    id: i as u32,
                    bbox2d: BBox2D {
                        xmin: -left - r,
                        xmax: -left + r,
                        zmin: fwd - r,
                        zmax: fwd + r,
                    },
                })
            })
            .collect();

        PerceptionObstacles {
            perception_obstacle,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
