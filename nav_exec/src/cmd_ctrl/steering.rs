//! # Steering law

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::CmdCtrlParams;
use comms_if::plan::{Point, Trajectory};
use util::maths::{clamp, deadband};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A steering demand and the limits that shaped it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct SteerDemand {
    /// Positive to the left.
    ///
    /// Units: degrees
    pub angle_deg: f64,

    /// The point the demand was computed for, `None` for an empty trajectory.
    pub preview: Option<Point>,

    pub in_deadband: bool,
    pub saturated: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The point of the trajectory the steering law aims through.
pub fn preview_point(traj: &Trajectory) -> Option<Point> {
    traj.point.get(traj.point.len() / 2).copied()
}

/// Steering angle of a bicycle with the given wheelbase on an arc from the origin, tangent to
/// +X, which passes through `point`.
///
/// Units: degrees
pub fn arc_steer_angle_deg(point: &Point, wheelbase_m: f64) -> f64 {
    (2.0 * point.y * wheelbase_m)
        .atan2(point.x * point.x + point.y * point.y)
        .to_degrees()
}

/// Calculate the steering demand for a vehicle frame trajectory.
pub fn steer_demand(traj: &Trajectory, params: &CmdCtrlParams) -> SteerDemand {
    let preview = match preview_point(traj) {
        Some(p) => p,
        None => return SteerDemand::default(),
    };

    let raw_deg = arc_steer_angle_deg(&preview, params.wheelbase_m);
    let angle_deg = clamp(
        deadband(raw_deg, params.steer_deadband_deg),
        -params.max_steer_deg,
        params.max_steer_deg,
    );

    SteerDemand {
        angle_deg,
        preview: Some(preview),
        in_deadband: raw_deg != 0.0 && angle_deg == 0.0,
        saturated: raw_deg.abs() > params.max_steer_deg,
    }
}

/// Signed distance to the first point of the trajectory, negative if it lies behind the vehicle.
///
/// Zero for an empty trajectory.
pub fn lateral_error_m(traj: &Trajectory) -> f64 {
    match traj.point.first() {
        Some(p) => {
            let dist = (p.x * p.x + p.y * p.y).sqrt();
            if p.x >= 0.0 {
                dist
            } else {
                -dist
            }
        }
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn traj(points: &[(f64, f64)]) -> Trajectory {
        Trajectory {
            point: points.iter().map(|&(x, y)| Point { x, y }).collect(),
        }
    }

    #[test]
    fn test_empty_trajectory() {
        let d = steer_demand(&Trajectory::default(), &CmdCtrlParams::default());
        assert_eq!(d, SteerDemand::default());
        assert_eq!(lateral_error_m(&Trajectory::default()), 0.0);
    }

    #[test]
    fn test_preview_at_origin() {
        let d = steer_demand(&traj(&[(0.0, 0.0)]), &CmdCtrlParams::default());
        assert_eq!(d.angle_deg, 0.0);
        assert!(!d.saturated);
    }

    #[test]
    fn test_preview_is_midpoint() {
        let t = traj(&[(0.0, 0.0), (0.5, 0.1), (1.0, 0.2), (1.5, 0.3)]);
        assert_eq!(preview_point(&t), Some(Point { x: 1.0, y: 0.2 }));

        let t = traj(&[(0.0, 0.0), (0.5, 0.1), (1.0, 0.2)]);
        assert_eq!(preview_point(&t), Some(Point { x: 0.5, y: 0.1 }));
    }

    #[test]
    fn test_steer_sign_and_value() {
        let params = CmdCtrlParams::default();

        let left = steer_demand(&traj(&[(0.0, 0.0), (1.0, 0.5), (2.0, 1.0)]), &params);
        let expected = (2.0 * 0.5 * 0.313f64).atan2(1.25).to_degrees();
        assert!((left.angle_deg - expected).abs() < 1e-12);
        assert!(left.angle_deg > 0.0);

        let right = steer_demand(&traj(&[(0.0, 0.0), (1.0, -0.5), (2.0, -1.0)]), &params);
        assert!((right.angle_deg + expected).abs() < 1e-12);
    }

    #[test]
    fn test_deadband_and_saturation() {
        let params = CmdCtrlParams::default();

        let d = steer_demand(&traj(&[(10.0, 0.001)]), &params);
        assert_eq!(d.angle_deg, 0.0);
        assert!(d.in_deadband);

        let d = steer_demand(&traj(&[(0.0, 0.1)]), &params);
        assert_eq!(d.angle_deg, 60.0);
        assert!(d.saturated);

        let d = steer_demand(&traj(&[(0.0, -0.1)]), &params);
        assert_eq!(d.angle_deg, -60.0);
        assert!(d.saturated);
    }

    #[test]
    fn test_lateral_error() {
        assert!((lateral_error_m(&traj(&[(3.0, 4.0)])) - 5.0).abs() < 1e-12);
        assert!((lateral_error_m(&traj(&[(-3.0, 4.0)])) + 5.0).abs() < 1e-12);
    }
}
