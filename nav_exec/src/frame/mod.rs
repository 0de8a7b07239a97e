//! # Frame conversion module
//!
//! The pose, the reference path and configured obstacles are all expressed in the world frame,
//! whose units are map units (`scale_per_m` of them to the meter). The planner works in the
//! vehicle frame: meters, origin at the vehicle, +X along the heading and +Y to the left.
//!
//! Perceived obstacles arrive in the sensor frame instead, with Z forward and X to the right, in
//! meters. Those only need their axes swapping.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};

pub use params::*;

use crate::local_plan::{Goal, Obstacle};
use comms_if::{
    eqpt::{loc::LocPose, perception::BBox2D},
    plan::Point,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts world frame quantities into the vehicle frame at a particular pose.
pub struct FrameTransformer<'a> {
    params: &'a FrameParams,

    /// Vehicle position in the world.
    ///
    /// Units: world
    origin: Vector2<f64>,

    /// Rotation from world axes into vehicle axes.
    world_to_vehicle: Rotation2<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> FrameTransformer<'a> {
    pub fn new(params: &'a FrameParams, pose: &LocPose) -> Self {
        Self {
            params,
            origin: Vector2::new(pose.x, pose.y),
            world_to_vehicle: Rotation2::new(-pose.yaw_rad),
        }
    }

    /// Convert a world frame point into the vehicle frame.
    pub fn to_vehicle(&self, x: f64, y: f64) -> [f64; 2] {
        let v = self.world_to_vehicle * ((Vector2::new(x, y) - self.origin) / self.params.scale_per_m);
        [v[0], v[1]]
    }

    /// Distance from the vehicle to a world frame point.
    ///
    /// Units: meters
    pub fn distance_m(&self, x: f64, y: f64) -> f64 {
        (Vector2::new(x, y) - self.origin).norm() / self.params.scale_per_m
    }

    /// Index of the path point closest to the vehicle, `None` for an empty path or for a pose
    /// which isn't finite.
    ///
    /// Where several points are equally close the last of them is chosen.
    pub fn nearest_index(&self, path: &[Point]) -> Option<usize> {
        let mut nearest = None;
        let mut min_dist = std::f64::INFINITY;

        for (i, p) in path.iter().enumerate() {
            let dist = (Vector2::new(p.x, p.y) - self.origin).norm();
            if dist <= min_dist {
                min_dist = dist;
                nearest = Some(i);
            }
        }

        nearest
    }

    /// Index of the lookahead point, `lookahead_offset` points back from the nearest point.
    ///
    /// Paths are ordered with the destination first, so stepping back moves towards the end of
    /// the path. Saturates at the first point.
    pub fn lookahead_index(&self, path: &[Point]) -> Option<usize> {
        self.nearest_index(path)
            .map(|i| i.saturating_sub(self.params.lookahead_offset))
    }

    /// The planner goal for the given path.
    ///
    /// An empty path gives a goal at the vehicle's own position.
    pub fn goal(&self, path: &[Point]) -> Goal {
        match self.lookahead_index(path) {
            Some(i) => {
                let [x, y] = self.to_vehicle(path[i].x, path[i].y);
                Goal::new(x, y)
            }
            None => Goal::default(),
        }
    }

    pub fn world_obstacle(&self, ob: &WorldObstacle) -> Obstacle {
        let [x, y] = self.to_vehicle(ob.x, ob.y);
        Obstacle::new(x, y, ob.radius / self.params.scale_per_m)
    }

    /// Build the full obstacle set: the configured world obstacles followed by the perceived ones.
    pub fn obstacles<'b, I>(&self, perceived: I) -> Vec<Obstacle>
    where
        I: IntoIterator<Item = &'b BBox2D>,
    {
        self.params
            .world_obstacles
            .iter()
            .map(|ob| self.world_obstacle(ob))
            .chain(
                perceived
                    .into_iter()
                    .map(|b| Obstacle::from_bbox(b, self.params.perceived_obstacle_radius_m)),
            )
            .collect()
    }
}

impl Obstacle {
    /// Convert a sensor frame bounding box into a vehicle frame obstacle centred on the box.
    pub fn from_bbox(bbox: &BBox2D, radius_m: f64) -> Self {
        Obstacle::new(
            0.5 * (bbox.zmin + bbox.zmax),
            -0.5 * (bbox.xmin + bbox.xmax),
            radius_m,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const SCALE: f64 = 144.9;

    fn pose(x: f64, y: f64, yaw_rad: f64) -> LocPose {
        LocPose::now(x, y, yaw_rad)
    }

    fn assert_near(a: [f64; 2], b: [f64; 2]) {
        assert!(
            (a[0] - b[0]).abs() < 1e-9 && (a[1] - b[1]).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    /// A straight path along +X, destination first.
    fn path_x(num: usize) -> Vec<Point> {
        (0..num)
            .rev()
            .map(|i| Point {
                x: i as f64 * 10.0,
                y: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_to_vehicle() {
        let params = FrameParams::default();

        // Facing +X, no rotation
        let ft = FrameTransformer::new(&params, &pose(100.0, 50.0, 0.0));
        assert_near(ft.to_vehicle(100.0 + SCALE, 50.0), [1.0, 0.0]);
        assert_near(ft.to_vehicle(100.0, 50.0 + 2.0 * SCALE), [0.0, 2.0]);

        // Facing +Y, so world +Y is ahead and world -X is to the left
        let ft = FrameTransformer::new(&params, &pose(100.0, 50.0, FRAC_PI_2));
        assert_near(ft.to_vehicle(100.0, 50.0 + SCALE), [1.0, 0.0]);
        assert_near(ft.to_vehicle(100.0 - SCALE, 50.0), [0.0, 1.0]);

        assert!((ft.distance_m(100.0 + 3.0 * SCALE, 50.0 + 4.0 * SCALE) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_lookahead_goal() {
        let params = FrameParams::default();
        let path = path_x(20);

        // Nearest point is the one at x = 30, index 16, so the goal is index 8 at x = 110
        let ft = FrameTransformer::new(&params, &pose(31.0, 0.0, 0.0));
        assert_eq!(ft.nearest_index(&path), Some(16));
        assert_eq!(ft.lookahead_index(&path), Some(8));
        assert_near(ft.goal(&path).position_m(), [(110.0 - 31.0) / SCALE, 0.0]);
    }

    #[test]
    fn test_equidistant_points_pick_last() {
        let params = FrameParams::default();
        let path = vec![Point { x: 10.0, y: 0.0 }, Point { x: -10.0, y: 0.0 }];

        let ft = FrameTransformer::new(&params, &pose(0.0, 0.0, 0.0));
        assert_eq!(ft.nearest_index(&path), Some(1));
    }

    #[test]
    fn test_short_path_clamps_to_first_point() {
        let params = FrameParams::default();
        let path = path_x(5);

        // Vehicle at the far end of the path, well inside the lookahead offset
        let ft = FrameTransformer::new(&params, &pose(0.0, 0.0, 0.0));
        assert_eq!(ft.lookahead_index(&path), Some(0));
        assert_near(ft.goal(&path).position_m(), [40.0 / SCALE, 0.0]);
    }

    #[test]
    fn test_empty_path() {
        let params = FrameParams::default();
        let ft = FrameTransformer::new(&params, &pose(10.0, 10.0, 1.0));

        assert_eq!(ft.lookahead_index(&[]), None);
        assert_eq!(ft.goal(&[]), Goal::default());
    }

    #[test]
    fn test_nan_pose() {
        let params = FrameParams::default();
        let ft = FrameTransformer::new(&params, &pose(std::f64::NAN, 10.0, 0.0));

        assert_eq!(ft.nearest_index(&path_x(5)), None);
        assert_eq!(ft.goal(&path_x(5)), Goal::default());
    }

    #[test]
    fn test_obstacles() {
        let mut params = FrameParams::default();
        params.world_obstacles.push(WorldObstacle {
            x: 2.0 * SCALE,
            y: 0.0,
            radius: 0.5 * SCALE,
        });

        let bbox = BBox2D {
            xmin: -0.1,
            xmax: 0.3,
            zmin: 1.0,
            zmax: 2.0,
        };

        let ft = FrameTransformer::new(&params, &pose(0.0, 0.0, 0.0));
        let obs = ft.obstacles(&[bbox]);

        assert_eq!(obs.len(), 2);
        assert_near(obs[0].position_m(), [2.0, 0.0]);
        assert!((obs[0].radius_m - 0.5).abs() < 1e-12);

        assert_near(obs[1].position_m(), [1.5, -0.1]);
        assert_eq!(obs[1].radius_m, 0.2);
    }

    #[test]
    fn test_validate() {
        use util::params::Validate;

        assert!(FrameParams::default().validate().is_ok());

        let mut p = FrameParams::default();
        p.scale_per_m = 0.0;
        assert!(p.validate().is_err());

        let mut p = FrameParams::default();
        p.world_obstacles.push(WorldObstacle {
            x: 0.0,
            y: 0.0,
            radius: -1.0,
        });
        assert!(p.validate().is_err());
    }
}
