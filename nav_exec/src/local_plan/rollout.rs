//! # Trajectory rollout

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use super::DwaParams;
use crate::motion::{VehicleState, VelCmd};
use comms_if::plan;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A predicted trajectory, the first state being the state the prediction started from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<VehicleState>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Simulate `cmd` forward from `init` over the prediction horizon.
    pub fn rollout(init: &VehicleState, cmd: &VelCmd, params: &DwaParams) -> Self {
        let num_steps = params.num_rollout_steps();

        let mut states = Vec::with_capacity(num_steps + 1);
        states.push(*init);

        let mut state = *init;
        for _ in 0..num_steps {
            state = state.step(cmd, params.dt_s);
            states.push(state);
        }

        Self { states }
    }

    /// A trajectory holding only the given state, used when no command could be selected.
    pub fn hold(state: &VehicleState) -> Self {
        Self {
            states: vec![*state],
        }
    }

    pub fn states(&self) -> &[VehicleState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&VehicleState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&VehicleState> {
        self.states.last()
    }

    /// The sample the steering law previews, at the middle of the trajectory.
    pub fn midpoint(&self) -> Option<&VehicleState> {
        self.states.get(self.states.len() / 2)
    }

    /// Convert into the point sequence published to the controller.
    pub fn to_msg(&self) -> plan::Trajectory {
        plan::Trajectory {
            point: self
                .states
                .iter()
                .map(|s| plan::Point { x: s.x_m, y: s.y_m })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rollout_length_and_first() {
        let params = DwaParams::default();
        let init = VehicleState {
            x_m: 1.0,
            y_m: -2.0,
            heading_rad: 0.3,
            speed_ms: 0.3,
            yaw_rate_rads: 0.1,
        };

        for &(v, w) in &[(0.0, 0.0), (0.5, -0.4), (0.8, 1.2), (-0.2, 0.0)] {
            let traj = Trajectory::rollout(&init, &VelCmd::new(v, w), &params);
            assert_eq!(traj.len(), 31);
            assert_eq!(traj.first(), Some(&init));

            // Every later state records the commanded velocity
            for s in &traj.states()[1..] {
                assert_eq!(s.speed_ms, v);
                assert_eq!(s.yaw_rate_rads, w);
            }
        }
    }

    #[test]
    fn test_rollout_straight_line() {
        let params = DwaParams::default();
        let traj = Trajectory::rollout(
            &VehicleState::at_origin(0.5, 0.0),
            &VelCmd::new(0.5, 0.0),
            &params,
        );

        let last = traj.last().unwrap();
        assert!((last.x_m - 1.5).abs() < 1e-9);
        assert_eq!(last.y_m, 0.0);

        let mid = traj.midpoint().unwrap();
        assert!((mid.x_m - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_rollout_turns_left_for_positive_yaw_rate() {
        let params = DwaParams::default();
        let traj = Trajectory::rollout(
            &VehicleState::at_origin(0.5, 0.0),
            &VelCmd::new(0.5, 0.3),
            &params,
        );

        assert!(traj.last().unwrap().y_m > 0.0);
        assert!((traj.last().unwrap().heading_rad - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_hold_and_msg() {
        let s = VehicleState::at_origin(0.0, 0.0);
        let traj = Trajectory::hold(&s);
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.midpoint(), Some(&s));

        let msg = traj.to_msg();
        assert_eq!(msg.point, vec![plan::Point { x: 0.0, y: 0.0 }]);
    }
}
