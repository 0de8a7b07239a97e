//! # Command selection
//!
//! Grid search over the dynamic window. Every (speed, yaw rate) pair on the grid is rolled out
//! and scored, and the cheapest collision free candidate wins. The search is exhaustive rather
//! than gradient based since the cost surface is discontinuous wherever a trajectory starts to
//! touch an obstacle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{CostBreakdown, CostEvaluator, DwaParams, DynamicWindow, Goal, Obstacle, Trajectory};
use crate::motion::{VehicleState, VelCmd};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planner memory carried from one cycle to the next.
///
/// Owned by the caller, passed into [`select`] and handed back in the [`Selection`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerState {
    /// Yaw rate of the previously emitted command.
    pub prev_yaw_rate_rads: f64,
}

/// The result of one selection.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    /// The command to execute.
    pub cmd: VelCmd,

    /// The predicted trajectory of the selected candidate.
    pub traj: Trajectory,

    /// Cost of the best candidate, `None` if no candidate was evaluated.
    pub cost: Option<CostBreakdown>,

    pub outcome: SelectOutcome,

    /// Number of candidates evaluated.
    pub num_candidates: usize,

    /// The planner state for the next cycle.
    pub next_state: PlannerState,
}

/// How the selection was resolved.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectOutcome {
    /// A collision free candidate was selected.
    Selected,

    /// Every candidate collides (or has no defined cost), the vehicle is held.
    AllCollide,

    /// The window produced no grid points, the vehicle is held.
    EmptyWindow,
}

struct Candidate {
    cmd: VelCmd,
    traj: Trajectory,
    cost: CostBreakdown,
    total: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the minimum cost command within the window.
///
/// Ties are resolved in favour of the first candidate in scan order (speed outer, yaw rate inner,
/// both ascending). A selected command's speed is raised to `min_forward_speed_ms` if below it.
/// If nothing can be selected the zero command is emitted with a trajectory holding `state`.
pub fn select(
    state: &VehicleState,
    window: &DynamicWindow,
    params: &DwaParams,
    goal: &Goal,
    obstacles: &[Obstacle],
    planner_state: PlannerState,
) -> Selection {
    let evaluator = CostEvaluator::new(params, goal, obstacles, planner_state.prev_yaw_rate_rads);

    let mut best: Option<Candidate> = None;
    let mut num_candidates = 0;

    for speed_ms in axis_samples(
        window.speed_min_ms,
        window.speed_max_ms,
        params.speed_resolution_ms,
    ) {
        for yaw_rate_rads in axis_samples(
            window.yaw_rate_min_rads,
            window.yaw_rate_max_rads,
            params.yaw_rate_resolution_rads,
        ) {
            num_candidates += 1;

            let cmd = VelCmd::new(speed_ms, yaw_rate_rads);
            let traj = Trajectory::rollout(state, &cmd, params);
            let cost = evaluator.evaluate(&traj, &cmd);

            // An undefined cost is as bad as a collision
            let total = match cost.total() {
                t if t.is_nan() => std::f64::INFINITY,
                t => t,
            };

            let better = match best {
                Some(ref b) => total < b.total,
                None => true,
            };

            if better {
                best = Some(Candidate {
                    cmd,
                    traj,
                    cost,
                    total,
                });
            }
        }
    }

    match best {
        Some(b) if b.total.is_finite() => {
            let mut cmd = b.cmd;
            if cmd.speed_ms < params.min_forward_speed_ms {
                cmd.speed_ms = params.min_forward_speed_ms;
            }

            debug!(
                "Selected v = {:.3} m/s, w = {:.4} rad/s from {} candidates (cost {:.3}: {:?})",
                cmd.speed_ms, cmd.yaw_rate_rads, num_candidates, b.total, b.cost
            );

            Selection {
                cmd,
                traj: b.traj,
                cost: Some(b.cost),
                outcome: SelectOutcome::Selected,
                num_candidates,
                next_state: PlannerState {
                    prev_yaw_rate_rads: cmd.yaw_rate_rads,
                },
            }
        }
        Some(b) => {
            warn!(
                "All {} candidates collide, holding position",
                num_candidates
            );
            hold(state, Some(b.cost), SelectOutcome::AllCollide, num_candidates)
        }
        None => {
            warn!("Dynamic window {:?} contains no candidates, holding position", window);
            hold(state, None, SelectOutcome::EmptyWindow, num_candidates)
        }
    }
}

/// Build the zero command selection.
fn hold(
    state: &VehicleState,
    cost: Option<CostBreakdown>,
    outcome: SelectOutcome,
    num_candidates: usize,
) -> Selection {
    let cmd = VelCmd::zero();

    Selection {
        cmd,
        traj: Trajectory::hold(state),
        cost,
        outcome,
        num_candidates,
        next_state: PlannerState {
            prev_yaw_rate_rads: cmd.yaw_rate_rads,
        },
    }
}

/// Grid samples `min + i * res` strictly below `max`.
///
/// An interval collapsed to a single point yields that point. Inverted or undefined intervals
/// yield nothing.
fn axis_samples(min: f64, max: f64, res: f64) -> Box<dyn Iterator<Item = f64>> {
    if min == max {
        return Box::new(std::iter::once(min));
    }

    // Float to int casts saturate, so negative and NaN counts become zero
    let num = ((max - min) / res).ceil() as usize;

    Box::new(
        (0..num)
            .map(move |i| min + (i as f64) * res)
            .take_while(move |v| *v < max),
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_plan::obstacle_cost;

    fn plan(
        state: &VehicleState,
        params: &DwaParams,
        goal: &Goal,
        obstacles: &[Obstacle],
        planner_state: PlannerState,
    ) -> Selection {
        let window = DynamicWindow::calculate(state, params);
        select(state, &window, params, goal, obstacles, planner_state)
    }

    #[test]
    fn test_axis_samples() {
        let s: Vec<f64> = axis_samples(0.0, 1.0, 0.25).collect();
        assert_eq!(s, vec![0.0, 0.25, 0.5, 0.75]);

        let s: Vec<f64> = axis_samples(0.22, 0.38, 0.25).collect();
        assert_eq!(s, vec![0.22]);

        let s: Vec<f64> = axis_samples(0.8, 0.8, 0.25).collect();
        assert_eq!(s, vec![0.8]);

        assert_eq!(axis_samples(0.5, 0.4, 0.1).count(), 0);
        assert_eq!(axis_samples(std::f64::NAN, 0.4, 0.1).count(), 0);
    }

    /// No obstacles and a goal straight ahead, the fastest straight command is chosen.
    #[test]
    fn test_free_space_goal_ahead() {
        let mut params = DwaParams::default();
        params.speed_resolution_ms = 0.02;

        let state = VehicleState::at_origin(0.8, 0.0);
        let sel = plan(&state, &params, &Goal::new(1.0, 0.0), &[], PlannerState::default());

        assert_eq!(sel.outcome, SelectOutcome::Selected);
        assert!(sel.cmd.speed_ms >= 0.7, "speed {}", sel.cmd.speed_ms);
        assert!(sel.cmd.yaw_rate_rads.abs() <= params.yaw_rate_resolution_rads);

        let last = sel.traj.last().unwrap();
        assert!(last.x_m > 1.0);
        assert!(last.y_m.abs() < 0.1);
    }

    /// An obstacle on the straight line to the goal forces a turning command which clears it.
    #[test]
    fn test_obstacle_on_path_is_avoided() {
        let params = DwaParams::default();
        let obstacles = [Obstacle::new(1.0, 0.0, 0.3)];
        let state = VehicleState::at_origin(0.5, 0.0);

        let sel = plan(&state, &params, &Goal::new(2.0, 0.0), &obstacles, PlannerState::default());

        assert_eq!(sel.outcome, SelectOutcome::Selected);
        assert!(obstacle_cost(&sel.traj, &obstacles, &params).is_finite());
        assert!(sel.cmd.yaw_rate_rads.abs() > 0.1);
        for s in sel.traj.states() {
            let d = ((s.x_m - 1.0).powi(2) + s.y_m.powi(2)).sqrt();
            assert!(d > 0.25, "trajectory passes {} m from the obstacle", d);
        }

        // Straight ahead would have collided
        let straight = Trajectory::rollout(&state, &VelCmd::new(sel.traj.states()[1].speed_ms, 0.0), &params);
        assert_eq!(obstacle_cost(&straight, &obstacles, &params), std::f64::INFINITY);
    }

    #[test]
    fn test_ties_keep_first_in_scan_order() {
        let mut params = DwaParams::default();
        params.goal_cost_gain = 0.0;
        params.speed_cost_gain = 0.0;
        params.obstacle_cost_gain = 0.0;
        params.yaw_rate_cost_gain = 0.0;

        let state = VehicleState::at_origin(0.3, 0.0);
        let window = DynamicWindow::calculate(&state, &params);
        let sel = select(&state, &window, &params, &Goal::new(1.0, 0.0), &[], PlannerState::default());

        assert_eq!(sel.outcome, SelectOutcome::Selected);
        assert_eq!(sel.cmd.yaw_rate_rads, window.yaw_rate_min_rads);
        assert_eq!(sel.traj.states()[1].speed_ms, window.speed_min_ms);
    }

    #[test]
    fn test_speed_floor_and_planner_state() {
        let params = DwaParams::default();
        let goal = Goal::new(0.5, 0.5);
        let mut planner_state = PlannerState::default();

        for &(v, w) in &[(0.0, 0.0), (0.3, 0.0), (0.1, 0.8), (0.8, -1.0), (0.45, 0.2)] {
            let state = VehicleState::at_origin(v, w);
            let sel = plan(&state, &params, &goal, &[], planner_state);

            assert_eq!(sel.outcome, SelectOutcome::Selected);
            assert!(sel.cmd.speed_ms >= params.min_forward_speed_ms);
            assert_eq!(sel.next_state.prev_yaw_rate_rads, sel.cmd.yaw_rate_rads);

            planner_state = sel.next_state;
        }
    }

    #[test]
    fn test_smoothness_uses_previous_yaw_rate() {
        let mut params = DwaParams::default();
        params.goal_cost_gain = 0.0;

        // With only the speed and smoothness terms the previous yaw rate is the best choice
        let state = VehicleState::at_origin(0.3, 0.2);
        let sel = plan(
            &state,
            &params,
            &Goal::new(1.0, 0.0),
            &[],
            PlannerState {
                prev_yaw_rate_rads: 0.2,
            },
        );

        assert!((sel.cmd.yaw_rate_rads - 0.2).abs() <= params.yaw_rate_resolution_rads);
    }

    #[test]
    fn test_all_candidates_collide() {
        let params = DwaParams::default();
        let state = VehicleState::at_origin(0.3, 0.0);

        // The start point itself is inside the obstacle
        let sel = plan(
            &state,
            &params,
            &Goal::new(1.0, 0.0),
            &[Obstacle::new(0.0, 0.0, 0.5)],
            PlannerState {
                prev_yaw_rate_rads: 0.4,
            },
        );

        assert_eq!(sel.outcome, SelectOutcome::AllCollide);
        assert!(sel.num_candidates > 0);
        assert_eq!(sel.cmd, VelCmd::zero());
        assert_eq!(sel.traj.states(), &[state]);
        assert_eq!(sel.next_state.prev_yaw_rate_rads, 0.0);
        assert!(sel.cost.unwrap().is_collision());
    }

    #[test]
    fn test_empty_window() {
        let params = DwaParams::default();
        let state = VehicleState::at_origin(0.3, 0.0);
        let window = DynamicWindow {
            speed_min_ms: 0.5,
            speed_max_ms: 0.4,
            yaw_rate_min_rads: -0.1,
            yaw_rate_max_rads: 0.1,
        };

        let sel = select(&state, &window, &params, &Goal::new(1.0, 0.0), &[], PlannerState::default());

        assert_eq!(sel.outcome, SelectOutcome::EmptyWindow);
        assert_eq!(sel.num_candidates, 0);
        assert_eq!(sel.cmd, VelCmd::zero());
        assert!(sel.cost.is_none());
        assert_eq!(sel.traj.len(), 1);
    }
}
