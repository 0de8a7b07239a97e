//! Implementations for the LocalPlanner state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::*;
use crate::{
    frame::FrameTransformer,
    motion::{VehicleState, VelCmd},
};
use comms_if::{
    eqpt::{chassis::Chassis, loc::LocPose, perception::PerceptionObstacles},
    plan::{ControlReference, Point},
};
use util::{
    archive::Archiver,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Local planner module state
#[derive(Default)]
pub struct LocalPlanner {
    params: Params,

    /// True once parameters have been set, either by `init` or `new`.
    initialised: bool,

    planner_state: PlannerState,

    /// Number of completed planning cycles
    num_cycles: u64,

    arch_report: Option<Archiver>,
}

/// Input data to the local planner.
#[derive(Debug, Clone)]
pub struct InputData {
    /// Current pose in the world frame.
    pub pose: LocPose,

    /// Reference path in the world frame, destination first.
    pub path: Vec<Point>,

    /// Latest perceived obstacles.
    pub perception: PerceptionObstacles,

    /// Latest chassis feedback, or `None` if none has been received yet.
    pub chassis: Option<Chassis>,
}

/// Output of one planning cycle.
#[derive(Debug, Clone, Serialize)]
pub struct OutputData {
    /// The selected command.
    pub cmd: VelCmd,

    /// The predicted trajectory of the command, in the vehicle frame at the time of planning.
    pub traj: Trajectory,

    /// Reference speed for the speed controller.
    pub reference: ControlReference,

    pub outcome: SelectOutcome,

    /// The goal the command was selected for.
    pub goal: Goal,
}

/// Status report for local planner processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub time_s: f64,
    pub cycle: u64,

    pub goal_x_m: f64,
    pub goal_y_m: f64,
    pub num_obstacles: usize,

    pub speed_min_ms: f64,
    pub speed_max_ms: f64,
    pub yaw_rate_min_rads: f64,
    pub yaw_rate_max_rads: f64,

    pub num_candidates: usize,

    /// Total cost of the best candidate, NaN if there were none.
    pub cost: f64,

    pub speed_cmd_ms: f64,
    pub yaw_rate_cmd_rads: f64,
    pub reference_speed_ms: f64,

    /// The reference path was empty, so the goal was placed on the vehicle.
    pub path_empty: bool,

    /// The pose was not finite, so no path point could be matched and the goal was placed on
    /// the vehicle.
    pub pose_invalid: bool,

    /// The vehicle is within the stop distance of the path's destination.
    pub goal_reached: bool,

    pub all_collide: bool,
    pub empty_window: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocalPlanner {
    /// Create an initialised planner from already loaded parameters.
    ///
    /// Nothing is archived until `archive_to` is called.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            initialised: true,
            ..Default::default()
        }
    }

    /// Start archiving status reports into the session.
    pub fn archive_to(&mut self, session: &Session) -> Result<(), LocalPlanError> {
        self.arch_report = Some(
            Archiver::from_path(session, "local_plan/status_report.csv")
                .map_err(LocalPlanError::ArchiveError)?,
        );
        Ok(())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The state carried into the next cycle.
    pub fn planner_state(&self) -> PlannerState {
        self.planner_state
    }
}

impl State for LocalPlanner {
    type InitData = &'static str;
    type InitError = LocalPlanError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LocalPlanError;

    /// Initialise the LocalPlanner module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(LocalPlanError::ParamLoadError)?;
        self.initialised = true;
        self.planner_state = PlannerState::default();
        self.num_cycles = 0;

        self.archive_to(session)?;

        info!(
            "LocalPlanner initialised: {} candidate steps per rollout, {} world obstacles",
            self.params.dwa.num_rollout_steps(),
            self.params.frame.world_obstacles.len()
        );

        Ok(())
    }

    /// Perform one planning cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(LocalPlanError::NotInit);
        }

        let dwa = &self.params.dwa;
        let ft = FrameTransformer::new(&self.params.frame, &input_data.pose);

        // ---- INPUTS TO THE VEHICLE FRAME ----

        let goal = ft.goal(&input_data.path);
        let obstacles = ft.obstacles(
            input_data
                .perception
                .perception_obstacle
                .iter()
                .map(|o| &o.bbox2d),
        );

        let speed_ms = match input_data.chassis {
            Some(c) => c.speed_ms,
            None => dwa.initial_speed_ms,
        };
        let state = VehicleState::at_origin(speed_ms, self.planner_state.prev_yaw_rate_rads);

        // ---- SEARCH ----

        let window = DynamicWindow::calculate(&state, dwa);
        let sel = select(&state, &window, dwa, &goal, &obstacles, self.planner_state);

        // ---- REFERENCE SPEED ----

        let goal_reached = match input_data.path.first() {
            Some(p) => ft.distance_m(p.x, p.y) <= dwa.goal_stop_distance_m,
            None => false,
        };

        let reference_speed_ms = if goal_reached { 0.0 } else { sel.cmd.speed_ms };

        let pose = &input_data.pose;
        let pose_invalid = !(pose.x.is_finite() && pose.y.is_finite() && pose.yaw_rad.is_finite());

        if input_data.path.is_empty() {
            warn!("Reference path is empty, planning towards the current position");
        }
        if pose_invalid {
            warn!(
                "Pose ({}, {}, {}) is not finite, planning towards the current position",
                pose.x, pose.y, pose.yaw_rad
            );
        }
        if goal_reached {
            debug!("Within {} m of the destination, stopping", dwa.goal_stop_distance_m);
        }

        let report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            cycle: self.num_cycles + 1,
            goal_x_m: goal.x_m,
            goal_y_m: goal.y_m,
            num_obstacles: obstacles.len(),
            speed_min_ms: window.speed_min_ms,
            speed_max_ms: window.speed_max_ms,
            yaw_rate_min_rads: window.yaw_rate_min_rads,
            yaw_rate_max_rads: window.yaw_rate_max_rads,
            num_candidates: sel.num_candidates,
            cost: sel.cost.map(|c| c.total()).unwrap_or(std::f64::NAN),
            speed_cmd_ms: sel.cmd.speed_ms,
            yaw_rate_cmd_rads: sel.cmd.yaw_rate_rads,
            reference_speed_ms,
            path_empty: input_data.path.is_empty(),
            pose_invalid,
            goal_reached,
            all_collide: sel.outcome == SelectOutcome::AllCollide,
            empty_window: sel.outcome == SelectOutcome::EmptyWindow,
        };

        if let Some(ref mut arch) = self.arch_report {
            arch.serialise(report).map_err(LocalPlanError::ArchiveError)?;
        }

        // Nothing carries over into the next cycle unless this one completes
        self.planner_state = sel.next_state;
        self.num_cycles = report.cycle;

        let output = OutputData {
            cmd: sel.cmd,
            traj: sel.traj,
            reference: ControlReference {
                vehicle_speed_ms: reference_speed_ms,
            },
            outcome: sel.outcome,
            goal,
        };

        Ok((output, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::perception::{BBox2D, PerceptionObstacle};

    const SCALE: f64 = 144.9;

    /// A path along +X from the origin out to 5 m, destination first, one point every 5 cm.
    fn straight_path() -> Vec<Point> {
        (0..=100)
            .rev()
            .map(|i| Point {
                x: i as f64 * 0.05 * SCALE,
                y: 0.0,
            })
            .collect()
    }

    fn input(x_m: f64, chassis: Option<Chassis>) -> InputData {
        InputData {
            pose: LocPose::now(x_m * SCALE, 0.0, 0.0),
            path: straight_path(),
            perception: PerceptionObstacles::default(),
            chassis,
        }
    }

    #[test]
    fn test_not_init() {
        let mut lp = LocalPlanner::default();
        assert!(matches!(
            lp.proc(&input(0.0, None)),
            Err(LocalPlanError::NotInit)
        ));
    }

    #[test]
    fn test_plan_along_path() {
        let mut lp = LocalPlanner::new(Params::default());
        let (out, report) = lp.proc(&input(1.0, None)).unwrap();

        assert_eq!(out.outcome, SelectOutcome::Selected);

        // Nearest point is at 1 m, eight points on is 1.4 m
        assert!((out.goal.x_m - 0.4).abs() < 1e-9);
        assert!(out.goal.y_m.abs() < 1e-9);

        assert!(out.cmd.speed_ms >= 0.5);
        assert_eq!(out.reference.vehicle_speed_ms, out.cmd.speed_ms);
        assert_eq!(out.traj.len(), 31);
        assert!(!report.goal_reached);
        assert!(!report.path_empty);
        assert_eq!(report.cycle, 1);
        assert_eq!(lp.planner_state().prev_yaw_rate_rads, out.cmd.yaw_rate_rads);
    }

    #[test]
    fn test_assumed_initial_speed() {
        let mut lp = LocalPlanner::new(Params::default());
        let accel = lp.params().dwa.max_accel_mss * lp.params().dwa.dt_s;

        let (_, report) = lp.proc(&input(1.0, None)).unwrap();
        assert!((report.speed_max_ms - (0.3 + accel)).abs() < 1e-9);

        let (_, report) = lp
            .proc(&input(1.0, Some(Chassis { speed_ms: 0.6 })))
            .unwrap();
        assert!((report.speed_max_ms - (0.6 + accel)).abs() < 1e-9);
    }

    #[test]
    fn test_stop_at_destination() {
        let mut lp = LocalPlanner::new(Params::default());

        // 15 cm short of the destination
        let (out, report) = lp.proc(&input(4.85, None)).unwrap();

        assert!(report.goal_reached);
        assert_eq!(out.reference.vehicle_speed_ms, 0.0);
        assert_eq!(out.outcome, SelectOutcome::Selected);
        assert!(out.cmd.speed_ms > 0.0);
    }

    #[test]
    fn test_perceived_obstacle_on_vehicle() {
        let mut lp = LocalPlanner::new(Params::default());
        let mut data = input(1.0, None);
        data.perception.perception_obstacle.push(PerceptionObstacle {
            id: 1,
            bbox2d: BBox2D {
                xmin: -0.1,
                xmax: 0.1,
                zmin: -0.1,
                zmax: 0.1,
            },
        });

        let (out, report) = lp.proc(&data).unwrap();

        assert_eq!(report.num_obstacles, 1);
        assert!(report.all_collide);
        assert_eq!(out.outcome, SelectOutcome::AllCollide);
        assert_eq!(out.cmd, VelCmd::zero());
        assert_eq!(out.reference.vehicle_speed_ms, 0.0);
        assert_eq!(out.traj.len(), 1);
        assert_eq!(lp.planner_state().prev_yaw_rate_rads, 0.0);
    }

    #[test]
    fn test_empty_path() {
        let mut lp = LocalPlanner::new(Params::default());
        let mut data = input(1.0, None);
        data.path.clear();

        let (out, report) = lp.proc(&data).unwrap();

        assert!(report.path_empty);
        assert!(!report.goal_reached);
        assert_eq!(out.goal, Goal::default());
    }

    #[test]
    fn test_archive() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new_in("local_plan_test", dir.path()).unwrap();

        let mut lp = LocalPlanner::new(Params::default());
        lp.archive_to(&session).unwrap();
        lp.proc(&input(1.0, None)).unwrap();
        lp.proc(&input(1.1, None)).unwrap();

        let contents = std::fs::read_to_string(
            session.arch_root.join("local_plan/status_report.csv"),
        )
        .unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.starts_with("time_s,cycle,goal_x_m"));

        session.exit();
    }

    #[test]
    fn test_failed_archive_is_not_applied() {
        let mut params = Params::default();
        params.dwa.yaw_rate_cost_gain = 0.0;
        let mut lp = LocalPlanner::new(params);

        // Turned left of the path, so the goal is to the right
        let mut data = input(1.0, None);
        data.pose.yaw_rad = 0.5;

        // An archiver without a file fails every write
        lp.arch_report = Some(Archiver::default());
        assert!(matches!(lp.proc(&data), Err(LocalPlanError::ArchiveError(_))));
        assert_eq!(lp.planner_state(), PlannerState::default());
        assert_eq!(lp.num_cycles, 0);

        lp.arch_report = None;
        let (out, report) = lp.proc(&data).unwrap();
        assert_eq!(report.cycle, 1);
        assert!(out.cmd.yaw_rate_rads < 0.0);
        assert_eq!(lp.planner_state().prev_yaw_rate_rads, out.cmd.yaw_rate_rads);

        // A later failure keeps the yaw rate that was actually emitted
        data.pose.yaw_rad = -0.5;
        lp.arch_report = Some(Archiver::default());
        assert!(lp.proc(&data).is_err());
        assert_eq!(lp.planner_state().prev_yaw_rate_rads, out.cmd.yaw_rate_rads);
        assert_eq!(lp.num_cycles, 1);
    }

    #[test]
    fn test_invalid_pose() {
        let mut lp = LocalPlanner::new(Params::default());
        let mut data = input(1.0, None);
        data.pose.x = std::f64::NAN;

        let (out, report) = lp.proc(&data).unwrap();

        assert!(report.pose_invalid);
        assert!(!report.path_empty);
        assert_eq!(out.goal, Goal::default());

        let (_, report) = lp.proc(&input(1.0, None)).unwrap();
        assert!(!report.pose_invalid);
    }
}
