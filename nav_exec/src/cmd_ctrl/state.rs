//! Implementations for the CmdCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;

// Internal
use super::*;
use comms_if::{
    eqpt::chassis::{Chassis, ControlCommand},
    plan::{ControlReference, Trajectory},
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

/// Command control module state
#[derive(Default)]
pub struct CmdCtrl {
    params: CmdCtrlParams,

    initialised: bool,

    speed_ctrl: SpeedController,

    arch_report: Option<Archiver>,
}

/// Input data to command control, the latest value of each input at the time of the tick.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    /// Latest planned trajectory in the vehicle frame.
    pub trajectory: Trajectory,

    pub reference: ControlReference,

    pub chassis: Chassis,
}

/// Status report for command control processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    pub time_s: f64,

    pub preview_x_m: f64,
    pub preview_y_m: f64,

    /// Signed distance to the start of the trajectory
    pub lateral_error_m: f64,

    pub steer_angle_deg: f64,
    pub steer_in_deadband: bool,
    pub steer_saturated: bool,

    pub speed_error_ms: f64,
    pub integral: f64,
    pub integral_limited: bool,
    pub throttle: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdCtrl {
    /// Create an initialised controller from already loaded parameters.
    pub fn new(params: CmdCtrlParams) -> Self {
        Self {
            params,
            initialised: true,
            ..Default::default()
        }
    }

    /// Start archiving status reports into the session.
    pub fn archive_to(&mut self, session: &Session) -> Result<(), CmdCtrlError> {
        self.arch_report = Some(
            Archiver::from_path(session, "cmd_ctrl/status_report.csv")
                .map_err(CmdCtrlError::ArchiveError)?,
        );
        Ok(())
    }

    pub fn speed_controller(&self) -> &SpeedController {
        &self.speed_ctrl
    }
}

impl State for CmdCtrl {
    type InitData = &'static str;
    type InitError = CmdCtrlError;

    type InputData = InputData;
    type OutputData = ControlCommand;
    type StatusReport = StatusReport;
    type ProcError = CmdCtrlError;

    /// Initialise the CmdCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(CmdCtrlError::ParamLoadError)?;
        self.initialised = true;
        self.speed_ctrl = SpeedController::new();

        self.archive_to(session)?;

        info!("CmdCtrl initialised with a {} s tick", self.params.tick_period_s);

        Ok(())
    }

    /// Run one control tick.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !self.initialised {
            return Err(CmdCtrlError::NotInit);
        }

        let steer = steer_demand(&input_data.trajectory, &self.params);
        let mut speed_ctrl = self.speed_ctrl;
        let throttle = speed_ctrl.update(
            input_data.reference.vehicle_speed_ms,
            input_data.chassis.speed_ms,
            &self.params,
        );

        let preview = steer.preview.unwrap_or_default();
        let report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            preview_x_m: preview.x,
            preview_y_m: preview.y,
            lateral_error_m: lateral_error_m(&input_data.trajectory),
            steer_angle_deg: steer.angle_deg,
            steer_in_deadband: steer.in_deadband,
            steer_saturated: steer.saturated,
            speed_error_ms: throttle.speed_error_ms,
            integral: throttle.integral,
            integral_limited: throttle.integral_limited,
            throttle: throttle.throttle,
        };

        if let Some(ref mut arch) = self.arch_report {
            arch.serialise(report).map_err(CmdCtrlError::ArchiveError)?;
        }

        self.speed_ctrl = speed_ctrl;

        let cmd = ControlCommand {
            steer_angle_deg: steer.angle_deg,
            throttle: throttle.throttle,
        };

        trace!("CmdCtrl output: {:?}", cmd);

        Ok((cmd, report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
