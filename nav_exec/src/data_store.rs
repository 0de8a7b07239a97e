//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::Arc;

use log::debug;

use crate::{cmd_ctrl, handoff::Stamped, plan_worker::PlanSnapshot};
use comms_if::eqpt::chassis::{Chassis, ControlCommand};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Data store for the control loop.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub time_s: f64,

    // Feedback
    pub chassis: Chassis,

    // Planning
    /// The plan currently being followed
    pub plan: Option<Arc<Stamped<PlanSnapshot>>>,

    /// Number of different plans which have been followed
    pub num_plans_followed: u64,

    // CmdCtrl
    pub cmd_ctrl: cmd_ctrl::CmdCtrl,
    pub cmd_ctrl_input: cmd_ctrl::InputData,
    pub cmd_ctrl_output: ControlCommand,
    pub cmd_ctrl_status_rpt: cmd_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of cycle overruns
    pub num_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous cycle and sets the 1Hz cycle flag. The CmdCtrl input is
    /// kept, since the plan it holds stays valid until a new one arrives.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u64).max(1) == 0;

        self.cmd_ctrl_output = ControlCommand::default();
        self.cmd_ctrl_status_rpt = cmd_ctrl::StatusReport::default();

        self.time_s = util::session::get_elapsed_seconds();
    }

    /// Follow the latest plan if it is newer than the current one.
    ///
    /// Returns true if the plan changed.
    pub fn update_plan(&mut self, latest: Option<Arc<Stamped<PlanSnapshot>>>) -> bool {
        let latest = match latest {
            Some(l) => l,
            None => return false,
        };

        if let Some(ref current) = self.plan {
            if current.seq == latest.seq {
                return false;
            }
        }

        debug!("Following plan {}", latest.seq);

        self.cmd_ctrl_input.trajectory = latest.value.output.traj.to_msg();
        self.cmd_ctrl_input.reference = latest.value.output.reference;
        self.plan = Some(latest);
        self.num_plans_followed += 1;

        true
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
