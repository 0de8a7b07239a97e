//! Main navigation executable entry point.
//!
//! # Architecture
//!
//! The executable runs two threads:
//!
//!     - The planning worker, which runs the local planner every time a new pose arrives and
//!       publishes the resulting plan.
//!     - The control loop, at 20 Hz:
//!         - System input acquisition:
//!             - Chassis speed feedback
//!             - Pose and perception, forwarded to the planning worker
//!         - Pick up the latest plan
//!         - Command control processing
//!         - Actuation
//!
//! # Modules
//!
//! All modules (e.g. `cmd_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

#![cfg_attr(not(feature = "sim"), allow(dead_code, unused_imports))]

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};

// Internal
#[cfg(feature = "sim")]
use nav_lib::sim::{SimParams, SimVehicle};
use nav_lib::{
    data_store::DataStore,
    handoff::handoff,
    local_plan::LocalPlanner,
    plan_worker::{PlanSnapshot, PlanWorker, PoseUpdate, WorkerSummary},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.05;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

/// Modules which log on every plan, kept at info so the 1 Hz debug summary stays readable.
const CYCLIC_LOG_TARGETS: [&str; 3] = [
    "nav_lib::local_plan::selector",
    "nav_lib::plan_worker",
    "nav_lib::data_store",
];

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the run, saved into the session at exit.
#[derive(Debug, Serialize)]
struct RunSummary {
    num_cycles: u64,
    num_cycle_overruns: u64,
    num_plans_followed: u64,
    arrived: bool,
    duration_s: f64,
    worker: WorkerSummary,
}

/// One row of the control loop archive.
#[derive(Debug, Serialize)]
struct LoopRecord {
    time_s: f64,
    cycle: u64,
    plan_seq: u64,
    x: f64,
    y: f64,
    yaw_rad: f64,
    speed_ms: f64,
    steer_angle_deg: f64,
    throttle: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
#[cfg(feature = "sim")]
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init("nav_exec", LevelFilter::Debug, &CYCLIC_LOG_TARGETS, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Navigation Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    let mut local_planner = LocalPlanner::default();
    local_planner
        .init("local_plan.toml", &session)
        .wrap_err("Failed to initialise LocalPlanner")?;
    info!("LocalPlanner init complete");

    if (local_planner.params().frame.scale_per_m - sim_params.scenario.scale_per_m).abs() > 1e-9 {
        warn!(
            "Planner scale ({}) differs from the simulation scale ({})",
            local_planner.params().frame.scale_per_m,
            sim_params.scenario.scale_per_m
        );
    }

    ds.cmd_ctrl
        .init("cmd_ctrl.toml", &session)
        .wrap_err("Failed to initialise CmdCtrl")?;
    info!("CmdCtrl init complete");

    let mut arch_loop = util::archive::Archiver::from_path(&session, "nav_exec/loop.csv")
        .wrap_err("Failed to create the control loop archive")?;

    info!("Module initialisation complete\n");

    // ---- SIMULATION AND WORKER ----

    let mut sim = SimVehicle::new(sim_params);
    let pose_period_ticks = sim.params().scenario.pose_period_ticks;
    let max_duration_s = sim.params().scenario.max_duration_s;
    let arrival_distance_m = sim.params().scenario.arrival_distance_m;

    let path = sim.params().scenario.reference_path();
    let destination = sim.params().scenario.destination();
    info!("Reference path has {} points", path.len());

    let (mut path_tx, path_rx) = handoff();
    path_tx.publish(path);

    let (plan_tx, plan_rx) = handoff::<PlanSnapshot>();
    let (worker, pose_tx) = PlanWorker::spawn(local_planner, path_rx, plan_tx);

    info!("Planning worker started");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut arrived = false;

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- DATA INPUT ----

        ds.chassis = sim.chassis();
        let pose = sim.pose();

        if ds.num_cycles % pose_period_ticks == 0 {
            let update = PoseUpdate {
                pose,
                chassis: Some(ds.chassis),
                perception: sim.perception(),
            };

            if pose_tx.send(update).is_err() {
                warn!("Planning worker has stopped, ending execution");
                break;
            }
        }

        // ---- PLAN PICKUP ----

        ds.update_plan(plan_rx.latest());

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.cmd_ctrl_input.chassis = ds.chassis;
        match ds.cmd_ctrl.proc(&ds.cmd_ctrl_input) {
            Ok((o, r)) => {
                ds.cmd_ctrl_output = o;
                ds.cmd_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during CmdCtrl processing: {}", e),
        };

        // ---- ACTUATION ----

        sim.step(&ds.cmd_ctrl_output, CYCLE_PERIOD_S);

        // ---- WRITE ARCHIVES ----

        let record = LoopRecord {
            time_s: ds.time_s,
            cycle: ds.num_cycles,
            plan_seq: ds.plan.as_ref().map(|p| p.seq).unwrap_or(0),
            x: pose.x,
            y: pose.y,
            yaw_rad: pose.yaw_rad,
            speed_ms: ds.chassis.speed_ms,
            steer_angle_deg: ds.cmd_ctrl_output.steer_angle_deg,
            throttle: ds.cmd_ctrl_output.throttle,
        };
        if let Err(e) = arch_loop.serialise(record) {
            warn!("Could not archive the control loop: {}", e);
        }

        if ds.is_1_hz_cycle {
            if let Some(ref plan) = ds.plan {
                let age = chrono::Utc::now().signed_duration_since(plan.value.pose.timestamp);
                if let Some(age_s) = util::time::duration_to_seconds(age) {
                    debug!("Following plan {} made {:.3} s ago", plan.seq, age_s);
                }
            }

            debug!(
                "t = {:.1} s, speed {:.2} m/s, steer {:.1} deg, throttle {:.2}",
                sim.time_s(),
                ds.chassis.speed_ms,
                ds.cmd_ctrl_output.steer_angle_deg,
                ds.cmd_ctrl_output.throttle
            );
        }

        // ---- END CONDITIONS ----

        if let Some(ref d) = destination {
            if sim.distance_m(d) <= arrival_distance_m {
                info!("Destination reached after {:.2} s", sim.time_s());
                arrived = true;
                break;
            }
        }

        if sim.time_s() >= max_duration_s {
            warn!("Destination not reached within {} s, stopping", max_duration_s);
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
                ds.num_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    drop(pose_tx);
    let worker_summary = worker.stop().wrap_err("Failed to stop the planning worker")?;

    if let Some(plan) = plan_rx.latest() {
        session.save("final_plan.json", (*plan).clone());
    }

    let summary = RunSummary {
        num_cycles: ds.num_cycles,
        num_cycle_overruns: ds.num_cycle_overruns,
        num_plans_followed: ds.num_plans_followed,
        arrived,
        duration_s: sim.time_s(),
        worker: worker_summary,
    };
    info!("Run summary: {:#?}", summary);
    session.save("summary.json", summary);

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Without the simulation there is no source of vehicle data to run against.
#[cfg(not(feature = "sim"))]
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    Err(color_eyre::eyre::eyre!(
        "nav_exec has no vehicle interface other than the simulation, build with the `sim` feature"
    ))
}
