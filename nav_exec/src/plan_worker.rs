//! # Planning worker
//!
//! Runs the local planner in its own thread. Each pose update received over the worker's channel
//! triggers one planning cycle using the latest reference path, and the result is published as a
//! [`PlanSnapshot`] for the control loop to pick up on its next tick.
//!
//! If several pose updates queue up while a cycle is running only the newest is planned for.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    handoff::{Publisher, Reader},
    local_plan::{self, LocalPlanner, SelectOutcome},
};
use comms_if::{
    eqpt::{chassis::Chassis, loc::LocPose, perception::PerceptionObstacles},
    plan::Point,
};
use util::module::State;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// How long the worker waits for a pose before checking whether it should stop.
const POSE_WAIT_TIMEOUT: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A localisation update, along with the latest feedback available when it was produced.
#[derive(Debug, Clone)]
pub struct PoseUpdate {
    pub pose: LocPose,
    pub chassis: Option<Chassis>,
    pub perception: PerceptionObstacles,
}

/// One complete planning result.
#[derive(Debug, Clone, Serialize)]
pub struct PlanSnapshot {
    /// The pose the plan was made at.
    pub pose: LocPose,

    pub output: local_plan::OutputData,
    pub report: local_plan::StatusReport,
}

/// Statistics of the worker's run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WorkerSummary {
    pub num_pose_updates: u64,

    /// Pose updates dropped because a newer one was already waiting.
    pub num_stale_updates: u64,

    pub num_plans: u64,
    pub num_all_collide: u64,
    pub num_empty_window: u64,
    pub num_errors: u64,
}

/// Handle to a running worker.
pub struct PlanWorker {
    jh: Option<JoinHandle<WorkerSummary>>,
    run: Arc<AtomicBool>,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanWorkerError {
    #[error("The planning worker thread panicked")]
    WorkerPanicked,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanWorker {
    /// Start the worker, returning its handle and the sender to deliver pose updates on.
    pub fn spawn(
        planner: LocalPlanner,
        path: Reader<Vec<Point>>,
        plans: Publisher<PlanSnapshot>,
    ) -> (Self, Sender<PoseUpdate>) {
        let (pose_tx, pose_rx) = channel();
        let run = Arc::new(AtomicBool::new(true));

        let run_clone = run.clone();
        let jh = Some(thread::spawn(move || {
            bg_thread(planner, pose_rx, path, plans, run_clone)
        }));

        (Self { jh, run }, pose_tx)
    }

    /// Stop the worker once its current cycle is complete and wait for it to exit.
    pub fn stop(mut self) -> Result<WorkerSummary, PlanWorkerError> {
        self.run.store(false, Ordering::Relaxed);

        match self.jh.take() {
            Some(jh) => jh.join().map_err(|_| PlanWorkerError::WorkerPanicked),
            None => Ok(WorkerSummary::default()),
        }
    }
}

impl Drop for PlanWorker {
    fn drop(&mut self) {
        self.run.store(false, Ordering::Relaxed);
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn bg_thread(
    mut planner: LocalPlanner,
    pose_rx: Receiver<PoseUpdate>,
    path: Reader<Vec<Point>>,
    mut plans: Publisher<PlanSnapshot>,
    run: Arc<AtomicBool>,
) -> WorkerSummary {
    let mut summary = WorkerSummary::default();

    while run.load(Ordering::Relaxed) {
        let mut update = match pose_rx.recv_timeout(POSE_WAIT_TIMEOUT) {
            Ok(u) => u,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Pose source disconnected, stopping the planning worker");
                break;
            }
        };
        summary.num_pose_updates += 1;

        // Skip to the newest pose
        for newer in pose_rx.try_iter() {
            update = newer;
            summary.num_pose_updates += 1;
            summary.num_stale_updates += 1;
        }

        let input = local_plan::InputData {
            pose: update.pose,
            path: match path.latest() {
                Some(p) => p.value.clone(),
                None => Vec::new(),
            },
            perception: update.perception,
            chassis: update.chassis,
        };

        match planner.proc(&input) {
            Ok((output, report)) => {
                match output.outcome {
                    SelectOutcome::Selected => (),
                    SelectOutcome::AllCollide => summary.num_all_collide += 1,
                    SelectOutcome::EmptyWindow => summary.num_empty_window += 1,
                }

                let seq = plans.publish(PlanSnapshot {
                    pose: input.pose,
                    output,
                    report,
                });
                summary.num_plans += 1;

                debug!("Published plan {}", seq);
            }
            Err(e) => {
                summary.num_errors += 1;
                warn!("Error during LocalPlanner processing: {}", e);
            }
        }
    }

    summary
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
