//! # Navigation library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the navigation crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command control module - converts the planned trajectory into steering and throttle demands
pub mod cmd_ctrl;

/// Data store - holds the control loop's data between modules
pub mod data_store;

/// Frame module - converts world frame goals and obstacles into the vehicle frame
pub mod frame;

/// Latest value handoff between a single producer thread and the control loop
pub mod handoff;

/// Local planner module - selects velocity commands with the dynamic window approach
pub mod local_plan;

/// Kinematic motion model of the vehicle
pub mod motion;

/// Planning worker - runs the local planner in its own thread, triggered by pose updates
pub mod plan_worker;

/// Simulated vehicle - provides pose, speed and obstacle data in place of real equipment
#[cfg(feature = "sim")]
pub mod sim;
