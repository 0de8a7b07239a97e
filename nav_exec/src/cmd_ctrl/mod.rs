//! # Command control module
//!
//! Command control turns the planner's most recent trajectory and reference speed into the
//! actuator command for every control tick:
//!
//! - Steering previews the point half way along the trajectory and demands the bicycle model
//!   steering angle which would arc through it.
//! - Throttle is a feed-forward on the reference speed plus proportional and integral terms on
//!   the speed error.
//!
//! Neither law looks at the pose: the trajectory is already in the vehicle frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;
mod steering;
mod throttle;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
pub use steering::*;
pub use throttle::*;

use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during command control.
#[derive(Debug, thiserror::Error)]
pub enum CmdCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not archive the status report: {0}")]
    ArchiveError(ArchiveError),

    #[error("Attempted to control before the module was initialised")]
    NotInit,
}
