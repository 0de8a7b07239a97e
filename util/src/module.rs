//! Module interfaces
//!
//! The cyclic modules of `nav_exec`, the local planner and the command controller, implement
//! [`State`] so the executable can initialise and drive them the same way.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module run once per cycle which carries state from one cycle to the next.
pub trait State {
    /// Data required during initialisation, usually a parameter file path.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// The latest value of every input the module reads in a cycle.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A flat record of the cycle, suitable for archiving.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Load parameters, reset the cross-cycle state and open the module's archives in the
    /// session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    ///
    /// A cycle which returns an error has no effect on the state carried into the next one, so
    /// the caller can drop the cycle and carry on.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
