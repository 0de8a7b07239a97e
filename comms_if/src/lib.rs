//! # Communications interface crate.
//!
//! Provides the message structures exchanged between the navigation core and the rest of the
//! vehicle software. No transport is provided, every message is a plain serde structure which the
//! surrounding system is free to put on whatever bus it uses.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Messages to and from vehicle equipment (chassis, localisation, perception)
pub mod eqpt;

/// Messages produced by the planner for the controller
pub mod plan;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur when encoding or decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum MsgError {
    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message: {0}")]
    DeserializeError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Encode a message as JSON.
pub fn to_json<M: Serialize>(msg: &M) -> Result<String, MsgError> {
    serde_json::to_string(msg).map_err(MsgError::SerializationError)
}

/// Decode a message from JSON.
pub fn from_json<M: DeserializeOwned>(s: &str) -> Result<M, MsgError> {
    serde_json::from_str(s).map_err(MsgError::DeserializeError)
}
