//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with the vehicle's equipment.

pub mod chassis;
pub mod loc;
pub mod perception;
