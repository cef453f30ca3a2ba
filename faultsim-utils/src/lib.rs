//! Utility library for the FaultSim project

pub mod dataset;
pub mod serde;
