//! Route Handlers

pub mod charts;
pub mod failures;
pub mod predict;
pub mod summary;

use serde::Deserialize;

/// Optional machine filter shared by the per-machine views
#[derive(Debug, Deserialize)]
pub struct MachineQuery {
    /// Machine id; the first machine when omitted
    pub machine: Option<String>,
}
