//! Typed dataflow engine: ports, stages and pipelines.
//!
//! Single-threaded, cooperative execution: one [`Stage::process`] call
//! runs a stage (and, for a [`Pipeline`], its whole child-stage tree) to
//! completion. There are no suspension points inside the engine.

mod pipeline;
mod port;
mod stage;

pub use pipeline::Pipeline;
pub use port::{Direction, PortArena, PortError, PortId, MAX_CONNECTIONS};
pub use stage::{PortSet, Stage, StageError};
