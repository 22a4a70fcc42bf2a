//! Stages: named units of work with a fixed input/output port arity.

use crate::port::{Direction, PortArena, PortError, PortId};
use std::collections::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Port(#[from] PortError),
    #[error("no port named '{0}' on this stage")]
    UnknownPortName(String),
    #[error("numerical failure: {0}")]
    NumericalFailure(String),
    #[error("operation attempted on data out of range: {0}")]
    OutOfRange(String),
    #[error("temporal order violation: {0}")]
    TemporalOrder(String),
    #[error("io failure: {0}")]
    IoFailure(String),
}

/// A named collection of ports declared by a stage at construction time,
/// with lookup-by-name over a fixed construction-time arity.
#[derive(Default)]
pub struct PortSet {
    by_name: HashMap<String, PortId>,
    order: Vec<String>,
}

impl PortSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare<T: 'static>(
        &mut self,
        arena: &mut PortArena,
        name: impl Into<String>,
        direction: Direction,
    ) -> PortId {
        let name = name.into();
        let id = arena.create_port::<T>(name.clone(), direction);
        self.order.push(name.clone());
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, name: &str) -> Result<PortId, StageError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| StageError::UnknownPortName(name.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.order.iter().map(move |n| self.by_name[n])
    }
}

/// A unit of work threaded through a pipeline's shared model value `M`.
///
/// Implementors declare their ports in [`Stage::initialize_ports`] and do
/// their per-tick work in [`Stage::do_process`]. The default
/// [`Stage::process`] wires the lifecycle together: skip (successfully)
/// if not ready, else validate then run.
pub trait Stage<M> {
    fn name(&self) -> &str;

    /// Declare this stage's ports in `arena`, recording their ids for
    /// later use in `do_process`/`is_ready`.
    fn initialize_ports(&mut self, arena: &mut PortArena);

    /// One-shot configuration run once after `initialize_ports`.
    fn do_initialization(&mut self) -> Result<(), StageError> {
        Ok(())
    }

    /// Whether every required input has a bound writer. The default
    /// implementation treats every declared input as required.
    fn is_ready(&self, arena: &PortArena) -> bool;

    /// Per-tick sanity check over already-bound inputs.
    fn validate_input_data(&self, _arena: &PortArena) -> Result<(), StageError> {
        Ok(())
    }

    /// The stage's per-tick work.
    fn do_process(&mut self, arena: &PortArena, model: &mut M) -> Result<(), StageError>;

    /// Public entry point: ready-check, validate, then run.
    fn process(&mut self, arena: &PortArena, model: &mut M) -> Result<(), StageError> {
        if !self.is_ready(arena) {
            tracing::debug!(stage = self.name(), "stage not ready, skipping tick");
            return Ok(());
        }
        self.validate_input_data(arena)?;
        self.do_process(arena, model)
    }
}
