//! Pipelines: an ordered tuple of child stages sharing one model value.

use crate::port::{Direction, PortArena, PortId};
use crate::stage::{PortSet, Stage, StageError};

/// A stage that owns child stages and runs them, in declared order, on a
/// shared model value each tick.
///
/// Wiring a concrete pipeline is a three-step dance:
/// 1. [`Pipeline::add_stage`] for each child, in execution order.
/// 2. [`Pipeline::declare_stage_ports`] (calls each child's
///    `initialize_ports`), then connect child ports to each other and to
///    this pipeline's boundary ports via [`Pipeline::arena_mut`].
/// 3. [`Pipeline::initialize`] (calls each child's `do_initialization`
///    once).
pub struct Pipeline<M> {
    name: String,
    arena: PortArena,
    boundary: PortSet,
    stages: Vec<Box<dyn Stage<M>>>,
}

impl<M> Pipeline<M> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arena: PortArena::new(),
            boundary: PortSet::new(),
            stages: Vec::new(),
        }
    }

    pub fn declare_boundary_port<T: 'static>(
        &mut self,
        name: impl Into<String>,
        direction: Direction,
    ) -> PortId {
        self.boundary.declare::<T>(&mut self.arena, name, direction)
    }

    pub fn boundary_port(&self, name: &str) -> Result<PortId, StageError> {
        self.boundary.get(name)
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage<M>>) {
        self.stages.push(stage);
    }

    pub fn arena(&self) -> &PortArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut PortArena {
        &mut self.arena
    }

    /// Run each child stage's `initialize_ports` against this pipeline's
    /// arena. Must run before any wiring (`arena_mut().connect(...)`).
    pub fn declare_stage_ports(&mut self) {
        for stage in &mut self.stages {
            stage.initialize_ports(&mut self.arena);
        }
    }
}

impl<M> Stage<M> for Pipeline<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn initialize_ports(&mut self, _arena: &mut PortArena) {
        // A pipeline's own boundary ports live in its own arena, declared
        // via `declare_boundary_port`; nothing to do against a parent
        // arena here.
    }

    fn do_initialization(&mut self) -> Result<(), StageError> {
        for stage in &mut self.stages {
            stage.do_initialization()?;
        }
        Ok(())
    }

    fn is_ready(&self, _arena: &PortArena) -> bool {
        true
    }

    fn do_process(&mut self, _arena: &PortArena, model: &mut M) -> Result<(), StageError> {
        for stage in &mut self.stages {
            stage.process(&self.arena, model)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoData;

    struct PassThrough {
        name: String,
        input: Option<PortId>,
        output: Option<PortId>,
    }

    impl PassThrough {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                input: None,
                output: None,
            }
        }
    }

    impl Stage<NoData> for PassThrough {
        fn name(&self) -> &str {
            &self.name
        }

        fn initialize_ports(&mut self, arena: &mut PortArena) {
            self.input = Some(arena.create_port::<f64>(format!("{}_in", self.name), Direction::In));
            self.output = Some(arena.create_port::<f64>(format!("{}_out", self.name), Direction::Out));
        }

        fn is_ready(&self, arena: &PortArena) -> bool {
            arena.is_bound(self.input.unwrap())
        }

        fn do_process(&mut self, arena: &PortArena, _model: &mut NoData) -> Result<(), StageError> {
            let value: f64 = arena.data(self.input.unwrap())?;
            arena.set_data(self.output.unwrap(), value * 2.0);
            Ok(())
        }
    }

    #[test]
    fn empty_pipeline_with_unbound_input_is_not_ready_and_succeeds() {
        let mut pipeline: Pipeline<NoData> = Pipeline::new("identity");
        pipeline.add_stage(Box::new(PassThrough::new("double")));
        pipeline.declare_stage_ports();

        let mut model = NoData;
        // Stage's own input port was never connected to anything, so
        // `is_ready` is false and `process` must succeed without work.
        assert!(pipeline.do_process(pipeline.arena(), &mut model).is_ok());
    }

    #[test]
    fn chained_stages_run_in_declared_order() {
        let mut pipeline: Pipeline<NoData> = Pipeline::new("chain");
        pipeline.add_stage(Box::new(PassThrough::new("a")));
        pipeline.add_stage(Box::new(PassThrough::new("b")));
        pipeline.declare_stage_ports();

        // Wire a's output straight into b's input, and seed a's input.
        let arena = pipeline.arena_mut();
        let a_in = arena.find("a_in").unwrap();
        let a_out = arena.find("a_out").unwrap();
        let b_in = arena.find("b_in").unwrap();
        let b_out = arena.find("b_out").unwrap();

        let seed = arena.create_port::<f64>("seed", Direction::Out);
        arena.connect(seed, a_in).unwrap();
        arena.connect(a_out, b_in).unwrap();
        arena.set_data(seed, 3.0);

        let mut model = NoData;
        pipeline.do_process(pipeline.arena(), &mut model).unwrap();

        let result: f64 = pipeline.arena().data(b_out).unwrap();
        assert!((result - 12.0).abs() < 1e-12);
    }
}
