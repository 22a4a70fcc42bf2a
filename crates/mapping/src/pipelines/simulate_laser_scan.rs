//! Casts synthetic laser beams against a ground-truth occupancy grid.

use dataflow::{Direction, Pipeline, PortArena, PortError, PortId, Stage, StageError};
use geom::{Angle, LaserScan, Point2d, Pose2d};
use gridops::Grid;

use crate::occupancy::{self, OccupancyCell};

/// Beam geometry, fixed for the lifetime of a [`SimulateLaserScan`]
/// pipeline rather than threaded through as ports.
#[derive(Debug, Clone, Copy)]
pub struct Parameters {
    pub phi_min: Angle,
    pub phi_step: Angle,
    pub num_beams: usize,
    pub max_range: f64,
    pub divergence: Angle,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            phi_min: Angle::from_degree(-120.0),
            phi_step: Angle::from_degree(1.0),
            num_beams: 241,
            max_range: 20.0,
            divergence: Angle::from_degree(0.5),
        }
    }
}

struct Worker {
    parameters: Parameters,
    sensor_pose: Option<PortId>,
    ego_pose: Option<PortId>,
    time_stamp: Option<PortId>,
    points: Option<PortId>,
    scan: Option<PortId>,
}

impl Worker {
    fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            sensor_pose: None,
            ego_pose: None,
            time_stamp: None,
            points: None,
            scan: None,
        }
    }
}

impl Stage<Grid<OccupancyCell>> for Worker {
    fn name(&self) -> &str {
        "simulate laser scan"
    }

    fn initialize_ports(&mut self, arena: &mut PortArena) {
        self.sensor_pose = Some(arena.create_port::<Pose2d>("sensorPose", Direction::In));
        self.ego_pose = Some(arena.create_port::<Pose2d>("egoPose", Direction::In));
        self.time_stamp = Some(arena.create_port::<f64>("timeStamp", Direction::In));
        self.points = Some(arena.create_port::<Vec<Point2d>>("points", Direction::Out));
        self.scan = Some(arena.create_port::<LaserScan>("scan", Direction::Out));
    }

    fn is_ready(&self, arena: &PortArena) -> bool {
        arena.is_bound(self.sensor_pose.unwrap())
            && arena.is_bound(self.ego_pose.unwrap())
            && arena.is_bound(self.time_stamp.unwrap())
    }

    fn do_process(&mut self, arena: &PortArena, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        let sensor_pose: Pose2d = arena.data(self.sensor_pose.unwrap())?;
        let ego_pose: Pose2d = arena.data(self.ego_pose.unwrap())?;
        let time_stamp: f64 = arena.data(self.time_stamp.unwrap())?;

        let scan = occupancy::reconstruct_laser_scan(
            grid,
            ego_pose,
            sensor_pose,
            self.parameters.phi_min,
            self.parameters.phi_step,
            self.parameters.num_beams,
            self.parameters.max_range,
            self.parameters.divergence,
            time_stamp,
        );
        let points = occupancy::reconstruct_points_with_ego_pose(&scan, ego_pose);

        arena.set_data(self.points.unwrap(), points);
        arena.set_data(self.scan.unwrap(), scan);
        Ok(())
    }
}

/// Inputs `sensorPose`, `egoPose`, `timeStamp`; outputs `points`, `scan`.
pub struct SimulateLaserScan {
    pipeline: Pipeline<Grid<OccupancyCell>>,
}

impl SimulateLaserScan {
    pub fn new(parameters: Parameters) -> Self {
        let mut pipeline = Pipeline::new("simulate laser scan");
        pipeline.add_stage(Box::new(Worker::new(parameters)));
        pipeline.declare_stage_ports();
        Self { pipeline }
    }

    fn port(&self, name: &str) -> PortId {
        self.pipeline.arena().find(name).unwrap_or_else(|| panic!("port '{name}' not declared"))
    }

    pub fn set_sensor_pose(&self, pose: Pose2d) {
        self.pipeline.arena().set_data(self.port("sensorPose"), pose);
    }

    pub fn set_ego_pose(&self, pose: Pose2d) {
        self.pipeline.arena().set_data(self.port("egoPose"), pose);
    }

    pub fn set_time_stamp(&self, time_stamp: f64) {
        self.pipeline.arena().set_data(self.port("timeStamp"), time_stamp);
    }

    pub fn tick(&mut self, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        self.pipeline.do_process(self.pipeline.arena(), grid)
    }

    pub fn points(&self) -> Result<Vec<Point2d>, PortError> {
        self.pipeline.arena().data(self.port("points"))
    }

    pub fn scan(&self) -> Result<LaserScan, PortError> {
        self.pipeline.arena().data(self.port("scan"))
    }
}

impl Default for SimulateLaserScan {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}
