//! Matches an incoming laser scan against the occupancy grid's belief via
//! ICP, producing a pose measurement.

use dataflow::{Direction, Pipeline, PortArena, PortError, PortId, Stage, StageError};
use geom::{Angle, LaserScan, Point2d, PoseSensorData};
use gridops::{FlannPointPairEstimator, Grid, Icp};
use nalgebra::Matrix3;

use crate::occupancy::{self, OccupancyCell};
use crate::pipelines::simulate_laser_scan::Parameters;

const MAX_ICP_ITERATIONS: usize = 40;
const MAX_RMS: f64 = 5.0;
const TERMINATION_RMS: f64 = 0.01;
const KD_TREE_EPSILON: f64 = 0.0;

struct Worker {
    reconstruction: Parameters,
    scan: Option<PortId>,
    points: Option<PortId>,
    pose_measurement: Option<PortId>,
}

impl Worker {
    fn new(reconstruction: Parameters) -> Self {
        Self { reconstruction, scan: None, points: None, pose_measurement: None }
    }
}

impl Stage<Grid<OccupancyCell>> for Worker {
    fn name(&self) -> &str {
        "localize on occupancy grid"
    }

    fn initialize_ports(&mut self, arena: &mut PortArena) {
        self.scan = Some(arena.create_port::<LaserScan>("scan", Direction::In));
        self.points = Some(arena.create_port::<Vec<Point2d>>("points", Direction::Out));
        self.pose_measurement = Some(arena.create_port::<PoseSensorData>("poseMeasurement", Direction::Out));
    }

    fn is_ready(&self, arena: &PortArena) -> bool {
        arena.is_bound(self.scan.unwrap())
    }

    fn do_process(&mut self, arena: &PortArena, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        let scan: LaserScan = arena.data(self.scan.unwrap())?;

        let query_points = occupancy::reconstruct_points(&scan);

        let reference_scan = occupancy::reconstruct_laser_scan(
            grid,
            geom::Pose2d::default(),
            scan.pose,
            self.reconstruction.phi_min,
            self.reconstruction.phi_step,
            self.reconstruction.num_beams,
            self.reconstruction.max_range,
            self.reconstruction.divergence,
            scan.time_stamp,
        );
        let reference_points = occupancy::reconstruct_points(&reference_scan);

        let mut icp = Icp::new(FlannPointPairEstimator::new(KD_TREE_EPSILON), MAX_ICP_ITERATIONS, MAX_RMS, TERMINATION_RMS);
        let delta_pose = icp
            .estimate_transform(&reference_points, &query_points)
            .map_err(|e| StageError::NumericalFailure(e.to_string()))?;

        let estimated_pose = delta_pose.apply_to_pose(scan.pose);

        let mut covariance = Matrix3::zeros();
        covariance[(0, 0)] = 0.5 * 0.5;
        covariance[(1, 1)] = 0.5 * 0.5;
        let yaw_sigma = Angle::from_degree(10.0).radian();
        covariance[(2, 2)] = yaw_sigma * yaw_sigma;

        let pose_measurement = PoseSensorData::new(scan.time_stamp, estimated_pose, covariance);

        arena.set_data(self.points.unwrap(), query_points);
        arena.set_data(self.pose_measurement.unwrap(), pose_measurement);
        Ok(())
    }
}

/// Inputs `scan`; outputs `points`, `poseMeasurement`.
///
/// Simplified from the system this is grounded on: there, this pipeline
/// tracks a full ego kinematic model and predicts it to the scan's time
/// stamp before reconstructing grid points around its belief pose. Here
/// the model is the grid alone, so the scan's own recorded pose stands in
/// for that predicted ego pose.
pub struct LocalizeOnOccupancyGrid {
    pipeline: Pipeline<Grid<OccupancyCell>>,
}

impl LocalizeOnOccupancyGrid {
    pub fn new() -> Self {
        Self::with_reconstruction_parameters(Parameters::default())
    }

    pub fn with_reconstruction_parameters(parameters: Parameters) -> Self {
        let mut pipeline = Pipeline::new("localize on occupancy grid");
        pipeline.add_stage(Box::new(Worker::new(parameters)));
        pipeline.declare_stage_ports();
        Self { pipeline }
    }

    fn port(&self, name: &str) -> PortId {
        self.pipeline.arena().find(name).unwrap_or_else(|| panic!("port '{name}' not declared"))
    }

    pub fn set_scan(&self, scan: LaserScan) {
        self.pipeline.arena().set_data(self.port("scan"), scan);
    }

    pub fn tick(&mut self, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        self.pipeline.do_process(self.pipeline.arena(), grid)
    }

    pub fn points(&self) -> Result<Vec<Point2d>, PortError> {
        self.pipeline.arena().data(self.port("points"))
    }

    pub fn pose_measurement(&self) -> Result<PoseSensorData, PortError> {
        self.pipeline.arena().data(self.port("poseMeasurement"))
    }
}

impl Default for LocalizeOnOccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{Pose2d, Size2u};

    #[test]
    fn localizes_near_true_pose_against_known_wall() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(400, 400), 0.05, Point2d::new(-10.0, -10.0), OccupancyCell::unknown());
        let mapping_scan = LaserScan::new(vec![3.0; 21], Pose2d::default(), Angle::from_degree(-40.0), Angle::from_degree(4.0), 10.0, Angle::from_degree(1.0), 0.0, "wall");
        occupancy::push_laser_scan(&grid, &mapping_scan, Pose2d::default(), None);

        let query_scan = LaserScan::new(vec![3.0; 21], Pose2d::default(), Angle::from_degree(-40.0), Angle::from_degree(4.0), 10.0, Angle::from_degree(1.0), 1.0, "query");

        let mut localize = LocalizeOnOccupancyGrid::new();
        localize.set_scan(query_scan);

        let mut model = grid;
        localize.tick(&mut model).unwrap();

        let pose_measurement = localize.pose_measurement().unwrap();
        assert!(pose_measurement.pose.position().x().abs() < 0.5);
        assert!(pose_measurement.pose.position().y().abs() < 0.5);
        assert_eq!(pose_measurement.time_stamp, 1.0);
    }

    #[test]
    fn not_ready_without_scan_leaves_outputs_unbound() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(20, 20), 1.0, Point2d::new(-10.0, -10.0), OccupancyCell::unknown());
        let mut localize = LocalizeOnOccupancyGrid::new();
        let mut model = grid;
        localize.tick(&mut model).unwrap();
        assert!(localize.points().is_err());
    }
}
