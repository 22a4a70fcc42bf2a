//! Projects a laser scan into world-frame points and per-point surface
//! normals, fit from the ordered point sequence.

use dataflow::{Direction, Pipeline, PortArena, PortError, PortId, Stage, StageError};
use geom::{LaserScan, NormalisedAngle, Point2d, Pose2d};

use crate::normals::estimate_normals_from_ordered_points;
use crate::occupancy::reconstruct_points_with_ego_pose;
use crate::pipelines::NoData;

const DEFAULT_WINDOW: usize = 5;

struct Worker {
    window: usize,
    scan: Option<PortId>,
    ego_pose: Option<PortId>,
    points: Option<PortId>,
    normals: Option<PortId>,
}

impl Worker {
    fn new(window: usize) -> Self {
        Self { window, scan: None, ego_pose: None, points: None, normals: None }
    }
}

impl Stage<NoData> for Worker {
    fn name(&self) -> &str {
        "convert laser scan to points"
    }

    fn initialize_ports(&mut self, arena: &mut PortArena) {
        self.scan = Some(arena.create_port::<LaserScan>("scan", Direction::In));
        self.ego_pose = Some(arena.create_port::<Pose2d>("egoPose", Direction::In));
        self.points = Some(arena.create_port::<Vec<Point2d>>("points", Direction::Out));
        self.normals = Some(arena.create_port::<Vec<NormalisedAngle>>("normals", Direction::Out));
    }

    fn is_ready(&self, arena: &PortArena) -> bool {
        arena.is_bound(self.scan.unwrap())
    }

    fn do_process(&mut self, arena: &PortArena, _model: &mut NoData) -> Result<(), StageError> {
        let scan: LaserScan = arena.data(self.scan.unwrap())?;
        let ego_pose: Pose2d = if arena.num_connections(self.ego_pose.unwrap()) > 0 {
            arena.data(self.ego_pose.unwrap())?
        } else {
            Pose2d::default()
        };

        let points = reconstruct_points_with_ego_pose(&scan, ego_pose);
        let normals = estimate_normals_from_ordered_points(&points, self.window).unwrap_or_default();

        arena.set_data(self.points.unwrap(), points);
        arena.set_data(self.normals.unwrap(), normals);
        Ok(())
    }
}

/// Inputs `scan`, `egoPose` (optional, defaults to the identity pose);
/// outputs `points`, `normals`.
pub struct ConvertLaserScanToPoints {
    pipeline: Pipeline<NoData>,
}

impl ConvertLaserScanToPoints {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: usize) -> Self {
        let mut pipeline = Pipeline::new("convert laser scan to points");
        pipeline.add_stage(Box::new(Worker::new(window)));
        pipeline.declare_stage_ports();
        Self { pipeline }
    }

    fn port(&self, name: &str) -> PortId {
        self.pipeline.arena().find(name).unwrap_or_else(|| panic!("port '{name}' not declared"))
    }

    pub fn set_scan(&self, scan: LaserScan) {
        self.pipeline.arena().set_data(self.port("scan"), scan);
    }

    pub fn set_ego_pose(&self, pose: Pose2d) {
        self.pipeline.arena().set_data(self.port("egoPose"), pose);
    }

    pub fn tick(&mut self) -> Result<(), StageError> {
        let mut model = NoData;
        self.pipeline.do_process(self.pipeline.arena(), &mut model)
    }

    pub fn points(&self) -> Result<Vec<Point2d>, PortError> {
        self.pipeline.arena().data(self.port("points"))
    }

    pub fn normals(&self) -> Result<Vec<NormalisedAngle>, PortError> {
        self.pipeline.arena().data(self.port("normals"))
    }
}

impl Default for ConvertLaserScanToPoints {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::Angle;

    #[test]
    fn flat_wall_scan_yields_one_point_per_finite_beam() {
        let scan = LaserScan::new(vec![3.0; 9], Pose2d::default(), Angle::from_degree(-20.0), Angle::from_degree(5.0), 10.0, Angle::from_degree(1.0), 0.0, "lidar");

        let mut convert = ConvertLaserScanToPoints::new();
        convert.set_scan(scan);
        convert.tick().unwrap();

        assert_eq!(convert.points().unwrap().len(), 9);
        assert_eq!(convert.normals().unwrap().len(), 9);
    }

    #[test]
    fn missing_ego_pose_defaults_to_identity() {
        let scan = LaserScan::new(vec![1.0; 3], Pose2d::default(), Angle::from_degree(-5.0), Angle::from_degree(5.0), 10.0, Angle::from_degree(1.0), 0.0, "lidar");
        let mut convert = ConvertLaserScanToPoints::new();
        convert.set_scan(scan);
        assert!(convert.tick().is_ok());
    }
}
