//! Fuses one laser scan into an occupancy grid's belief.

use dataflow::{Direction, Pipeline, PortArena, PortId, Stage, StageError};
use geom::{LaserScan, NormalisedAngle, Pose2d};
use gridops::Grid;

use crate::occupancy::{self, OccupancyCell};

struct Worker {
    scan: Option<PortId>,
    normals: Option<PortId>,
    ego_pose: Option<PortId>,
}

impl Worker {
    fn new() -> Self {
        Self { scan: None, normals: None, ego_pose: None }
    }
}

impl Stage<Grid<OccupancyCell>> for Worker {
    fn name(&self) -> &str {
        "push laser scan to occupancy grid"
    }

    fn initialize_ports(&mut self, arena: &mut PortArena) {
        self.scan = Some(arena.create_port::<LaserScan>("scan", Direction::In));
        self.normals = Some(arena.create_port::<Vec<NormalisedAngle>>("normals", Direction::In));
        self.ego_pose = Some(arena.create_port::<Pose2d>("egoPose", Direction::In));
    }

    fn is_ready(&self, arena: &PortArena) -> bool {
        arena.is_bound(self.scan.unwrap()) && arena.is_bound(self.ego_pose.unwrap())
    }

    fn do_process(&mut self, arena: &PortArena, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        let scan: LaserScan = arena.data(self.scan.unwrap())?;
        let ego_pose: Pose2d = arena.data(self.ego_pose.unwrap())?;
        let normals: Option<Vec<NormalisedAngle>> =
            if arena.num_connections(self.normals.unwrap()) > 0 { Some(arena.data(self.normals.unwrap())?) } else { None };

        occupancy::push_laser_scan(grid, &scan, ego_pose, normals.as_deref());
        Ok(())
    }
}

/// Inputs `scan`, `normals` (optional), `egoPose`; no outputs — the belief
/// lives in the model `Grid<OccupancyCell>` passed to [`Self::tick`].
pub struct UpdateOccupancyGrid {
    pipeline: Pipeline<Grid<OccupancyCell>>,
}

impl UpdateOccupancyGrid {
    pub fn new() -> Self {
        let mut pipeline = Pipeline::new("update occupancy grid");
        pipeline.add_stage(Box::new(Worker::new()));
        pipeline.declare_stage_ports();
        Self { pipeline }
    }

    fn port(&self, name: &str) -> PortId {
        self.pipeline.arena().find(name).unwrap_or_else(|| panic!("port '{name}' not declared"))
    }

    pub fn set_scan(&self, scan: LaserScan) {
        self.pipeline.arena().set_data(self.port("scan"), scan);
    }

    pub fn set_normals(&self, normals: Vec<NormalisedAngle>) {
        self.pipeline.arena().set_data(self.port("normals"), normals);
    }

    pub fn set_ego_pose(&self, pose: Pose2d) {
        self.pipeline.arena().set_data(self.port("egoPose"), pose);
    }

    pub fn tick(&mut self, grid: &mut Grid<OccupancyCell>) -> Result<(), StageError> {
        self.pipeline.do_process(self.pipeline.arena(), grid)
    }
}

impl Default for UpdateOccupancyGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{Angle, Point2d, Size2u};

    #[test]
    fn tick_without_normals_fuses_scan_into_grid() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(200, 200), 0.05, Point2d::new(-5.0, -5.0), OccupancyCell::unknown());
        let scan = LaserScan::new(vec![3.0; 5], Pose2d::default(), Angle::from_degree(-10.0), Angle::from_degree(5.0), 10.0, Angle::from_degree(1.0), 0.0, "lidar");

        let mut update = UpdateOccupancyGrid::new();
        update.set_scan(scan);
        update.set_ego_pose(Pose2d::default());

        let mut model = grid;
        update.tick(&mut model).unwrap();

        let hit = model.world_to_index(Point2d::new(3.0, 0.0)).unwrap();
        assert!(!model.get(hit).is_unknown());
    }

    #[test]
    fn not_ready_without_ego_pose_leaves_grid_untouched() {
        let grid: Grid<OccupancyCell> = Grid::new(Size2u::new(50, 50), 0.1, Point2d::new(-2.5, -2.5), OccupancyCell::unknown());
        let scan = LaserScan::new(vec![1.0; 3], Pose2d::default(), Angle::from_degree(-5.0), Angle::from_degree(5.0), 10.0, Angle::from_degree(1.0), 0.0, "lidar");

        let mut update = UpdateOccupancyGrid::new();
        update.set_scan(scan);

        let mut model = grid;
        update.tick(&mut model).unwrap();

        let idx = model.world_to_index(Point2d::new(1.0, 0.0)).unwrap();
        assert!(model.get(idx).is_unknown());
    }
}
