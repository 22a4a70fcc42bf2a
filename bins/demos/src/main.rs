//! perception-demo — drives the mapping pipelines through a synthetic
//! loop: a sensor circles a square room, its scans are fused into an
//! occupancy grid, localized against that same grid, and folded into a
//! tracked ego state.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use geom::{Angle, NormalisedAngle, Point2d, Point2u, Pose2d, Size2u};
use gridops::Grid;
use mapping::kalman::EgoObject;
use mapping::occupancy::OccupancyCell;
use mapping::pipelines::{
    LocalizeOnOccupancyGrid, SensorSample, SimulateLaserScan, SimulateLaserScanParameters, UpdateEgoObject, UpdateOccupancyGrid,
};
use serde::Deserialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "perception-demo")]
#[command(about = "Drive the mapping pipelines through a synthetic sensor loop")]
struct Cli {
    /// Optional TOML file overriding the built-in simulation defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to save the final occupancy grid belief as a PNG.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    steps: usize,
    dt: f64,
    radius: f64,
    angular_rate_deg: f64,
    grid_cells: u32,
    cell_size: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            steps: 120,
            dt: 0.1,
            radius: 3.0,
            angular_rate_deg: 12.0,
            grid_cells: 400,
            cell_size: 0.05,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("perception_demo=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    run(&config, cli.output.as_deref())
}

fn load_config(path: Option<&std::path::Path>) -> Result<DemoConfig> {
    match path {
        Some(path) => Ok(toml::from_str(&std::fs::read_to_string(path)?)?),
        None => Ok(DemoConfig::default()),
    }
}

/// A square room with occupied walls on its border, unknown interior.
fn build_ground_truth_room(count: Size2u, cell_size: f64, origin: Point2d) -> Grid<OccupancyCell> {
    let grid = Grid::new(count, cell_size, origin, OccupancyCell::unknown());
    for y in 0..count.y() {
        for x in 0..count.x() {
            let on_border = x == 0 || y == 0 || x == count.x() - 1 || y == count.y() - 1;
            if on_border {
                grid.set(Point2u::new(x, y), OccupancyCell { value: 1.0 });
            }
        }
    }
    grid
}

fn run(config: &DemoConfig, output: Option<&std::path::Path>) -> Result<()> {
    let count = Size2u::new(config.grid_cells, config.grid_cells);
    let half_extent = config.grid_cells as f64 * config.cell_size / 2.0;
    let origin = Point2d::new(-half_extent, -half_extent);

    let mut ground_truth = build_ground_truth_room(count, config.cell_size, origin);
    let mut belief: Grid<OccupancyCell> = Grid::new(count, config.cell_size, origin, OccupancyCell::unknown());

    let mut simulate = SimulateLaserScan::new(SimulateLaserScanParameters::default());
    let mut update_grid = UpdateOccupancyGrid::new();
    let mut localize = LocalizeOnOccupancyGrid::new();
    let mut update_ego = UpdateEgoObject::new();
    let mut ego = EgoObject::at_origin(0.0);

    let angular_rate = Angle::from_degree(config.angular_rate_deg).radian();

    for step in 0..config.steps {
        let time = step as f64 * config.dt;
        let theta = angular_rate * time;
        let true_pose = Pose2d::new(
            Point2d::new(config.radius * theta.cos(), config.radius * theta.sin()),
            NormalisedAngle::from_radian(theta + std::f64::consts::FRAC_PI_2),
        );

        simulate.set_sensor_pose(Pose2d::default());
        simulate.set_ego_pose(true_pose);
        simulate.set_time_stamp(time);
        simulate.tick(&mut ground_truth)?;
        let scan = simulate.scan()?;

        update_grid.set_scan(scan.clone());
        update_grid.set_ego_pose(true_pose);
        update_grid.tick(&mut belief)?;

        localize.set_scan(scan);
        localize.tick(&mut belief)?;
        let pose_measurement = localize.pose_measurement()?;

        update_ego.set_sensor_data(SensorSample::Pose(pose_measurement));
        update_ego.tick(&mut ego)?;

        let estimated = ego.pose();
        info!(
            step,
            true_x = true_pose.position().x(),
            true_y = true_pose.position().y(),
            est_x = estimated.position().x(),
            est_y = estimated.position().y(),
            "tick"
        );
    }

    if let Some(path) = output {
        mapping::image_io::save_to_file(&belief, path)?;
        info!(path = %path.display(), "saved belief grid");
    }

    Ok(())
}
