//! Folds a pose or ego-motion measurement into the tracked ego kinematic
//! state.

use dataflow::{Direction, Pipeline, PortArena, PortId, Stage, StageError};
use geom::{EgoMotionSensorData, PoseSensorData};
use nalgebra::{SMatrix, SVector};

use crate::kalman::{direct_observation_matrix, observe_speed, AttributePack, EgoObject, KinematicAttribute::*};

/// Either sensor kind `UpdateEgoObject` can fold into the ego state.
#[derive(Debug, Clone, Copy)]
pub enum SensorSample {
    Pose(PoseSensorData),
    EgoMotion(EgoMotionSensorData),
}

impl SensorSample {
    fn time_stamp(&self) -> f64 {
        match self {
            Self::Pose(data) => data.time_stamp,
            Self::EgoMotion(data) => data.time_stamp,
        }
    }
}

struct Worker {
    sensor_data: Option<PortId>,
}

impl Worker {
    fn new() -> Self {
        Self { sensor_data: None }
    }
}

impl Stage<EgoObject> for Worker {
    fn name(&self) -> &str {
        "update ego object"
    }

    fn initialize_ports(&mut self, arena: &mut PortArena) {
        self.sensor_data = Some(arena.create_port::<SensorSample>("sensorData", Direction::In));
    }

    fn is_ready(&self, arena: &PortArena) -> bool {
        arena.is_bound(self.sensor_data.unwrap())
    }

    fn do_process(&mut self, arena: &PortArena, ego: &mut EgoObject) -> Result<(), StageError> {
        let sample: SensorSample = arena.data(self.sensor_data.unwrap())?;
        let time_stamp = sample.time_stamp();

        if ego.time() < time_stamp {
            ego.predict_to_time(time_stamp).map_err(|e| StageError::NumericalFailure(e.to_string()))?;
        } else {
            tracing::debug!(time_stamp, ego_time = ego.time(), "update ego object: target time is in the past, skip prediction");
        }

        match sample {
            SensorSample::Pose(data) => update_from_pose(ego, data, time_stamp)?,
            SensorSample::EgoMotion(data) => update_from_ego_motion(ego, data, time_stamp)?,
        }

        Ok(())
    }
}

fn update_from_pose(ego: &mut EgoObject, data: PoseSensorData, time_stamp: f64) -> Result<(), StageError> {
    let sensor_pack = AttributePack::new([PosX, PosY, Yaw]);
    let h: SMatrix<f64, 3, 12> = direct_observation_matrix(&sensor_pack, ego.state().pack());
    let z = SVector::<f64, 3>::new(data.pose.position().x(), data.pose.position().y(), data.pose.orientation().radian());

    ego.update(time_stamp, &z, &data.covariance, &h, &[2]).map_err(|e| StageError::NumericalFailure(e.to_string()))
}

fn update_from_ego_motion(ego: &mut EgoObject, data: EgoMotionSensorData, time_stamp: f64) -> Result<(), StageError> {
    let (speed_z, speed_h) = observe_speed(ego.state(), ego.state().pack()).ok_or_else(|| {
        StageError::NumericalFailure("ego state does not carry VEL_X/VEL_Y".into())
    })?;

    let yaw_rate_pack = AttributePack::new([YawRate]);
    let yaw_rate_h: SMatrix<f64, 1, 12> = direct_observation_matrix(&yaw_rate_pack, ego.state().pack());

    let mut h = SMatrix::<f64, 2, 12>::zeros();
    h.row_mut(0).copy_from(&speed_h.row(0));
    h.row_mut(1).copy_from(&yaw_rate_h.row(0));

    let z = SVector::<f64, 2>::new(speed_z[0], data.yaw_rate.radian());

    ego.update(time_stamp, &z, &data.covariance, &h, &[]).map_err(|e| StageError::NumericalFailure(e.to_string()))
}

/// Input `sensorData`; no outputs, the updated state lives in the model.
pub struct UpdateEgoObject {
    pipeline: Pipeline<EgoObject>,
}

impl UpdateEgoObject {
    pub fn new() -> Self {
        let mut pipeline = Pipeline::new("update ego object");
        pipeline.add_stage(Box::new(Worker::new()));
        pipeline.declare_stage_ports();
        Self { pipeline }
    }

    fn port(&self, name: &str) -> PortId {
        self.pipeline.arena().find(name).unwrap_or_else(|| panic!("port '{name}' not declared"))
    }

    pub fn set_sensor_data(&self, sample: SensorSample) {
        self.pipeline.arena().set_data(self.port("sensorData"), sample);
    }

    pub fn tick(&mut self, ego: &mut EgoObject) -> Result<(), StageError> {
        self.pipeline.do_process(self.pipeline.arena(), ego)
    }
}

impl Default for UpdateEgoObject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom::{Angle, Point2d, Pose2d};
    use nalgebra::{Matrix2, Matrix3};

    #[test]
    fn pose_measurement_pulls_state_toward_observation() {
        let mut ego = EgoObject::at_origin(0.0);
        let mut update = UpdateEgoObject::new();

        let covariance = Matrix3::from_diagonal(&SVector::<f64, 3>::new(0.1, 0.1, 0.05));
        let pose_data = PoseSensorData::new(1.0, Pose2d::new(Point2d::new(2.0, 0.0), Angle::from_radian(0.0).normalised()), covariance);
        update.set_sensor_data(SensorSample::Pose(pose_data));
        update.tick(&mut ego).unwrap();

        assert!(ego.pose().position().x() > 0.0);
        assert_eq!(ego.time(), 1.0);
    }

    #[test]
    fn ego_motion_measurement_updates_velocity_and_yaw_rate() {
        let mut ego = EgoObject::at_origin(0.0);
        let mut update = UpdateEgoObject::new();

        let covariance = Matrix2::from_diagonal(&nalgebra::Vector2::new(0.05, 0.01));
        let data = EgoMotionSensorData::new(1.0, 2.0, Angle::from_degree(5.0), covariance);
        update.set_sensor_data(SensorSample::EgoMotion(data));
        update.tick(&mut ego).unwrap();

        assert_eq!(ego.time(), 1.0);
    }
}
