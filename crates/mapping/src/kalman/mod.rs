//! The Kalman filter core: kinematic attribute packs, state vectors, the
//! generic filter, the concrete ego model, and observation matrices.

mod attributes;
mod ego_model;
mod ego_object;
mod filter;
mod observation;
mod state_vector;

pub use attributes::{AttributePack, KinematicAttribute};
pub use ego_model::{EgoModel, EGO_ATTRIBUTES};
pub use ego_object::EgoObject;
pub use filter::{FilterError, FilterModel, KalmanFilter};
pub use observation::{direct_observation_matrix, observe_speed};
pub use state_vector::KinematicStateVector;
