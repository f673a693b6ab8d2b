use nalgebra::Vector3;
use serde::{Serialize, Deserialize};

pub mod finite_difference;

/// A spatial force and torque pair, both expressed in the world frame with
/// torques taken about the world origin.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wrench {
    pub force: Vector3<f64>,
    pub torque: Vector3<f64>
}
impl Wrench {
    pub fn new(force: Vector3<f64>, torque: Vector3<f64>) -> Self {
        Self { force, torque }
    }
    pub fn new_zero() -> Self {
        Self { force: Vector3::zeros(), torque: Vector3::zeros() }
    }
    pub fn set_zero(&mut self) {
        self.force = Vector3::zeros();
        self.torque = Vector3::zeros();
    }
    /// Euclidean norm of the stacked 6-vector (force, torque).
    pub fn norm(&self) -> f64 {
        (self.force.norm_squared() + self.torque.norm_squared()).sqrt()
    }
}
