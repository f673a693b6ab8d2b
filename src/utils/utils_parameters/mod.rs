use std::collections::HashMap;
use serde::{Serialize, Deserialize};

/// Tunable parameters of the evaluation and optimization pipeline.
///
/// The struct round-trips through RON and JSON strings (via the blanket
/// `ToAndFromRonString` / `ToAndFromJsonString` traits), so a surrounding system can
/// persist and reload a parameter set without this crate taking on any file or
/// transport surface of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanningParameters {
    /// Global weight on the velocity term of the per-joint smoothness cost.
    pub smoothness_cost_velocity: f64,
    /// Global weight on the acceleration term of the per-joint smoothness cost.
    pub smoothness_cost_acceleration: f64,
    /// Global weight on the jerk term of the per-joint smoothness cost.
    pub smoothness_cost_jerk: f64,
    /// Tikhonov term added to each joint's quadratic smoothness form for conditioning.
    pub ridge_factor: f64,
    /// Per-joint smoothness multipliers keyed by joint name; joints not listed use 1.0.
    pub joint_cost_multipliers: HashMap<String, f64>,
    /// Friction coefficient handed to the external contact-force solver.
    pub friction_coefficient: f64,
    /// Weight on the squared contact-point velocity inside the contact-invariant cost.
    pub contact_invariant_velocity_weight: f64,
    pub smoothness_cost_weight: f64,
    pub collision_cost_weight: f64,
    pub contact_invariant_cost_weight: f64,
    pub physics_violation_cost_weight: f64,
    /// A trajectory is reported feasible when its summed physics-violation cost is below this.
    pub physics_violation_feasibility_threshold: f64,
    /// Scale of the zero-mean Gaussian noise optionally added to the initial
    /// optimization vector before a minimization run.
    pub noise_scale: f64,
    /// Bounded line-search / curvature history handed to the numerical minimizer.
    pub minimizer_history_size: usize,
    /// Relative-objective-change stopping tolerance handed to the numerical minimizer.
    pub minimizer_rel_tolerance: f64,
    /// The evaluation observer is invoked every `diagnostic_cadence` evaluations.
    pub diagnostic_cadence: usize
}
impl PlanningParameters {
    pub fn joint_cost_multiplier(&self, joint_name: &str) -> f64 {
        return match self.joint_cost_multipliers.get(joint_name) {
            None => { 1.0 }
            Some(m) => { *m }
        }
    }
}
impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            smoothness_cost_velocity: 0.0,
            smoothness_cost_acceleration: 1.0,
            smoothness_cost_jerk: 0.0,
            ridge_factor: 0.0,
            joint_cost_multipliers: HashMap::new(),
            friction_coefficient: 2.0,
            contact_invariant_velocity_weight: 16.0,
            smoothness_cost_weight: 1.0,
            collision_cost_weight: 1.0,
            contact_invariant_cost_weight: 1.0,
            physics_violation_cost_weight: 1.0,
            physics_violation_feasibility_threshold: 1.0e-2,
            noise_scale: 0.01,
            minimizer_history_size: 10,
            minimizer_rel_tolerance: 1.0e-7,
            diagnostic_cadence: 1000
        }
    }
}
