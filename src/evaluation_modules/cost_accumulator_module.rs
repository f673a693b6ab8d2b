use nalgebra::DVector;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use crate::evaluation_modules::stability_evaluator_module::StabilityEvaluatorModule;
use crate::trajectory_modules::smoothness_cost_module::SmoothnessCostModule;
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_console::{planner_print, PrintColor, PrintMode};
use crate::utils::utils_parameters::PlanningParameters;

#[derive(Clone, Debug, Display, EnumIter, PartialEq, Eq)]
pub enum TrajectoryCostTerm {
    Smoothness,
    Collision,
    ContactInvariant,
    PhysicsViolation
}

/// Combines the evaluators' per-waypoint cost terms into the per-waypoint cost
/// vector and the scalar trajectory cost, applying the configured per-term
/// weights.  The smoothness cost is a per-joint quantity; it is distributed
/// uniformly over the waypoints so the per-waypoint vector still sums to the
/// trajectory cost.
#[derive(Clone, Debug)]
pub struct TrajectoryCostAccumulatorModule {
    smoothness_cost_weight: f64,
    collision_cost_weight: f64,
    contact_invariant_cost_weight: f64,
    physics_violation_cost_weight: f64,
    physics_violation_feasibility_threshold: f64,
    per_waypoint_costs: DVector<f64>,
    smoothness_total: f64,
    collision_total: f64,
    contact_invariant_total: f64,
    physics_violation_total: f64,
    physics_violation_raw_total: f64
}
impl TrajectoryCostAccumulatorModule {
    pub fn new(num_points: usize, parameters: &PlanningParameters) -> Self {
        Self {
            smoothness_cost_weight: parameters.smoothness_cost_weight,
            collision_cost_weight: parameters.collision_cost_weight,
            contact_invariant_cost_weight: parameters.contact_invariant_cost_weight,
            physics_violation_cost_weight: parameters.physics_violation_cost_weight,
            physics_violation_feasibility_threshold: parameters.physics_violation_feasibility_threshold,
            per_waypoint_costs: DVector::zeros(num_points),
            smoothness_total: 0.0,
            collision_total: 0.0,
            contact_invariant_total: 0.0,
            physics_violation_total: 0.0,
            physics_violation_raw_total: 0.0
        }
    }

    pub fn compute(&mut self, trajectory: &TrajectoryModule, smoothness: &SmoothnessCostModule, stability: &StabilityEvaluatorModule, state_collision_costs: &DVector<f64>) {
        let num_points = trajectory.num_points();

        self.smoothness_total = self.smoothness_cost_weight * smoothness.total_cost(trajectory);
        self.collision_total = 0.0;
        self.contact_invariant_total = 0.0;
        self.physics_violation_raw_total = 0.0;

        let smoothness_per_waypoint = self.smoothness_total / num_points as f64;
        for point in 0..num_points {
            let collision = self.collision_cost_weight * state_collision_costs[point];
            let contact_invariant = self.contact_invariant_cost_weight * stability.state_contact_invariant_costs()[point];
            let physics_violation = self.physics_violation_cost_weight * stability.state_physics_violation_costs()[point];
            self.collision_total += collision;
            self.contact_invariant_total += contact_invariant;
            self.physics_violation_raw_total += stability.state_physics_violation_costs()[point];
            self.per_waypoint_costs[point] = smoothness_per_waypoint + collision + contact_invariant + physics_violation;
        }
        self.physics_violation_total = self.physics_violation_cost_weight * self.physics_violation_raw_total;
    }

    pub fn waypoint_cost(&self, point: usize) -> f64 {
        self.per_waypoint_costs[point]
    }
    pub fn per_waypoint_costs(&self) -> &DVector<f64> {
        &self.per_waypoint_costs
    }
    pub fn trajectory_cost(&self) -> f64 {
        self.per_waypoint_costs.sum()
    }
    pub fn term_total(&self, term: &TrajectoryCostTerm) -> f64 {
        match term {
            TrajectoryCostTerm::Smoothness => { self.smoothness_total }
            TrajectoryCostTerm::Collision => { self.collision_total }
            TrajectoryCostTerm::ContactInvariant => { self.contact_invariant_total }
            TrajectoryCostTerm::PhysicsViolation => { self.physics_violation_total }
        }
    }
    /// A trajectory is feasible when its unweighted physics-violation cost sum is
    /// below the configured threshold.
    pub fn is_feasible(&self) -> bool {
        self.physics_violation_raw_total < self.physics_violation_feasibility_threshold
    }

    pub fn print(&self, iteration: usize) {
        planner_print(&format!("Iteration {} | trajectory cost: {:.6}", iteration, self.trajectory_cost()), PrintMode::Println, PrintColor::Cyan, true);
        for term in TrajectoryCostTerm::iter() {
            planner_print(&format!("  {}: {:.6}", term, self.term_total(&term)), PrintMode::Println, PrintColor::None, false);
        }
        let color = if self.is_feasible() { PrintColor::Green } else { PrintColor::Yellow };
        planner_print(&format!("  feasible: {}", self.is_feasible()), PrintMode::Println, color, false);
    }
}
