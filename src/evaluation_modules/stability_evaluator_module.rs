use nalgebra::{DVector, Isometry3, Vector3};
use crate::evaluation_modules::dynamics_evaluator_module::DynamicsEvaluatorModule;
use crate::planning_interfaces::ContactForceSolver;
use crate::robot_models::PlanningGroupModel;
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_math::Wrench;
use crate::utils::utils_parameters::PlanningParameters;

/// Computes the two contact-related cost terms for every interior waypoint:
///
/// - The *contact-invariant* cost penalizes an "active" contact point that is
///   separating from the ground or moving while nominally planted, weighted by
///   the contact's activation value for the waypoint's phase.
/// - The *physics-violation* cost is the norm of the 6-vector residual between
///   the solved contact wrench and the wrench needed to cancel the reference
///   (gravity) wrench.
///
/// Both cost vectors are fully overwritten on every call; waypoints outside the
/// interior range, and every waypoint of a group that does not participate in
/// dynamics, are zero.
#[derive(Clone, Debug)]
pub struct StabilityEvaluatorModule {
    state_contact_invariant_costs: DVector<f64>,
    state_physics_violation_costs: DVector<f64>,
    contact_positions: Vec<Vector3<f64>>,
    contact_parent_frames: Vec<Isometry3<f64>>,
    contact_activations: Vec<f64>
}
impl StabilityEvaluatorModule {
    pub fn new(num_points: usize, num_contacts: usize) -> Self {
        Self {
            state_contact_invariant_costs: DVector::zeros(num_points),
            state_physics_violation_costs: DVector::zeros(num_points),
            contact_positions: vec![Vector3::zeros(); num_contacts],
            contact_parent_frames: vec![Isometry3::identity(); num_contacts],
            contact_activations: vec![0.0; num_contacts]
        }
    }
    pub fn state_contact_invariant_costs(&self) -> &DVector<f64> {
        &self.state_contact_invariant_costs
    }
    pub fn state_physics_violation_costs(&self) -> &DVector<f64> {
        &self.state_physics_violation_costs
    }

    pub fn compute_stability_costs(&mut self, trajectory: &TrajectoryModule, planning_group: &PlanningGroupModel, segment_frames: &[Vec<Isometry3<f64>>], dynamics: &DynamicsEvaluatorModule, force_solver: &dyn ContactForceSolver, parameters: &PlanningParameters) {
        self.state_contact_invariant_costs.fill(0.0);
        self.state_physics_violation_costs.fill(0.0);

        if !planning_group.participates_in_dynamics() { return; }

        let num_points = trajectory.num_points();
        let num_contacts = planning_group.num_contacts();

        for point in 1..=num_points - 2 {
            for (i, contact) in planning_group.contact_points().iter().enumerate() {
                self.contact_positions[i] = contact.position(point, segment_frames);
                self.contact_parent_frames[i] = contact.parent_frame(point, segment_frames);
            }
            let phase = trajectory.contact_phase_of(point);
            for i in 0..num_contacts {
                self.contact_activations[i] = trajectory.contact_value(phase, i);
            }

            let contact_forces = force_solver.solve(parameters.friction_coefficient, &self.contact_positions, &self.contact_parent_frames, &self.contact_activations, dynamics.wrench_sum(point));

            let mut contact_invariant_cost = 0.0;
            for i in 0..num_contacts {
                let violation = dynamics.contact_violation(i, point);
                let velocity = dynamics.contact_velocity(i, point);
                let cost = violation.norm_squared() + parameters.contact_invariant_velocity_weight * velocity.norm_squared();
                contact_invariant_cost += self.contact_activations[i] * cost;
            }

            let mut contact_wrench = Wrench::new_zero();
            for i in 0..num_contacts {
                contact_wrench.force += contact_forces[i];
                contact_wrench.torque += self.contact_positions[i].cross(&contact_forces[i]);
            }

            let reference_wrench = dynamics.wrench_sum(point);
            let violation_wrench = Wrench::new(contact_wrench.force + reference_wrench.force, contact_wrench.torque + reference_wrench.torque);

            self.state_contact_invariant_costs[point] = contact_invariant_cost;
            self.state_physics_violation_costs[point] = violation_wrench.norm();
        }
    }
}
