use nalgebra::{DMatrix, DVector};
use crate::robot_models::PlanningGroupModel;
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;
use crate::utils::utils_parameters::PlanningParameters;

/// Derivative orders that contribute to the smoothness cost.
pub const SMOOTHNESS_DERIVATIVE_ORDERS: [usize; 3] = [1, 2, 3];

/// Precomputed quadratic smoothness form for a single joint:
/// `Q = sum_d w_d * A_d^T A_d + ridge * I`, where `A_d` is the banded central
/// finite-difference operator of derivative order `d` over the joint's waypoint
/// column and `w_d` combines the global per-derivative weight with the joint's
/// configured multiplier.  The pseudo-inverse of `Q` is kept alongside; its
/// maximum diagonal entry is the scale used to normalize costs across joints.
#[derive(Clone, Debug)]
pub struct JointSmoothnessCost {
    quad_cost: DMatrix<f64>,
    quad_cost_inv: DMatrix<f64>
}
impl JointSmoothnessCost {
    pub fn new(num_points: usize, discretization: f64, derivative_weights: [f64; 3], ridge_factor: f64) -> Self {
        let mut quad_cost = DMatrix::<f64>::zeros(num_points, num_points);
        for (i, order) in SMOOTHNESS_DERIVATIVE_ORDERS.iter().enumerate() {
            let w = derivative_weights[i];
            if w == 0.0 { continue; }
            let a = FiniteDifferenceUtils::get_derivative_operator_matrix(num_points, discretization, *order);
            quad_cost += w * (a.transpose() * &a);
        }
        quad_cost += ridge_factor * DMatrix::<f64>::identity(num_points, num_points);

        let quad_cost_inv = quad_cost.clone().pseudo_inverse(1e-10).unwrap_or_else(|_| DMatrix::zeros(num_points, num_points));

        Self { quad_cost, quad_cost_inv }
    }
    /// Quadratic form value over one joint's waypoint column.
    pub fn cost(&self, column: &DVector<f64>) -> f64 {
        let qx = &self.quad_cost * column;
        column.dot(&qx)
    }
    pub fn quad_cost(&self) -> &DMatrix<f64> {
        &self.quad_cost
    }
    pub fn quad_cost_inv(&self) -> &DMatrix<f64> {
        &self.quad_cost_inv
    }
    pub fn max_quad_cost_inv_value(&self) -> f64 {
        let mut max_value = 0.0;
        for i in 0..self.quad_cost_inv.nrows() {
            if self.quad_cost_inv[(i, i)] > max_value {
                max_value = self.quad_cost_inv[(i, i)];
            }
        }
        max_value
    }
    pub fn scale(&mut self, scale: f64) {
        self.quad_cost *= scale;
        self.quad_cost_inv /= scale;
    }
}

/// Per-joint quadratic smoothness costs for the whole planning group.  Purely a
/// precomputed bilinear form; holds no per-evaluation mutable state.
#[derive(Clone, Debug)]
pub struct SmoothnessCostModule {
    joint_costs: Vec<JointSmoothnessCost>
}
impl SmoothnessCostModule {
    pub fn new(planning_group: &PlanningGroupModel, num_points: usize, discretization: f64, parameters: &PlanningParameters) -> Self {
        let mut joint_costs = vec![];
        for group_joint in planning_group.group_joints() {
            let multiplier = parameters.joint_cost_multiplier(group_joint.joint_name());
            let derivative_weights = [
                multiplier * parameters.smoothness_cost_velocity,
                multiplier * parameters.smoothness_cost_acceleration,
                multiplier * parameters.smoothness_cost_jerk
            ];
            joint_costs.push(JointSmoothnessCost::new(num_points, discretization, derivative_weights, parameters.ridge_factor));
        }
        Self { joint_costs }
    }
    /// Rescales every joint's quadratic form by the maximum inverse-cost scale so
    /// that no single joint dominates the smoothness cost by scale alone.  Called
    /// once at initialization.
    pub fn normalize_across_joints(&mut self) {
        let mut max_cost_scale = 0.0;
        for joint_cost in &self.joint_costs {
            let cost_scale = joint_cost.max_quad_cost_inv_value();
            if cost_scale > max_cost_scale { max_cost_scale = cost_scale; }
        }
        if max_cost_scale > 0.0 {
            for joint_cost in &mut self.joint_costs {
                joint_cost.scale(max_cost_scale);
            }
        }
    }
    pub fn num_joints(&self) -> usize {
        self.joint_costs.len()
    }
    pub fn joint_cost(&self, joint_idx: usize) -> &JointSmoothnessCost {
        &self.joint_costs[joint_idx]
    }
    /// Smoothness cost of one joint's current waypoint column.
    pub fn cost(&self, joint_idx: usize, trajectory: &TrajectoryModule) -> f64 {
        let column = trajectory.points().column(joint_idx).into_owned();
        self.joint_costs[joint_idx].cost(&column)
    }
    /// Summed smoothness cost over all group joints.
    pub fn total_cost(&self, trajectory: &TrajectoryModule) -> f64 {
        let mut total = 0.0;
        for joint_idx in 0..self.joint_costs.len() {
            total += self.cost(joint_idx, trajectory);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_only_quadratic_form_matches_hand_computed_value() {
        // velocity-only weighting with dt = 1 and no ridge term; the central
        // difference of [0, 1, 2, 1, 0] is [_, 1, 0, -1, _], so the quadratic
        // form value is 1^2 + 0^2 + (-1)^2 = 2.
        let joint_cost = JointSmoothnessCost::new(5, 1.0, [1.0, 0.0, 0.0], 0.0);
        let column = DVector::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0]);
        assert!((joint_cost.cost(&column) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_term_adds_squared_norm() {
        let without_ridge = JointSmoothnessCost::new(5, 1.0, [1.0, 0.0, 0.0], 0.0);
        let with_ridge = JointSmoothnessCost::new(5, 1.0, [1.0, 0.0, 0.0], 0.1);
        let column = DVector::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0]);
        let expected = without_ridge.cost(&column) + 0.1 * column.norm_squared();
        assert!((with_ridge.cost(&column) - expected).abs() < 1e-10);
    }

    #[test]
    fn scale_multiplies_cost_value() {
        let mut joint_cost = JointSmoothnessCost::new(5, 1.0, [1.0, 0.0, 0.0], 0.0);
        let column = DVector::from_vec(vec![0.0, 1.0, 2.0, 1.0, 0.0]);
        let before = joint_cost.cost(&column);
        joint_cost.scale(3.0);
        assert!((joint_cost.cost(&column) - 3.0 * before).abs() < 1e-10);
    }

    #[test]
    fn normalization_applies_a_common_scale() {
        use crate::robot_models::{GroupJointModel, PlanningGroupModel};
        let group_joints = vec![
            GroupJointModel::new("a", 0, None),
            GroupJointModel::new("b", 1, None)
        ];
        let group = PlanningGroupModel::new("whole_body", group_joints, vec![], true);
        let mut parameters = PlanningParameters::default();
        parameters.joint_cost_multipliers.insert("b".to_string(), 4.0);
        let mut module = SmoothnessCostModule::new(&group, 7, 0.1, &parameters);

        let column = DVector::from_vec(vec![0.0, 0.1, 0.3, 0.4, 0.3, 0.1, 0.0]);
        let ratio_before = module.joint_cost(1).cost(&column) / module.joint_cost(0).cost(&column);
        module.normalize_across_joints();
        let ratio_after = module.joint_cost(1).cost(&column) / module.joint_cost(0).cost(&column);
        assert!((ratio_before - ratio_after).abs() < 1e-9);
        assert!((ratio_before - 4.0).abs() < 1e-9);
    }
}
