use itertools::izip;
use nalgebra::{Isometry3, Matrix3, Point3, Vector3, Vector4};
use crate::planning_interfaces::ContactViolationEvaluator;
use crate::robot_models::{PlanningGroupModel, RobotModelDescriptor};
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_math::finite_difference::FiniteDifferenceUtils;
use crate::utils::utils_math::Wrench;

/// Consumes forward-kinematics output across waypoints to compute the quantities
/// the stability costs are built on: center-of-mass trajectories and their
/// derivatives, per-segment velocities and angular velocities, angular momentum,
/// net torque, and the per-waypoint reference (gravity) wrench.
///
/// All buffers are sized once at construction and indexed by waypoint.  Interior
/// entries are fully overwritten on every `compute_wrench_sum` call; boundary
/// entries are written only on iteration 0 and intentionally reused afterwards.
#[derive(Clone, Debug)]
pub struct DynamicsEvaluatorModule {
    num_points: usize,
    discretization: f64,
    mass_segment_idxs: Vec<usize>,
    masses: Vec<f64>,
    local_coms: Vec<Vector3<f64>>,
    rotational_inertias: Vec<Matrix3<f64>>,
    total_mass: f64,
    gravity_force: Vector3<f64>,
    link_positions: Vec<Vec<Vector3<f64>>>,
    link_velocities: Vec<Vec<Vector3<f64>>>,
    link_angular_velocities: Vec<Vec<Vector3<f64>>>,
    com_positions: Vec<Vector3<f64>>,
    com_velocities: Vec<Vector3<f64>>,
    com_accelerations: Vec<Vector3<f64>>,
    angular_momentums: Vec<Vector3<f64>>,
    torques: Vec<Vector3<f64>>,
    wrench_sums: Vec<Wrench>,
    contact_violations: Vec<Vec<Vector4<f64>>>,
    contact_velocities: Vec<Vec<Vector3<f64>>>
}
impl DynamicsEvaluatorModule {
    pub fn new(robot_model: &RobotModelDescriptor, num_contacts: usize, num_points: usize, discretization: f64) -> Self {
        let mut mass_segment_idxs = vec![];
        let mut masses = vec![];
        let mut local_coms = vec![];
        let mut rotational_inertias = vec![];
        let mut total_mass = 0.0;
        for (idx, segment) in robot_model.segments().iter().enumerate() {
            if segment.mass() == 0.0 { continue; }
            mass_segment_idxs.push(idx);
            masses.push(segment.mass());
            local_coms.push(*segment.local_com());
            rotational_inertias.push(*segment.rotational_inertia());
            total_mass += segment.mass();
        }

        // gravity magnitude is normalized away; only the direction enters the reference wrench
        let gravity_force = Vector3::new(0.0, 0.0, -1.0);

        let num_mass_segments = mass_segment_idxs.len();
        Self {
            num_points,
            discretization,
            mass_segment_idxs,
            masses,
            local_coms,
            rotational_inertias,
            total_mass,
            gravity_force,
            link_positions: vec![vec![Vector3::zeros(); num_points]; num_mass_segments],
            link_velocities: vec![vec![Vector3::zeros(); num_points]; num_mass_segments],
            link_angular_velocities: vec![vec![Vector3::zeros(); num_points]; num_mass_segments],
            com_positions: vec![Vector3::zeros(); num_points],
            com_velocities: vec![Vector3::zeros(); num_points],
            com_accelerations: vec![Vector3::zeros(); num_points],
            angular_momentums: vec![Vector3::zeros(); num_points],
            torques: vec![Vector3::zeros(); num_points],
            wrench_sums: vec![Wrench::new_zero(); num_points],
            contact_violations: vec![vec![Vector4::zeros(); num_points]; num_contacts],
            contact_velocities: vec![vec![Vector3::zeros(); num_points]; num_contacts]
        }
    }
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }
    pub fn gravity_force(&self) -> &Vector3<f64> {
        &self.gravity_force
    }
    pub fn com_position(&self, point: usize) -> &Vector3<f64> {
        &self.com_positions[point]
    }
    pub fn com_velocity(&self, point: usize) -> &Vector3<f64> {
        &self.com_velocities[point]
    }
    pub fn com_acceleration(&self, point: usize) -> &Vector3<f64> {
        &self.com_accelerations[point]
    }
    pub fn angular_momentum(&self, point: usize) -> &Vector3<f64> {
        &self.angular_momentums[point]
    }
    pub fn torque(&self, point: usize) -> &Vector3<f64> {
        &self.torques[point]
    }
    pub fn wrench_sum(&self, point: usize) -> &Wrench {
        &self.wrench_sums[point]
    }
    pub fn contact_violation(&self, contact: usize, point: usize) -> &Vector4<f64> {
        &self.contact_violations[contact][point]
    }
    pub fn contact_velocity(&self, contact: usize, point: usize) -> &Vector3<f64> {
        &self.contact_velocities[contact][point]
    }

    /// Runs the per-waypoint physics pipeline for the current trajectory.
    /// On iteration 0 the center of mass is computed for every waypoint (boundary
    /// included); afterwards only for the interior waypoints, reusing the fixed
    /// boundary results.  Groups that do not participate in whole-body dynamics
    /// skip all work here and contribute zero to the downstream stability costs.
    pub fn compute_wrench_sum(&mut self, iteration: usize, trajectory: &TrajectoryModule, planning_group: &PlanningGroupModel, segment_frames: &[Vec<Isometry3<f64>>], violation_evaluator: &dyn ContactViolationEvaluator) {
        if !planning_group.participates_in_dynamics() { return; }

        let num_points = self.num_points;
        let (start, end) = if iteration == 0 { (0, num_points - 1) } else { (1, num_points - 2) };

        for point in start..=end {
            self.update_com(point, segment_frames);
        }

        FiniteDifferenceUtils::vector_series_velocities_and_accelerations(1, num_points - 2, self.discretization, &self.com_positions, &mut self.com_velocities, &mut self.com_accelerations);
        for i in 0..self.mass_segment_idxs.len() {
            FiniteDifferenceUtils::vector_series_velocities(1, num_points - 2, self.discretization, &self.link_positions[i], &mut self.link_velocities[i]);
        }

        // per-segment angular velocity from the rotation delta between consecutive waypoints
        let inv_time = 1.0 / self.discretization;
        for point in 1..=num_points - 2 {
            for (i, sn) in self.mass_segment_idxs.iter().enumerate() {
                let prev_rotation = &segment_frames[point - 1][*sn].rotation;
                let cur_rotation = &segment_frames[point][*sn].rotation;
                let rotation_delta = cur_rotation * prev_rotation.inverse();
                self.link_angular_velocities[i][point] = rotation_delta.scaled_axis() * inv_time;
            }
        }

        for point in 1..=num_points - 2 {
            let mut angular_momentum = Vector3::zeros();
            for (i, sn, mass, inertia) in izip!(0..self.mass_segment_idxs.len(), &self.mass_segment_idxs, &self.masses, &self.rotational_inertias) {
                let rotation = segment_frames[point][*sn].rotation.to_rotation_matrix();
                let world_inertia = rotation.matrix() * inertia * rotation.matrix().transpose();
                let angular_velocity_term = world_inertia * self.link_angular_velocities[i][point];
                angular_momentum += *mass * (self.link_positions[i][point] - self.com_positions[point]).cross(&self.link_velocities[i][point])
                    + angular_velocity_term;
            }
            self.angular_momentums[point] = angular_momentum;
        }

        FiniteDifferenceUtils::vector_series_velocities(1, num_points - 2, self.discretization, &self.angular_momentums, &mut self.torques);

        for point in 1..=num_points - 2 {
            self.wrench_sums[point].force = self.gravity_force;
            self.wrench_sums[point].torque = self.com_positions[point].cross(&self.gravity_force);
        }

        for (i, contact) in planning_group.contact_points().iter().enumerate() {
            violation_evaluator.violation(contact, 1, num_points - 2, trajectory.discretization(), segment_frames, &mut self.contact_violations[i], &mut self.contact_velocities[i]);
        }
    }

    /// Mass-weighted average of every non-zero-mass segment's world center of mass.
    fn update_com(&mut self, point: usize, segment_frames: &[Vec<Isometry3<f64>>]) {
        let mut com = Vector3::zeros();
        for (i, sn, mass, local_com) in izip!(0..self.mass_segment_idxs.len(), &self.mass_segment_idxs, &self.masses, &self.local_coms) {
            let pos = (segment_frames[point][*sn] * Point3::from(*local_com)).coords;
            com += *mass * pos;
            self.link_positions[i][point] = pos;
        }
        self.com_positions[point] = com / self.total_mass;
    }
}
