use nalgebra::{DMatrix, DVector};
use serde::{Serialize, Deserialize};
use crate::robot_models::PlanningGroupModel;
use crate::utils::utils_errors::PlannerError;

/// The `TrajectoryModule` owns the two coupled trajectory representations used
/// during optimization:
///
/// - The *group* trajectory: a `[waypoint, joint]` matrix over only the joints of
///   the active planning group.  This is the source of truth while optimizing.
/// - The *full* trajectory: a `[waypoint, joint]` matrix over every physical joint
///   of the robot, re-derived from the group trajectory through the group→full
///   joint index map before any forward-kinematics request.
///
/// Waypoints are partitioned into `num_contact_phases` half-open contact phases of
/// `phase_stride` waypoints each, so `num_points = num_contact_phases * phase_stride + 1`.
/// The phase boundaries are the trajectory's keyframes.  The *free* keyframes --
/// all of them except the first one and the last two -- are the only entries the
/// optimizer may write; the start waypoint and the goal region are immutable
/// boundary states.  Each contact phase is associated with one row of the
/// `[phase, contact]` activation matrix, which therefore has
/// `num_contact_phases + 1` rows.
///
/// With `phase_stride == 1` every interior waypoint except the last two is a free
/// keyframe.  With a coarser stride, waypoints strictly between keyframes are
/// re-derived by cubic Hermite interpolation from the keyframe positions and
/// velocities whenever the free block is rewritten.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryModule {
    num_points: usize,
    num_joints: usize,
    num_contacts: usize,
    num_contact_phases: usize,
    phase_stride: usize,
    discretization: f64,
    points: DMatrix<f64>,
    keyframe_velocities: DMatrix<f64>,
    contact_values: DMatrix<f64>,
    full_points: DMatrix<f64>,
    group_to_full_joint_idxs: Vec<usize>
}
impl TrajectoryModule {
    pub fn new(num_points: usize, phase_stride: usize, discretization: f64, planning_group: &PlanningGroupModel, num_full_joints: usize) -> Result<Self, PlannerError> {
        if num_points < 3 * phase_stride + 1 || (num_points - 1) % phase_stride != 0 {
            return Err(PlannerError::new_precondition_violation_error("TrajectoryModule::new", &format!("num_points {} is incompatible with phase stride {}.", num_points, phase_stride), file!(), line!()));
        }
        let num_joints = planning_group.num_joints();
        let num_contacts = planning_group.num_contacts();
        let num_contact_phases = (num_points - 1) / phase_stride;

        Ok(Self {
            num_points,
            num_joints,
            num_contacts,
            num_contact_phases,
            phase_stride,
            discretization,
            points: DMatrix::zeros(num_points, num_joints),
            keyframe_velocities: DMatrix::zeros(num_contact_phases + 1, num_joints),
            contact_values: DMatrix::zeros(num_contact_phases + 1, num_contacts),
            full_points: DMatrix::zeros(num_points, num_full_joints),
            group_to_full_joint_idxs: planning_group.group_to_full_joint_idxs()
        })
    }
    pub fn num_points(&self) -> usize {
        self.num_points
    }
    pub fn num_joints(&self) -> usize {
        self.num_joints
    }
    pub fn num_contacts(&self) -> usize {
        self.num_contacts
    }
    pub fn num_contact_phases(&self) -> usize {
        self.num_contact_phases
    }
    pub fn phase_stride(&self) -> usize {
        self.phase_stride
    }
    pub fn discretization(&self) -> f64 {
        self.discretization
    }
    /// Number of keyframes the optimizer controls.
    pub fn num_free_points(&self) -> usize {
        self.num_contact_phases - 2
    }
    /// Waypoint index of the i'th free keyframe.
    pub fn free_point_idx(&self, free_idx: usize) -> usize {
        (free_idx + 1) * self.phase_stride
    }
    pub fn points(&self) -> &DMatrix<f64> {
        &self.points
    }
    pub fn keyframe_velocities(&self) -> &DMatrix<f64> {
        &self.keyframe_velocities
    }
    pub fn contact_values(&self) -> &DMatrix<f64> {
        &self.contact_values
    }
    pub fn full_points(&self) -> &DMatrix<f64> {
        &self.full_points
    }
    pub fn contact_value(&self, phase: usize, contact: usize) -> f64 {
        self.contact_values[(phase, contact)]
    }
    /// Pure stride lookup of the contact phase covering the given waypoint.
    /// Phases are half-open on the right; the final waypoint maps to the fixed
    /// goal row of the activation matrix.
    pub fn contact_phase_of(&self, point: usize) -> usize {
        point / self.phase_stride
    }

    /// Overwrites the trajectory's free variables with dense blocks from the optimizer.
    /// `positions` and `velocities` must be `num_free_points x num_joints`;
    /// `contact_activations` must be `(num_free_points + 1) x num_contacts`.
    /// Any other shape is a programming error and aborts the evaluation.
    pub fn write_free_block(&mut self, positions: &DMatrix<f64>, velocities: &DMatrix<f64>, contact_activations: &DMatrix<f64>) -> Result<(), PlannerError> {
        let num_free = self.num_free_points();
        if positions.shape() != (num_free, self.num_joints) {
            return Err(PlannerError::new_block_shape_error("write_free_block", positions.shape(), (num_free, self.num_joints), file!(), line!()));
        }
        if velocities.shape() != (num_free, self.num_joints) {
            return Err(PlannerError::new_block_shape_error("write_free_block", velocities.shape(), (num_free, self.num_joints), file!(), line!()));
        }
        if contact_activations.shape() != (num_free + 1, self.num_contacts) {
            return Err(PlannerError::new_block_shape_error("write_free_block", contact_activations.shape(), (num_free + 1, self.num_contacts), file!(), line!()));
        }

        for i in 0..num_free {
            let keyframe = i + 1;
            let point = self.free_point_idx(i);
            for j in 0..self.num_joints {
                self.points[(point, j)] = positions[(i, j)];
                self.keyframe_velocities[(keyframe, j)] = velocities[(i, j)];
            }
        }
        for i in 0..=num_free {
            for c in 0..self.num_contacts {
                self.contact_values[(i, c)] = contact_activations[(i, c)];
            }
        }

        self.update_trajectory_from_free_points();

        Ok(())
    }

    /// Re-derives the waypoints strictly between keyframes from the keyframe
    /// positions and velocities with cubic Hermite interpolation.  A no-op when
    /// the phase stride is 1 (every waypoint is a keyframe).
    pub fn update_trajectory_from_free_points(&mut self) {
        if self.phase_stride == 1 { return; }

        let segment_duration = self.phase_stride as f64 * self.discretization;
        for phase in 0..self.num_contact_phases {
            let p0 = phase * self.phase_stride;
            let p1 = (phase + 1) * self.phase_stride;
            for j in 0..self.num_joints {
                let x0 = self.points[(p0, j)];
                let x1 = self.points[(p1, j)];
                let v0 = self.keyframe_velocities[(phase, j)] * segment_duration;
                let v1 = self.keyframe_velocities[(phase + 1, j)] * segment_duration;
                for s in 1..self.phase_stride {
                    let u = s as f64 / self.phase_stride as f64;
                    let u2 = u * u;
                    let u3 = u2 * u;
                    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
                    let h10 = u3 - 2.0 * u2 + u;
                    let h01 = -2.0 * u3 + 3.0 * u2;
                    let h11 = u3 - u2;
                    self.points[(p0 + s, j)] = h00 * x0 + h10 * v0 + h01 * x1 + h11 * v1;
                }
            }
        }
    }

    /// Hard per-sample clamp of every mutable waypoint into each limited joint's
    /// `[min, max]` range.  Applied independently per sample; idempotent.
    pub fn project_joint_limits(&mut self, planning_group: &PlanningGroupModel) {
        for (j, group_joint) in planning_group.group_joints().iter().enumerate() {
            let limits = match group_joint.limits() {
                None => { continue; }
                Some(l) => { l }
            };
            for point in 1..self.num_points - 2 {
                if self.points[(point, j)] > limits.1 {
                    self.points[(point, j)] = limits.1;
                } else if self.points[(point, j)] < limits.0 {
                    self.points[(point, j)] = limits.0;
                }
            }
        }
    }

    /// Rewrites the full trajectory's group columns from the group trajectory via
    /// the group→full joint index map.  Must be called before any kinematics request.
    pub fn sync_full_from_group(&mut self) {
        for (j, full_idx) in self.group_to_full_joint_idxs.iter().enumerate() {
            for point in 0..self.num_points {
                self.full_points[(point, *full_idx)] = self.points[(point, j)];
            }
        }
    }

    /// Fills every row of the full trajectory with the given reference state.
    /// Non-group joints keep these values for the whole planning attempt.
    pub fn set_full_state_reference(&mut self, full_state: &DVector<f64>) -> Result<(), PlannerError> {
        if full_state.len() != self.full_points.ncols() {
            return Err(PlannerError::new_precondition_violation_error("set_full_state_reference", &format!("full state of length {} was given where {} was expected.", full_state.len(), self.full_points.ncols()), file!(), line!()));
        }
        for point in 0..self.num_points {
            for k in 0..full_state.len() {
                self.full_points[(point, k)] = full_state[k];
            }
        }
        Ok(())
    }

    pub fn full_state_at_point(&self, point: usize) -> DVector<f64> {
        self.full_points.row(point).transpose()
    }

    /// Straight-line initialization of the group trajectory between a start and
    /// goal state, with zero keyframe velocities and zero contact activations.
    pub fn initialize_linear_interpolation(&mut self, start: &DVector<f64>, goal: &DVector<f64>) -> Result<(), PlannerError> {
        if start.len() != self.num_joints || goal.len() != self.num_joints {
            return Err(PlannerError::new_precondition_violation_error("initialize_linear_interpolation", "start/goal state length does not match the number of group joints.", file!(), line!()));
        }
        for point in 0..self.num_points {
            let t = point as f64 / (self.num_points - 1) as f64;
            for j in 0..self.num_joints {
                self.points[(point, j)] = (1.0 - t) * start[j] + t * goal[j];
            }
        }
        self.keyframe_velocities.fill(0.0);
        self.contact_values.fill(0.0);
        Ok(())
    }

    pub fn set_point(&mut self, point: usize, values: &DVector<f64>) -> Result<(), PlannerError> {
        if point >= self.num_points {
            return Err(PlannerError::new_idx_out_of_bound_error(point, self.num_points, file!(), line!()));
        }
        if values.len() != self.num_joints {
            return Err(PlannerError::new_precondition_violation_error("set_point", "state length does not match the number of group joints.", file!(), line!()));
        }
        for j in 0..self.num_joints {
            self.points[(point, j)] = values[j];
        }
        Ok(())
    }

    pub fn set_contact_value(&mut self, phase: usize, contact: usize, value: f64) -> Result<(), PlannerError> {
        if phase >= self.num_contact_phases + 1 {
            return Err(PlannerError::new_idx_out_of_bound_error(phase, self.num_contact_phases + 1, file!(), line!()));
        }
        self.contact_values[(phase, contact)] = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot_models::{GroupJointModel, PlanningGroupModel};

    fn test_group(num_joints: usize, num_contacts: usize) -> PlanningGroupModel {
        let group_joints = (0..num_joints)
            .map(|j| GroupJointModel::new(&format!("joint_{}", j), j, Some((-1.0, 1.0))))
            .collect();
        let contact_points = (0..num_contacts)
            .map(|c| crate::robot_models::ContactPointModel::new(&format!("contact_{}", c), c + 1, 0))
            .collect();
        PlanningGroupModel::new("lower_body", group_joints, contact_points, true)
    }

    #[test]
    fn free_structure_excludes_boundary_and_goal_waypoints() {
        let group = test_group(2, 1);
        let trajectory = TrajectoryModule::new(5, 1, 0.05, &group, 4).expect("error");
        assert_eq!(trajectory.num_contact_phases(), 4);
        assert_eq!(trajectory.num_free_points(), 2);
        assert_eq!(trajectory.free_point_idx(0), 1);
        assert_eq!(trajectory.free_point_idx(1), 2);
        assert_eq!(trajectory.contact_values().nrows(), 5);
    }

    #[test]
    fn write_free_block_rejects_mismatched_shapes() {
        let group = test_group(2, 1);
        let mut trajectory = TrajectoryModule::new(5, 1, 0.05, &group, 4).expect("error");
        let positions = DMatrix::zeros(2, 2);
        let velocities = DMatrix::zeros(2, 2);
        let bad_positions = DMatrix::zeros(3, 2);
        let contacts = DMatrix::zeros(3, 1);
        let bad_contacts = DMatrix::zeros(2, 1);

        let res = trajectory.write_free_block(&bad_positions, &velocities, &contacts);
        assert!(matches!(res, Err(PlannerError::PreconditionViolationError(_))));
        let res = trajectory.write_free_block(&positions, &velocities, &bad_contacts);
        assert!(matches!(res, Err(PlannerError::PreconditionViolationError(_))));
        let res = trajectory.write_free_block(&positions, &velocities, &contacts);
        assert!(res.is_ok());
    }

    #[test]
    fn joint_limit_projection_is_idempotent_and_preserves_boundaries() {
        let group = test_group(1, 0);
        let mut trajectory = TrajectoryModule::new(7, 1, 0.05, &group, 1).expect("error");
        for point in 0..7 {
            trajectory.set_point(point, &DVector::from_vec(vec![2.0])).expect("error");
        }
        trajectory.project_joint_limits(&group);
        // boundary waypoint and last two waypoints are untouched
        assert_eq!(trajectory.points()[(0, 0)], 2.0);
        assert_eq!(trajectory.points()[(5, 0)], 2.0);
        assert_eq!(trajectory.points()[(6, 0)], 2.0);
        for point in 1..5 {
            assert_eq!(trajectory.points()[(point, 0)], 1.0);
        }
        let snapshot = trajectory.points().clone();
        trajectory.project_joint_limits(&group);
        assert_eq!(trajectory.points(), &snapshot);
    }

    #[test]
    fn contact_phase_lookup_uses_stride() {
        let group = test_group(1, 2);
        let trajectory = TrajectoryModule::new(13, 3, 0.05, &group, 1).expect("error");
        assert_eq!(trajectory.num_contact_phases(), 4);
        assert_eq!(trajectory.contact_phase_of(0), 0);
        assert_eq!(trajectory.contact_phase_of(2), 0);
        assert_eq!(trajectory.contact_phase_of(3), 1);
        assert_eq!(trajectory.contact_phase_of(11), 3);
        assert_eq!(trajectory.contact_phase_of(12), 4);
    }

    #[test]
    fn sync_full_from_group_maps_columns() {
        let group_joints = vec![
            GroupJointModel::new("a", 2, None),
            GroupJointModel::new("b", 0, None)
        ];
        let group = PlanningGroupModel::new("whole_body", group_joints, vec![], true);
        let mut trajectory = TrajectoryModule::new(4, 1, 0.05, &group, 4).expect("error");
        trajectory.set_full_state_reference(&DVector::from_vec(vec![9.0, 9.0, 9.0, 9.0])).expect("error");
        trajectory.set_point(1, &DVector::from_vec(vec![0.5, -0.5])).expect("error");
        trajectory.sync_full_from_group();
        let full = trajectory.full_state_at_point(1);
        assert_eq!(full[2], 0.5);
        assert_eq!(full[0], -0.5);
        assert_eq!(full[1], 9.0);
        assert_eq!(full[3], 9.0);
    }

    #[test]
    fn hermite_interpolation_matches_keyframes_at_segment_ends() {
        let group = test_group(1, 1);
        let mut trajectory = TrajectoryModule::new(13, 4, 0.05, &group, 1).expect("error");
        let positions = DMatrix::from_vec(1, 1, vec![0.8]);
        let velocities = DMatrix::from_vec(1, 1, vec![0.0]);
        let contacts = DMatrix::zeros(2, 1);
        trajectory.write_free_block(&positions, &velocities, &contacts).expect("error");
        // keyframe value is written exactly, and with zero end velocities the
        // interpolant stays within the keyframe values
        assert_eq!(trajectory.points()[(4, 0)], 0.8);
        for s in 1..4 {
            let v = trajectory.points()[(s, 0)];
            assert!(v >= 0.0 && v <= 0.8);
        }
    }
}
