#![allow(dead_code)]

use nalgebra::{DVector, Isometry3, Matrix3, Vector3, Vector4};
use citopt::planning_interfaces::{ContactForceSolver, ContactViolationEvaluator, FkWaypointOutput, ForwardKinematicsSolver, StateValidityChecker};
use citopt::robot_models::{ContactPointModel, GroupJointModel, PlanningGroupModel, RobotModelDescriptor, RobotSegmentModel};
use citopt::utils::utils_math::Wrench;

/// Kinematics stub for groups that do not participate in dynamics: every segment
/// frame is the identity regardless of the joint state.
pub struct IdentityFkSolver {
    pub num_segments: usize
}
impl ForwardKinematicsSolver for IdentityFkSolver {
    fn fk_full(&self, _full_state: &DVector<f64>) -> FkWaypointOutput {
        FkWaypointOutput {
            segment_frames: vec![Isometry3::identity(); self.num_segments],
            joint_positions: vec![],
            joint_axes: vec![]
        }
    }
    fn fk_partial(&self, full_state: &DVector<f64>) -> FkWaypointOutput {
        self.fk_full(full_state)
    }
}

/// Kinematics stub for a floating base: the first three joint values are the
/// world position of segment 0, and the remaining segments sit at fixed world
/// positions (one per contact).
pub struct FloatingBaseFkSolver {
    pub contact_positions: Vec<Vector3<f64>>
}
impl ForwardKinematicsSolver for FloatingBaseFkSolver {
    fn fk_full(&self, full_state: &DVector<f64>) -> FkWaypointOutput {
        let mut segment_frames = vec![Isometry3::translation(full_state[0], full_state[1], full_state[2])];
        for p in &self.contact_positions {
            segment_frames.push(Isometry3::translation(p.x, p.y, p.z));
        }
        FkWaypointOutput {
            segment_frames,
            joint_positions: vec![],
            joint_axes: vec![]
        }
    }
    fn fk_partial(&self, full_state: &DVector<f64>) -> FkWaypointOutput {
        self.fk_full(full_state)
    }
}

pub struct AlwaysValidChecker;
impl StateValidityChecker for AlwaysValidChecker {
    fn is_state_valid(&self, _full_state: &DVector<f64>) -> bool {
        true
    }
    fn collision_depth_sum(&self, _full_state: &DVector<f64>) -> f64 {
        0.0
    }
}

/// Returns the same force at every contact, ignoring the reference wrench.
pub struct FixedForceSolver {
    pub force: Vector3<f64>
}
impl ContactForceSolver for FixedForceSolver {
    fn solve(&self, _friction_coefficient: f64, contact_positions: &[Vector3<f64>], _contact_parent_frames: &[Isometry3<f64>], _activations: &[f64], _reference_wrench: &Wrench) -> Vec<Vector3<f64>> {
        vec![self.force; contact_positions.len()]
    }
}

/// Writes the same violation and velocity at every waypoint in range.
pub struct ConstantViolationEvaluator {
    pub violation: Vector4<f64>,
    pub velocity: Vector3<f64>
}
impl ConstantViolationEvaluator {
    pub fn new_zero() -> Self {
        Self { violation: Vector4::zeros(), velocity: Vector3::zeros() }
    }
}
impl ContactViolationEvaluator for ConstantViolationEvaluator {
    fn violation(&self, _contact: &ContactPointModel, start: usize, end: usize, _discretization: f64, _segment_frames: &[Vec<Isometry3<f64>>], violations_out: &mut [Vector4<f64>], velocities_out: &mut [Vector3<f64>]) {
        for point in start..=end {
            violations_out[point] = self.violation;
            velocities_out[point] = self.velocity;
        }
    }
}

/// A single unit-mass floating base plus one massless segment per contact.
pub fn floating_base_robot(num_contacts: usize) -> RobotModelDescriptor {
    let mut segments = vec![RobotSegmentModel::new("base", 1.0, Vector3::zeros(), Matrix3::zeros())];
    for c in 0..num_contacts {
        segments.push(RobotSegmentModel::new_massless(&format!("foot_{}", c)));
    }
    RobotModelDescriptor::new(segments, 3)
}

pub fn floating_base_group(num_contacts: usize) -> PlanningGroupModel {
    let group_joints = vec![
        GroupJointModel::new("base_x", 0, None),
        GroupJointModel::new("base_y", 1, None),
        GroupJointModel::new("base_z", 2, None)
    ];
    let contact_points = (0..num_contacts)
        .map(|c| ContactPointModel::new(&format!("foot_{}", c), c + 1, 0))
        .collect();
    PlanningGroupModel::new("whole_body", group_joints, contact_points, true)
}

pub fn single_joint_group(limits: Option<(f64, f64)>) -> PlanningGroupModel {
    PlanningGroupModel::new("arm", vec![GroupJointModel::new("j0", 0, limits)], vec![], false)
}
