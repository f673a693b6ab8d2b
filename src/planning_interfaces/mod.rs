use nalgebra::{DVector, Isometry3, Vector3, Vector4};
use crate::robot_models::ContactPointModel;
use crate::utils::utils_math::Wrench;

/// Forward-kinematics output for a single waypoint: world frames for every
/// kinematic segment plus the world positions and axes of every joint.  Segment
/// indices are aligned with `RobotModelDescriptor::segments`.
#[derive(Clone, Debug)]
pub struct FkWaypointOutput {
    pub segment_frames: Vec<Isometry3<f64>>,
    pub joint_positions: Vec<Vector3<f64>>,
    pub joint_axes: Vec<Vector3<f64>>
}

/// External forward-kinematics solver.  Must be deterministic given identical
/// joint arrays.  `fk_partial` may reuse cached root/world transforms from the
/// preceding `fk_full` call; the evaluation pipeline guarantees a full pass on
/// the first evaluation of a planning attempt.
pub trait ForwardKinematicsSolver {
    fn fk_full(&self, full_state: &DVector<f64>) -> FkWaypointOutput;
    fn fk_partial(&self, full_state: &DVector<f64>) -> FkWaypointOutput;
}

/// External collision/validity predicate against the planning scene.
pub trait StateValidityChecker {
    fn is_state_valid(&self, full_state: &DVector<f64>) -> bool;
    /// Sum of penetration depths over all colliding body pairs at this state.
    /// Non-negative; used directly as the per-waypoint collision cost term.
    fn collision_depth_sum(&self, full_state: &DVector<f64>) -> f64;
}

/// External contact-force solver (an LP/QP over friction cones).  Returns one
/// force vector per contact approximately balancing the reference wrench, subject
/// to a friction-cone constraint per active contact.  Force magnitudes are only
/// meaningful where the corresponding activation is greater than zero.
pub trait ContactForceSolver {
    fn solve(&self, friction_coefficient: f64, contact_positions: &[Vector3<f64>], contact_parent_frames: &[Isometry3<f64>], activations: &[f64], reference_wrench: &Wrench) -> Vec<Vector3<f64>>;
}

/// External contact-violation geometry.  For each waypoint in `[start, end]`,
/// writes a violation vector bounding how far the contact point is from the
/// ground (and how tilted it is) plus the contact point's world velocity.
/// Entries outside the range must be left untouched.
pub trait ContactViolationEvaluator {
    fn violation(&self, contact: &ContactPointModel, start: usize, end: usize, discretization: f64, segment_frames: &[Vec<Isometry3<f64>>], violations_out: &mut [Vector4<f64>], velocities_out: &mut [Vector3<f64>]);
}

/// External gradient-free numerical minimizer over a vector-valued objective.
/// `history_size` bounds the line-search / curvature history; `rel_tolerance` is
/// the relative-objective-change stopping tolerance.  A minimizer that exhausts
/// its budget without meeting tolerance returns its last iterate; that iterate is
/// accepted as the best-effort result.
pub trait NumericalMinimizer {
    fn minimize(&self, objective: &mut dyn FnMut(&[f64]) -> f64, initial: &[f64], history_size: usize, rel_tolerance: f64) -> Vec<f64>;
}
