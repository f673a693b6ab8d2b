use nalgebra::{Isometry3, Matrix3, Vector3};
use serde::{Serialize, Deserialize};

/// One rigid segment of the robot model, index-aligned with the segment frames
/// returned by the external forward-kinematics solver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSegmentModel {
    name: String,
    mass: f64,
    local_com: Vector3<f64>,
    rotational_inertia: Matrix3<f64>
}
impl RobotSegmentModel {
    pub fn new(name: &str, mass: f64, local_com: Vector3<f64>, rotational_inertia: Matrix3<f64>) -> Self {
        Self { name: name.to_string(), mass, local_com, rotational_inertia }
    }
    pub fn new_massless(name: &str) -> Self {
        Self::new(name, 0.0, Vector3::zeros(), Matrix3::zeros())
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn mass(&self) -> f64 {
        self.mass
    }
    pub fn local_com(&self) -> &Vector3<f64> {
        &self.local_com
    }
    pub fn rotational_inertia(&self) -> &Matrix3<f64> {
        &self.rotational_inertia
    }
}

/// The kinematic structure the core needs to know about the robot: the list of
/// rigid segments (for mass, center-of-mass, and inertia bookkeeping) and the size
/// of the full joint state consumed by the forward-kinematics solver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotModelDescriptor {
    segments: Vec<RobotSegmentModel>,
    num_full_joints: usize
}
impl RobotModelDescriptor {
    pub fn new(segments: Vec<RobotSegmentModel>, num_full_joints: usize) -> Self {
        Self { segments, num_full_joints }
    }
    pub fn segments(&self) -> &Vec<RobotSegmentModel> {
        &self.segments
    }
    pub fn num_full_joints(&self) -> usize {
        self.num_full_joints
    }
}

/// One joint of the active planning group.  `full_state_idx` maps the joint's
/// column in the group trajectory to its column in the full trajectory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupJointModel {
    joint_name: String,
    full_state_idx: usize,
    limits: Option<(f64, f64)>
}
impl GroupJointModel {
    pub fn new(joint_name: &str, full_state_idx: usize, limits: Option<(f64, f64)>) -> Self {
        Self { joint_name: joint_name.to_string(), full_state_idx, limits }
    }
    pub fn joint_name(&self) -> &str {
        &self.joint_name
    }
    pub fn full_state_idx(&self) -> usize {
        self.full_state_idx
    }
    pub fn limits(&self) -> Option<(f64, f64)> {
        self.limits
    }
}

/// A named link attachment that can make and break contact with the ground.
/// Stateless apart from identity; queried every evaluation for its world position
/// and frame at a given waypoint using the current forward-kinematics output.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContactPointModel {
    link_name: String,
    segment_idx: usize,
    parent_segment_idx: usize
}
impl ContactPointModel {
    pub fn new(link_name: &str, segment_idx: usize, parent_segment_idx: usize) -> Self {
        Self { link_name: link_name.to_string(), segment_idx, parent_segment_idx }
    }
    pub fn link_name(&self) -> &str {
        &self.link_name
    }
    pub fn segment_idx(&self) -> usize {
        self.segment_idx
    }
    pub fn parent_segment_idx(&self) -> usize {
        self.parent_segment_idx
    }
    /// World position of the contact point at the given waypoint.
    pub fn position(&self, point: usize, segment_frames: &[Vec<Isometry3<f64>>]) -> Vector3<f64> {
        segment_frames[point][self.segment_idx].translation.vector
    }
    /// World frame of the contact point at the given waypoint.
    pub fn frame(&self, point: usize, segment_frames: &[Vec<Isometry3<f64>>]) -> Isometry3<f64> {
        segment_frames[point][self.segment_idx]
    }
    /// World frame of the contact point's parent segment, used as the force
    /// application reference by the contact-force solver.
    pub fn parent_frame(&self, point: usize, segment_frames: &[Vec<Isometry3<f64>>]) -> Isometry3<f64> {
        segment_frames[point][self.parent_segment_idx]
    }
}

/// The active planning group: the joints being optimized, the contact points the
/// group can exploit, and whether the group takes part in whole-body dynamics.
///
/// `participates_in_dynamics` is a capability flag set at configuration time.
/// Groups with the flag unset (e.g., a single arm moving while the robot stands
/// still) skip the dynamics and stability cost pipelines entirely and contribute
/// zero for those terms.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanningGroupModel {
    name: String,
    group_joints: Vec<GroupJointModel>,
    contact_points: Vec<ContactPointModel>,
    participates_in_dynamics: bool
}
impl PlanningGroupModel {
    pub fn new(name: &str, group_joints: Vec<GroupJointModel>, contact_points: Vec<ContactPointModel>, participates_in_dynamics: bool) -> Self {
        Self { name: name.to_string(), group_joints, contact_points, participates_in_dynamics }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn group_joints(&self) -> &Vec<GroupJointModel> {
        &self.group_joints
    }
    pub fn num_joints(&self) -> usize {
        self.group_joints.len()
    }
    pub fn contact_points(&self) -> &Vec<ContactPointModel> {
        &self.contact_points
    }
    pub fn num_contacts(&self) -> usize {
        self.contact_points.len()
    }
    pub fn participates_in_dynamics(&self) -> bool {
        self.participates_in_dynamics
    }
    pub fn group_to_full_joint_idxs(&self) -> Vec<usize> {
        self.group_joints.iter().map(|j| j.full_state_idx()).collect()
    }
}
