mod common;

use nalgebra::{DMatrix, DVector, Vector3};
use citopt::evaluation_modules::evaluation_manager_module::EvaluationManagerModule;
use citopt::optimization::{IterativeOptimizer, OptimizationScratch, VariableLayout};
use citopt::robot_models::{GroupJointModel, PlanningGroupModel, RobotModelDescriptor, RobotSegmentModel};
use citopt::trajectory_modules::smoothness_cost_module::SmoothnessCostModule;
use citopt::trajectory_modules::trajectory_module::TrajectoryModule;
use citopt::utils::utils_parameters::PlanningParameters;
use common::{single_joint_group, AlwaysValidChecker, ConstantViolationEvaluator, FixedForceSolver, IdentityFkSolver};

#[test]
fn pack_and_unpack_round_trip_the_free_variables() {
    let group_joints = vec![
        GroupJointModel::new("a", 0, None),
        GroupJointModel::new("b", 1, None)
    ];
    let contact_points = vec![citopt::robot_models::ContactPointModel::new("foot", 1, 0)];
    let group = PlanningGroupModel::new("whole_body", group_joints, contact_points, true);
    let mut trajectory = TrajectoryModule::new(5, 1, 0.1, &group, 2).expect("error");

    let positions = DMatrix::from_row_slice(2, 2, &[0.1, 0.2, 0.3, 0.4]);
    let velocities = DMatrix::from_row_slice(2, 2, &[0.5, 0.6, 0.7, 0.8]);
    let contacts = DMatrix::from_vec(3, 1, vec![0.9, 0.8, 0.7]);
    trajectory.write_free_block(&positions, &velocities, &contacts).expect("error");

    let layout = VariableLayout::new(&trajectory);
    assert_eq!(layout.num_variables(), 1 + 2 * (2 * 2 + 1));
    let packed = layout.pack(&trajectory);
    let expected = DVector::from_vec(vec![
        0.9,
        0.1, 0.2, 0.5, 0.6, 0.8,
        0.3, 0.4, 0.7, 0.8, 0.7
    ]);
    assert_eq!(packed, expected);

    let mut scratch = OptimizationScratch::new(&layout, 5);
    layout.unpack(packed.as_slice(), &mut scratch);
    assert_eq!(scratch.positions, positions);
    assert_eq!(scratch.velocities, velocities);
    assert_eq!(scratch.contacts, contacts);

    // writing the unpacked blocks back reproduces the same flat vector
    let mut other = TrajectoryModule::new(5, 1, 0.1, &group, 2).expect("error");
    other.write_free_block(&scratch.positions, &scratch.velocities, &scratch.contacts).expect("error");
    assert_eq!(layout.pack(&other), packed);
}

fn smoothness_only_manager() -> EvaluationManagerModule {
    let robot = RobotModelDescriptor::new(vec![RobotSegmentModel::new_massless("base")], 1);
    let group = single_joint_group(None);
    let mut trajectory = TrajectoryModule::new(5, 1, 1.0, &group, 1).expect("error");
    trajectory.set_point(1, &DVector::from_vec(vec![1.0])).expect("error");
    trajectory.set_point(2, &DVector::from_vec(vec![2.0])).expect("error");

    let mut parameters = PlanningParameters::default();
    parameters.smoothness_cost_velocity = 1.0;
    parameters.smoothness_cost_acceleration = 0.0;

    EvaluationManagerModule::new(
        &robot,
        group,
        trajectory,
        parameters,
        Box::new(IdentityFkSolver { num_segments: 1 }),
        Box::new(AlwaysValidChecker),
        Box::new(FixedForceSolver { force: Vector3::zeros() }),
        Box::new(ConstantViolationEvaluator::new_zero())
    )
}

#[test]
fn optimizer_reduces_smoothness_cost() {
    let mut manager = smoothness_only_manager();

    let group = single_joint_group(None);
    let mut parameters = PlanningParameters::default();
    parameters.smoothness_cost_velocity = 1.0;
    parameters.smoothness_cost_acceleration = 0.0;
    let mut smoothness = SmoothnessCostModule::new(&group, 5, 1.0, &parameters);
    smoothness.normalize_across_joints();
    let initial_cost = smoothness.total_cost(manager.trajectory());
    assert!(initial_cost > 0.0);

    let optimizer = IterativeOptimizer::new_default();
    let result = optimizer.optimize(&mut manager, None).expect("error");

    assert!(result.final_cost < initial_cost);
    assert!(result.feasible);
    assert!(result.num_evaluations > 0);
    assert_eq!(manager.iteration(), 1);
}

#[test]
fn seeded_noise_keeps_optimization_deterministic() {
    let mut manager_a = smoothness_only_manager();
    let mut manager_b = smoothness_only_manager();

    let optimizer = IterativeOptimizer::new_default();
    let result_a = optimizer.optimize(&mut manager_a, Some(42)).expect("error");
    let result_b = optimizer.optimize(&mut manager_b, Some(42)).expect("error");

    assert_eq!(result_a.x_min, result_b.x_min);
    assert_eq!(result_a.final_cost, result_b.final_cost);
}
