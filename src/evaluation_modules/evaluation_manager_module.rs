use nalgebra::{DMatrix, DVector, Isometry3, Vector3};
use crate::evaluation_modules::cost_accumulator_module::TrajectoryCostAccumulatorModule;
use crate::evaluation_modules::dynamics_evaluator_module::DynamicsEvaluatorModule;
use crate::evaluation_modules::stability_evaluator_module::StabilityEvaluatorModule;
use crate::planning_interfaces::{ContactForceSolver, ContactViolationEvaluator, ForwardKinematicsSolver, StateValidityChecker};
use crate::robot_models::{PlanningGroupModel, RobotModelDescriptor};
use crate::trajectory_modules::smoothness_cost_module::SmoothnessCostModule;
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_console::{planner_print, PrintColor, PrintMode};
use crate::utils::utils_errors::PlannerError;
use crate::utils::utils_parameters::PlanningParameters;

/// Outcome flags of one evaluation.  An infeasible or colliding state is not an
/// error: the cost is still computed and returned, and the optimizer is simply
/// steered away by a high but finite cost.
#[derive(Clone, Debug)]
pub struct EvaluationResult {
    pub total_cost: f64,
    pub feasible: bool,
    pub collision_free: bool
}

/// Post-aggregation diagnostic hook.  Invoked by the evaluation manager every
/// `diagnostic_cadence` evaluations, after the cost vector has been produced; it
/// must not block the pipeline or alter the returned cost.
pub trait EvaluationObserver {
    fn on_evaluation(&self, evaluation_count: usize, iteration: usize, accumulator: &TrajectoryCostAccumulatorModule, trajectory: &TrajectoryModule);
}

/// Default observer: prints the cost-term breakdown and the current contact
/// activation values.
pub struct ConsoleDiagnosticsObserver;
impl EvaluationObserver for ConsoleDiagnosticsObserver {
    fn on_evaluation(&self, evaluation_count: usize, iteration: usize, accumulator: &TrajectoryCostAccumulatorModule, trajectory: &TrajectoryModule) {
        planner_print(&format!("evaluation {}", evaluation_count), PrintMode::Println, PrintColor::Blue, true);
        accumulator.print(iteration);
        if trajectory.num_contacts() > 0 {
            planner_print("contact values:", PrintMode::Println, PrintColor::None, false);
            for phase in 0..=trajectory.num_contact_phases() {
                let mut line = format!("  {} : ", phase);
                for contact in 0..trajectory.num_contacts() {
                    line += &format!("{:.4} ", trajectory.contact_value(phase, contact));
                }
                planner_print(&line, PrintMode::Println, PrintColor::None, false);
            }
        }
    }
}

/// The orchestrator of the per-evaluation pipeline:
///
/// `WRITE_VARIABLES -> PROJECT_LIMITS -> SYNC_FULL -> FORWARD_KINEMATICS ->
///  VALIDITY_CHECK -> COST_AGGREGATION -> RETURN`
///
/// One `EvaluationManagerModule` is created per planning attempt and exclusively
/// owns the trajectory store and every per-waypoint cache for the attempt's
/// lifetime.  Evaluations are strictly sequential; the caches are not safe for
/// concurrent mutation.
pub struct EvaluationManagerModule {
    trajectory: TrajectoryModule,
    planning_group: PlanningGroupModel,
    parameters: PlanningParameters,
    smoothness: SmoothnessCostModule,
    dynamics: DynamicsEvaluatorModule,
    stability: StabilityEvaluatorModule,
    accumulator: TrajectoryCostAccumulatorModule,
    fk_solver: Box<dyn ForwardKinematicsSolver>,
    validity_checker: Box<dyn StateValidityChecker>,
    force_solver: Box<dyn ContactForceSolver>,
    violation_evaluator: Box<dyn ContactViolationEvaluator>,
    observer: Option<Box<dyn EvaluationObserver>>,
    segment_frames: Vec<Vec<Isometry3<f64>>>,
    joint_positions: Vec<Vec<Vector3<f64>>>,
    joint_axes: Vec<Vec<Vector3<f64>>>,
    state_validities: Vec<bool>,
    state_collision_costs: DVector<f64>,
    iteration: usize,
    evaluation_count: usize
}
impl EvaluationManagerModule {
    pub fn new(robot_model: &RobotModelDescriptor,
               planning_group: PlanningGroupModel,
               trajectory: TrajectoryModule,
               parameters: PlanningParameters,
               fk_solver: Box<dyn ForwardKinematicsSolver>,
               validity_checker: Box<dyn StateValidityChecker>,
               force_solver: Box<dyn ContactForceSolver>,
               violation_evaluator: Box<dyn ContactViolationEvaluator>) -> Self {
        let num_points = trajectory.num_points();
        let num_contacts = planning_group.num_contacts();
        let num_segments = robot_model.segments().len();

        let mut smoothness = SmoothnessCostModule::new(&planning_group, num_points, trajectory.discretization(), &parameters);
        smoothness.normalize_across_joints();

        let dynamics = DynamicsEvaluatorModule::new(robot_model, num_contacts, num_points, trajectory.discretization());
        let stability = StabilityEvaluatorModule::new(num_points, num_contacts);
        let accumulator = TrajectoryCostAccumulatorModule::new(num_points, &parameters);

        Self {
            trajectory,
            planning_group,
            parameters,
            smoothness,
            dynamics,
            stability,
            accumulator,
            fk_solver,
            validity_checker,
            force_solver,
            violation_evaluator,
            observer: None,
            segment_frames: vec![vec![Isometry3::identity(); num_segments]; num_points],
            joint_positions: vec![vec![Vector3::zeros(); 0]; num_points],
            joint_axes: vec![vec![Vector3::zeros(); 0]; num_points],
            state_validities: vec![true; num_points],
            state_collision_costs: DVector::zeros(num_points),
            iteration: 0,
            evaluation_count: 0
        }
    }
    pub fn set_observer(&mut self, observer: Box<dyn EvaluationObserver>) {
        self.observer = Some(observer);
    }
    pub fn trajectory(&self) -> &TrajectoryModule {
        &self.trajectory
    }
    pub fn trajectory_mut(&mut self) -> &mut TrajectoryModule {
        &mut self.trajectory
    }
    pub fn planning_group(&self) -> &PlanningGroupModel {
        &self.planning_group
    }
    pub fn parameters(&self) -> &PlanningParameters {
        &self.parameters
    }
    pub fn accumulator(&self) -> &TrajectoryCostAccumulatorModule {
        &self.accumulator
    }
    pub fn iteration(&self) -> usize {
        self.iteration
    }
    pub fn increment_iteration(&mut self) {
        self.iteration += 1;
    }
    pub fn evaluation_count(&self) -> usize {
        self.evaluation_count
    }
    /// Segment frames from the most recent forward-kinematics pass, indexed by waypoint.
    pub fn segment_frames(&self) -> &Vec<Vec<Isometry3<f64>>> {
        &self.segment_frames
    }
    pub fn joint_positions(&self, point: usize) -> &Vec<Vector3<f64>> {
        &self.joint_positions[point]
    }
    pub fn joint_axes(&self, point: usize) -> &Vec<Vector3<f64>> {
        &self.joint_axes[point]
    }

    /// Runs the full evaluation pipeline for one setting of the free variables and
    /// fills `costs` with the per-waypoint cost vector.  Block shape mismatches and
    /// a wrong-length cost vector are programming errors and abort the call; an
    /// infeasible trajectory is reported through the result flags instead.
    pub fn evaluate(&mut self, positions: &DMatrix<f64>, velocities: &DMatrix<f64>, contact_activations: &DMatrix<f64>, costs: &mut DVector<f64>) -> Result<EvaluationResult, PlannerError> {
        let num_points = self.trajectory.num_points();
        if costs.len() != num_points {
            return Err(PlannerError::new_precondition_violation_error("evaluate", &format!("cost vector of length {} was given where {} was expected.", costs.len(), num_points), file!(), line!()));
        }

        self.trajectory.write_free_block(positions, velocities, contact_activations)?;
        self.trajectory.project_joint_limits(&self.planning_group);
        self.trajectory.sync_full_from_group();

        self.perform_forward_kinematics();
        let trajectory_valid = self.compute_trajectory_validity();
        self.compute_collision_costs();

        self.dynamics.compute_wrench_sum(self.iteration, &self.trajectory, &self.planning_group, &self.segment_frames, self.violation_evaluator.as_ref());
        self.stability.compute_stability_costs(&self.trajectory, &self.planning_group, &self.segment_frames, &self.dynamics, self.force_solver.as_ref(), &self.parameters);

        self.accumulator.compute(&self.trajectory, &self.smoothness, &self.stability, &self.state_collision_costs);

        for point in 0..num_points {
            costs[point] = self.accumulator.waypoint_cost(point);
        }

        let feasible = self.accumulator.is_feasible();
        let collision_free = trajectory_valid && feasible;

        self.evaluation_count += 1;
        if let Some(observer) = &self.observer {
            if self.evaluation_count % self.parameters.diagnostic_cadence == 0 {
                observer.on_evaluation(self.evaluation_count, self.iteration, &self.accumulator, &self.trajectory);
            }
        }

        Ok(EvaluationResult {
            total_cost: self.accumulator.trajectory_cost(),
            feasible,
            collision_free
        })
    }

    /// Recomputes the cost aggregation for the trajectory as currently stored,
    /// without touching the free variables.  Used for reporting after a
    /// minimization run converges.
    pub fn reevaluate_current(&mut self) -> EvaluationResult {
        self.accumulator.compute(&self.trajectory, &self.smoothness, &self.stability, &self.state_collision_costs);
        EvaluationResult {
            total_cost: self.accumulator.trajectory_cost(),
            feasible: self.accumulator.is_feasible(),
            collision_free: self.state_validities.iter().all(|v| *v) && self.accumulator.is_feasible()
        }
    }

    /// On iteration 0, computes full forward kinematics for every waypoint
    /// (boundary included, with the fixed goal waypoint solved first); on later
    /// iterations only the interior waypoints are recomputed and the boundary
    /// results are intentionally reused.
    fn perform_forward_kinematics(&mut self) {
        let num_points = self.trajectory.num_points();

        if self.iteration == 0 {
            let goal_state = self.trajectory.full_state_at_point(num_points - 1);
            let out = self.fk_solver.fk_full(&goal_state);
            self.store_fk_output(num_points - 1, out);

            for point in 0..num_points {
                let state = self.trajectory.full_state_at_point(point);
                let out = if point == 0 { self.fk_solver.fk_full(&state) } else { self.fk_solver.fk_partial(&state) };
                self.store_fk_output(point, out);
            }
        } else {
            for point in 1..=num_points - 2 {
                let state = self.trajectory.full_state_at_point(point);
                let out = self.fk_solver.fk_partial(&state);
                self.store_fk_output(point, out);
            }
        }
    }
    fn store_fk_output(&mut self, point: usize, out: crate::planning_interfaces::FkWaypointOutput) {
        self.segment_frames[point] = out.segment_frames;
        self.joint_positions[point] = out.joint_positions;
        self.joint_axes[point] = out.joint_axes;
    }

    /// Overall trajectory validity is the conjunction of the external validity
    /// predicate across all interior waypoints.
    fn compute_trajectory_validity(&mut self) -> bool {
        let num_points = self.trajectory.num_points();
        let mut trajectory_valid = true;
        for point in 1..=num_points - 2 {
            let state = self.trajectory.full_state_at_point(point);
            let valid = self.validity_checker.is_state_valid(&state);
            self.state_validities[point] = valid;
            if !valid { trajectory_valid = false; }
        }
        trajectory_valid
    }

    fn compute_collision_costs(&mut self) {
        let num_points = self.trajectory.num_points();
        for point in 0..num_points {
            let state = self.trajectory.full_state_at_point(point);
            self.state_collision_costs[point] = self.validity_checker.collision_depth_sum(&state);
        }
    }
}
