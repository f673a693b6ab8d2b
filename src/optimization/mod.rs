use std::sync::Mutex;
use instant::{Duration, Instant};
use nalgebra::{DMatrix, DVector};
use optimization_engine::{constraints, Optimizer, Problem, SolverError};
use optimization_engine::panoc::{PANOCCache, PANOCOptimizer};
use crate::evaluation_modules::evaluation_manager_module::EvaluationManagerModule;
use crate::planning_interfaces::NumericalMinimizer;
use crate::trajectory_modules::trajectory_module::TrajectoryModule;
use crate::utils::utils_errors::PlannerError;
use crate::utils::utils_sampling::SimpleSamplers;

/// The single shared schema for the flat optimization vector.  Both the packing
/// and unpacking sides derive their offsets from this one description, so the
/// two can never disagree about the layout.
///
/// The vector is laid out as the phase-0 contact activations followed by one
/// block per free keyframe: that keyframe's joint positions, its joint
/// velocities, then the activations of the phase it opens.
#[derive(Clone, Debug)]
pub struct VariableLayout {
    num_joints: usize,
    num_contacts: usize,
    num_free_points: usize
}
impl VariableLayout {
    pub fn new(trajectory: &TrajectoryModule) -> Self {
        Self {
            num_joints: trajectory.num_joints(),
            num_contacts: trajectory.num_contacts(),
            num_free_points: trajectory.num_free_points()
        }
    }
    pub fn num_joints(&self) -> usize {
        self.num_joints
    }
    pub fn num_contacts(&self) -> usize {
        self.num_contacts
    }
    pub fn num_free_points(&self) -> usize {
        self.num_free_points
    }
    pub fn num_variables(&self) -> usize {
        self.num_contacts + self.num_free_points * (2 * self.num_joints + self.num_contacts)
    }

    /// Reads the trajectory's current free variables into a flat vector.
    pub fn pack(&self, trajectory: &TrajectoryModule) -> DVector<f64> {
        let mut out = DVector::zeros(self.num_variables());
        let mut idx = 0;
        for c in 0..self.num_contacts {
            out[idx] = trajectory.contact_value(0, c);
            idx += 1;
        }
        for i in 0..self.num_free_points {
            let point = trajectory.free_point_idx(i);
            for j in 0..self.num_joints {
                out[idx] = trajectory.points()[(point, j)];
                idx += 1;
            }
            for j in 0..self.num_joints {
                out[idx] = trajectory.keyframe_velocities()[(i + 1, j)];
                idx += 1;
            }
            for c in 0..self.num_contacts {
                out[idx] = trajectory.contact_value(i + 1, c);
                idx += 1;
            }
        }
        out
    }

    /// Writes a flat vector into the scratch blocks `write_free_block` expects.
    /// Contact activations are stored as absolute values, so the minimizer can
    /// roam an unconstrained vector while activations stay non-negative.
    pub fn unpack(&self, x: &[f64], scratch: &mut OptimizationScratch) {
        let mut idx = 0;
        for c in 0..self.num_contacts {
            scratch.contacts[(0, c)] = x[idx].abs();
            idx += 1;
        }
        for i in 0..self.num_free_points {
            for j in 0..self.num_joints {
                scratch.positions[(i, j)] = x[idx];
                idx += 1;
            }
            for j in 0..self.num_joints {
                scratch.velocities[(i, j)] = x[idx];
                idx += 1;
            }
            for c in 0..self.num_contacts {
                scratch.contacts[(i + 1, c)] = x[idx].abs();
                idx += 1;
            }
        }
    }
}

/// Pre-sized destination blocks for `VariableLayout::unpack` plus the
/// per-waypoint cost vector the evaluation fills.  Allocated once per
/// minimization run and reused across all of its objective evaluations.
#[derive(Clone, Debug)]
pub struct OptimizationScratch {
    pub positions: DMatrix<f64>,
    pub velocities: DMatrix<f64>,
    pub contacts: DMatrix<f64>,
    pub costs: DVector<f64>
}
impl OptimizationScratch {
    pub fn new(layout: &VariableLayout, num_points: usize) -> Self {
        Self {
            positions: DMatrix::zeros(layout.num_free_points(), layout.num_joints()),
            velocities: DMatrix::zeros(layout.num_free_points(), layout.num_joints()),
            contacts: DMatrix::zeros(layout.num_free_points() + 1, layout.num_contacts()),
            costs: DVector::zeros(num_points)
        }
    }
}

#[derive(Clone, Debug)]
pub struct OptimizationResult {
    pub x_min: DVector<f64>,
    pub final_cost: f64,
    pub feasible: bool,
    pub collision_free: bool,
    pub num_evaluations: usize,
    pub solve_time: Duration
}

/// One outer iteration of the planner's local optimization: packs the current
/// trajectory into the flat vector, optionally perturbs it, hands the evaluation
/// pipeline to the numerical minimizer as a black-box objective, and commits the
/// minimizer's result back into the evaluation manager.
pub struct IterativeOptimizer {
    minimizer: Box<dyn NumericalMinimizer>
}
impl IterativeOptimizer {
    pub fn new(minimizer: Box<dyn NumericalMinimizer>) -> Self {
        Self { minimizer }
    }
    pub fn new_default() -> Self {
        Self::new(Box::new(OpEnMinimizer::default()))
    }

    /// Runs one minimization over the manager's trajectory.  When `noise_seed` is
    /// `Some`, zero-mean Gaussian noise with the configured scale is added to the
    /// initial vector; this is how outer iterations past the first escape the
    /// local minimum the previous iteration settled in.
    pub fn optimize(&self, manager: &mut EvaluationManagerModule, noise_seed: Option<u64>) -> Result<OptimizationResult, PlannerError> {
        let start = Instant::now();

        let layout = VariableLayout::new(manager.trajectory());
        let num_points = manager.trajectory().num_points();
        let history_size = manager.parameters().minimizer_history_size;
        let rel_tolerance = manager.parameters().minimizer_rel_tolerance;
        let noise_scale = manager.parameters().noise_scale;

        let mut initial = layout.pack(manager.trajectory());
        if let Some(seed) = noise_seed {
            let means_and_stds: Vec<(f64, f64)> = initial.iter().map(|v| (*v, noise_scale)).collect();
            let perturbed = SimpleSamplers::normal_samples_seeded(&means_and_stds, seed);
            initial = DVector::from_vec(perturbed);
        }

        let mut scratch = OptimizationScratch::new(&layout, num_points);
        let evaluations_before = manager.evaluation_count();

        let mut objective = |x: &[f64]| -> f64 {
            layout.unpack(x, &mut scratch);
            let result = manager.evaluate(&scratch.positions, &scratch.velocities, &scratch.contacts, &mut scratch.costs).expect("error");
            result.total_cost
        };
        let x_min = self.minimizer.minimize(&mut objective, initial.as_slice(), history_size, rel_tolerance);

        // commit the minimizer's iterate so the stored trajectory matches x_min
        layout.unpack(&x_min, &mut scratch);
        let result = manager.evaluate(&scratch.positions, &scratch.velocities, &scratch.contacts, &mut scratch.costs)?;
        let num_evaluations = manager.evaluation_count() - evaluations_before;
        manager.increment_iteration();

        Ok(OptimizationResult {
            x_min: DVector::from_vec(x_min),
            final_cost: result.total_cost,
            feasible: result.feasible,
            collision_free: result.collision_free,
            num_evaluations,
            solve_time: start.elapsed()
        })
    }
}

/// PANOC-based minimizer with forward-difference gradients.  The objective is
/// treated as a black box; a solver error or exhausted iteration budget returns
/// the last iterate as a best-effort result.
pub struct OpEnMinimizer {
    finite_difference_step: f64,
    max_iterations: usize
}
impl OpEnMinimizer {
    pub fn new(finite_difference_step: f64, max_iterations: usize) -> Self {
        Self { finite_difference_step, max_iterations }
    }
}
impl Default for OpEnMinimizer {
    fn default() -> Self {
        Self::new(1.0e-7, 500)
    }
}
impl NumericalMinimizer for OpEnMinimizer {
    fn minimize(&self, objective: &mut dyn FnMut(&[f64]) -> f64, initial: &[f64], history_size: usize, rel_tolerance: f64) -> Vec<f64> {
        let problem_size = initial.len();
        let mut panoc_cache = PANOCCache::new(problem_size, rel_tolerance, history_size);

        let objective_mutex = Mutex::new(objective);
        let step = self.finite_difference_step;

        let df = |u: &[f64], grad: &mut [f64]| -> Result<(), SolverError> {
            let mut objective = objective_mutex.lock().unwrap();
            let f0 = (objective)(u);
            let mut probe = u.to_vec();
            for i in 0..u.len() {
                probe[i] += step;
                grad[i] = ((objective)(&probe) - f0) / step;
                probe[i] = u[i];
            }
            Ok(())
        };
        let f = |u: &[f64], cost: &mut f64| -> Result<(), SolverError> {
            let mut objective = objective_mutex.lock().unwrap();
            *cost = (objective)(u);
            Ok(())
        };

        let bounds = constraints::NoConstraints::new();
        let problem = Problem::new(&bounds, df, f);
        let mut panoc = PANOCOptimizer::new(problem, &mut panoc_cache)
            .with_tolerance(rel_tolerance)
            .with_max_iter(self.max_iterations);

        let mut u = initial.to_vec();
        let _ = panoc.solve(&mut u);

        u
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_counts_variables() {
        let layout = VariableLayout {
            num_joints: 3,
            num_contacts: 2,
            num_free_points: 4
        };
        assert_eq!(layout.num_variables(), 2 + 4 * (2 * 3 + 2));
    }

    #[test]
    fn unpack_takes_absolute_value_of_contact_entries() {
        let layout = VariableLayout {
            num_joints: 1,
            num_contacts: 1,
            num_free_points: 1
        };
        let mut scratch = OptimizationScratch::new(&layout, 5);
        layout.unpack(&[-0.3, 0.5, -0.7, -0.9], &mut scratch);
        assert_eq!(scratch.contacts[(0, 0)], 0.3);
        assert_eq!(scratch.positions[(0, 0)], 0.5);
        assert_eq!(scratch.velocities[(0, 0)], -0.7);
        assert_eq!(scratch.contacts[(1, 0)], 0.9);
    }

    #[test]
    fn open_minimizer_reaches_quadratic_minimum() {
        let minimizer = OpEnMinimizer::default();
        let mut objective = |x: &[f64]| -> f64 {
            (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2)
        };
        let x_min = minimizer.minimize(&mut objective, &[0.0, 0.0], 10, 1.0e-9);
        assert!((x_min[0] - 2.0).abs() < 1.0e-3);
        assert!((x_min[1] + 1.0).abs() < 1.0e-3);
    }
}
