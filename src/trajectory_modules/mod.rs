pub mod smoothness_cost_module;
pub mod trajectory_module;
