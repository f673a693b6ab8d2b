pub mod cost_accumulator_module;
pub mod dynamics_evaluator_module;
pub mod evaluation_manager_module;
pub mod stability_evaluator_module;
