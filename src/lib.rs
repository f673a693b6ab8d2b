
//! Citopt is the trajectory evaluation and local optimization core of an
//! optimization-based robot motion planner.  Given a discretized trajectory
//! (joint positions, joint velocities, and contact activation variables over time),
//! it computes a scalar cost and a per-waypoint cost vector combining smoothness,
//! physical-consistency, and collision penalties, and drives a gradient-free
//! numerical optimizer to minimize that cost over the trajectory's free variables.
//! Forward kinematics, collision checking, the contact-force solve, and the
//! underlying numerical minimizer are consumed through trait interfaces in
//! `planning_interfaces`, so the core stays independent of any particular robot
//! model backend or solver library.

pub mod evaluation_modules;
pub mod optimization;
pub mod planning_interfaces;
pub mod robot_models;
pub mod trajectory_modules;
pub mod utils;
