/// A common error type returned by functions throughout the crate.
///
/// Precondition violations (e.g., a parameter block handed to the evaluator with
/// the wrong shape) are programming errors; functions that detect them return a
/// `PreconditionViolationError` immediately and abort the evaluation call.
/// Infeasible trajectory states are NOT errors; they are reported through the
/// `feasible` and `collision_free` flags on evaluation results while the (finite)
/// cost is still computed and returned.
#[derive(Clone, Debug)]
pub enum PlannerError {
    GenericError(String),
    IdxOutOfBoundError(String),
    PreconditionViolationError(String)
}
impl PlannerError {
    pub fn new_generic_error_str(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} -- File: {}, Line: {}", s, file, line);
        return Self::GenericError(s);
    }
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s);
    }
    pub fn new_precondition_violation_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Precondition violation in function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::PreconditionViolationError(s);
    }
    pub fn new_block_shape_error(function_name: &str, given_shape: (usize, usize), expected_shape: (usize, usize), file: &str, line: u32) -> Self {
        let s = format!("Block of shape {:?} was given where shape {:?} was expected.", given_shape, expected_shape);
        return Self::new_precondition_violation_error(function_name, &s, file, line);
    }
}
