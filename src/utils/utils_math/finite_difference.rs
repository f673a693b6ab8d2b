use nalgebra::{DMatrix, DVector, Vector3};
use factorial::Factorial;

pub struct FiniteDifferenceUtils;
impl FiniteDifferenceUtils {
    /// Time stencils should be with respect to the current time (i.e., current time should be 0.0,
    /// a time 1 second ago should be -1.0, etc.)
    pub fn get_fd_coefficients(time_stencils: &Vec<f64>, derivative_order: usize) -> Vec<f64> {
        let n = time_stencils.len();
        assert!(derivative_order < n);

        let mut m = DMatrix::<f64>::zeros(n, n);
        let mut v = DVector::<f64>::zeros(n);

        v[derivative_order] = derivative_order.factorial() as f64;

        for i in 0..n {
            for j in 0..n {
                m[(i,j)] = time_stencils[j].powi(i as i32);
            }
        }

        let m_inv = m.pseudo_inverse(0.00001).expect("error");
        let res = m_inv * v;

        return res.data.as_slice().to_vec();
    }

    /// Builds the banded operator matrix that applies the given derivative-order stencil
    /// to every waypoint of a column of `num_points` samples spaced `discretization` apart.
    /// Rows whose stencil window does not fit inside the column are left at zero, which
    /// corresponds to the zero-derivative assumption at the trajectory boundaries.
    pub fn get_derivative_operator_matrix(num_points: usize, discretization: f64, derivative_order: usize) -> DMatrix<f64> {
        let half_window = (derivative_order + 1) / 2;
        let mut time_stencils = vec![];
        for i in -(half_window as i32)..=(half_window as i32) {
            time_stencils.push(i as f64 * discretization);
        }
        let coefficients = Self::get_fd_coefficients(&time_stencils, derivative_order);

        let mut out_matrix = DMatrix::<f64>::zeros(num_points, num_points);
        for i in half_window..num_points - half_window {
            for (j, c) in coefficients.iter().enumerate() {
                out_matrix[(i, i - half_window + j)] = *c;
            }
        }

        return out_matrix;
    }

    /// Central-difference velocities of a 3-vector time series over the index range `[start, end]`
    /// (inclusive).  Entries outside the range are left untouched; the caller is expected to have
    /// zeroed them (zero-derivative boundary assumption).
    pub fn vector_series_velocities(start: usize, end: usize, discretization: f64, positions: &[Vector3<f64>], velocities: &mut [Vector3<f64>]) {
        assert!(end + 1 < positions.len());
        let inv_2dt = 1.0 / (2.0 * discretization);
        for i in start..=end {
            velocities[i] = (positions[i + 1] - positions[i - 1]) * inv_2dt;
        }
    }

    /// Central-difference velocities and accelerations of a 3-vector time series over `[start, end]`.
    /// Uses the same operator and discretization step as the smoothness cost, which keeps the
    /// smoothness and dynamics costs numerically consistent.
    pub fn vector_series_velocities_and_accelerations(start: usize, end: usize, discretization: f64, positions: &[Vector3<f64>], velocities: &mut [Vector3<f64>], accelerations: &mut [Vector3<f64>]) {
        assert!(end + 1 < positions.len());
        let inv_2dt = 1.0 / (2.0 * discretization);
        let inv_dt_sq = 1.0 / (discretization * discretization);
        for i in start..=end {
            velocities[i] = (positions[i + 1] - positions[i - 1]) * inv_2dt;
            accelerations[i] = (positions[i + 1] - 2.0 * positions[i] + positions[i - 1]) * inv_dt_sq;
        }
    }
}
