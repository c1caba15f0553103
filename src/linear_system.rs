//! Dense linear-system solver
//!
//! Gaussian elimination with partial pivoting followed by back substitution.
//! Single pass, no iterative refinement: the normal-equation systems built by
//! the engine are small (4×4) and well conditioned.

use crate::error::{EstimationError, Result};
use tracing::trace;

/// Pivots at or below this magnitude mark the matrix as singular
pub const SINGULAR_EPSILON: f64 = 1e-10;

/// Solve `A·x = b` without touching the caller's matrix or vector
///
/// # Errors
/// `SingularMatrix` when a pivot is at or below [`SINGULAR_EPSILON`] after
/// row exchange, `InvalidArgument` when `A` is not square or `b` does not
/// match its size.
///
/// # Example
/// ```
/// use probe_estimator::linear_system::solve;
///
/// let a = vec![vec![0.0, 1.0, 1.0], vec![2.0, 4.0, -2.0], vec![0.0, 3.0, 15.0]];
/// let x = solve(&a, &[4.0, 2.0, 36.0]).unwrap();
/// assert!((x[0] + 1.0).abs() < 1e-12);
/// ```
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    solve_in_place(&mut a, &mut b)
}

/// Solve `A·x = b`, leaving `A` upper-triangular and `b` reduced
///
/// Rows of `A` and entries of `b` are exchanged and rewritten in place.
pub fn solve_in_place(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(EstimationError::InvalidArgument(format!(
            "expected a {n}x{n} matrix for a right-hand side of length {n}"
        )));
    }

    for pivot in 0..n {
        let max = (pivot + 1..n).fold(pivot, |max, i| {
            if a[i][pivot].abs() > a[max][pivot].abs() {
                i
            } else {
                max
            }
        });
        a.swap(pivot, max);
        b.swap(pivot, max);

        if a[pivot][pivot].abs() <= SINGULAR_EPSILON {
            return Err(EstimationError::SingularMatrix { pivot });
        }

        for i in pivot + 1..n {
            let alpha = a[i][pivot] / a[pivot][pivot];
            b[i] -= alpha * b[pivot];
            for j in pivot..n {
                a[i][j] -= alpha * a[pivot][j];
            }
        }
        trace!(pivot, swapped_with = max, "eliminated column");
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| a[i][j] * x[j]).sum();
        x[i] = (b[i] - sum) / a[i][i];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!(
                (a - e).abs() <= tolerance,
                "x[{i}] = {a}, expected {e} (tolerance {tolerance})"
            );
        }
    }

    #[test]
    fn test_zero_leading_pivot_requires_row_exchange() {
        let a = vec![
            vec![0.0, 1.0, 1.0],
            vec![2.0, 4.0, -2.0],
            vec![0.0, 3.0, 15.0],
        ];
        let x = solve(&a, &[4.0, 2.0, 36.0]).unwrap();
        assert_close(&x, &[-1.0, 2.0, 2.0], 0.1);
    }

    #[test]
    fn test_positive_coupling_variant() {
        let a = vec![
            vec![0.0, 1.0, 1.0],
            vec![2.0, 4.0, 2.0],
            vec![0.0, 3.0, 15.0],
        ];
        let x = solve(&a, &[4.0, 2.0, 36.0]).unwrap();
        assert_close(&x, &[-5.0, 2.0, 2.0], 0.1);
    }

    #[test]
    fn test_normal_equations_fixture_one() {
        let a = vec![
            vec![6.0, 1670.0, 355.0, 149.0],
            vec![1670.0, 641720.0, 114071.0, 35495.0],
            vec![355.0, 114071.0, 46343.0, 20819.0],
            vec![149.0, 35495.0, 20819.0, 10557.0],
        ];
        let b = [138.1, 49225.1, 11202.0, 4179.4];
        let x = solve(&a, &b).unwrap();
        assert_close(
            &x,
            &[
                0.566_457_469_600_721,
                0.065_329_254_694_236_6,
                0.008_718_736_194_577_3,
                0.151_048_647_610_367,
            ],
            1e-9,
        );
    }

    #[test]
    fn test_normal_equations_fixture_two() {
        let a = vec![
            vec![6.0, 4863.0, 8761.0, 654.0],
            vec![4863.0, 4521899.0, 8519938.0, 620707.0],
            vec![8761.0, 8519938.0, 21022091.0, 905925.0],
            vec![654.0, 620707.0, 905925.0, 137902.0],
        ];
        let b = [714.0, 667832.0, 1265493.0, 100583.0];
        let x = solve(&a, &b).unwrap();
        assert_close(
            &x,
            &[
                6.701_336_536_387_54,
                0.078_366_036_733_867_7,
                0.015_041_331_199_344_8,
                0.246_056_332_580_147,
            ],
            1e-9,
        );
    }

    #[test]
    fn test_solve_leaves_inputs_untouched() {
        let a = vec![vec![0.0, 2.0], vec![3.0, 1.0]];
        let b = vec![4.0, 5.0];
        let _ = solve(&a, &b).unwrap();
        assert_eq!(a, vec![vec![0.0, 2.0], vec![3.0, 1.0]]);
        assert_eq!(b, vec![4.0, 5.0]);
    }

    #[test]
    fn test_in_place_leaves_upper_triangular() {
        let mut a = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let mut b = vec![5.0, 6.0];
        let x = solve_in_place(&mut a, &mut b).unwrap();
        assert!(a[1][0].abs() < 1e-15);
        assert_close(&x, &[-4.0, 4.5], 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let err = solve(&a, &[3.0, 6.0]).unwrap_err();
        assert!(matches!(err, EstimationError::SingularMatrix { pivot: 1 }));
    }

    #[test]
    fn test_near_zero_pivot_is_singular() {
        let a = vec![vec![1e-11, 0.0], vec![0.0, 1e-12]];
        assert!(matches!(
            solve(&a, &[1.0, 1.0]),
            Err(EstimationError::SingularMatrix { pivot: 0 })
        ));
    }

    #[test]
    fn test_non_square_rejected() {
        let a = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            solve(&a, &[1.0, 2.0]),
            Err(EstimationError::InvalidArgument(_))
        ));
    }
}
