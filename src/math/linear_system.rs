use ndarray::{s, Array1, Array2, Zip};

use crate::error::{Error, Result};

/// Pivots smaller than this in magnitude mark the system as singular.
pub const SINGULAR_PIVOT: f64 = 1e-12;

/// Solves the dense square system `a * x = b` by Gaussian elimination with
/// partial pivoting.
///
/// Both inputs are taken by value and used as scratch space.
///
/// # Errors
///
/// Returns [`Error::Numerical`] when a pivot falls below [`SINGULAR_PIVOT`],
/// and [`Error::InvalidMdp`] when the dimensions of `a` and `b` disagree.
///
/// # Examples
///
/// ```
/// use mdp_planning::math::solve;
/// use ndarray::{array, Array1};
///
/// let a = array![[2.0, 1.0], [1.0, 3.0]];
/// let b: Array1<f64> = array![3.0, 5.0];
/// let x = solve(a, b).unwrap();
///
/// assert!((x[0] - 0.8).abs() < 1e-12);
/// assert!((x[1] - 1.4).abs() < 1e-12);
/// ```
pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return Err(Error::InvalidMdp(format!(
            "expected a {n}x{n} system matrix, got {}x{}",
            a.nrows(),
            a.ncols()
        )));
    }

    for i in 0..n {
        // Find pivot
        let mut max_idx = i;
        let mut max_val = a[[i, i]].abs();
        for j in (i + 1)..n {
            let val = a[[j, i]].abs();
            if val > max_val {
                max_idx = j;
                max_val = val;
            }
        }

        if !(max_val >= SINGULAR_PIVOT) {
            return Err(Error::Numerical {
                pivot: max_val,
                row: i,
            });
        }

        if max_idx != i {
            for k in i..n {
                a.swap([i, k], [max_idx, k]);
            }
            b.swap(i, max_idx);
        }

        let pivot_row = a.slice(s![i, i..]).to_owned();
        let pivot_rhs = b[i];
        let pivot = pivot_row[0];
        for j in (i + 1)..n {
            let factor = a[[j, i]] / pivot;
            if factor == 0.0 {
                continue;
            }
            Zip::from(a.slice_mut(s![j, i..]))
                .and(&pivot_row)
                .for_each(|val, &p| *val -= factor * p);
            b[j] -= factor * pivot_rhs;
        }
    }

    // Back substitution
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail = a.slice(s![i, (i + 1)..]).dot(&x.slice(s![(i + 1)..]));
        x[i] = (b[i] - tail) / a[[i, i]];
    }

    Ok(x)
}
