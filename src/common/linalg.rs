//! Small dense linear algebra used by the learners and the optimizer.
//! Matrices are row-major `Vec<Vec<f64>>`.


/// Solves `a x = b` by Gaussian elimination with partial pivoting.
/// Returns `None` if `a` is (numerically) singular.
pub(crate) fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>)
    -> Option<Vec<f64>>
{
    let n = b.len();
    debug_assert!(a.iter().all(|row| row.len() == n));

    let scale = a.iter()
        .flat_map(|row| row.iter())
        .fold(0f64, |m, x| m.max(x.abs()));
    if n == 0 || scale == 0.0 { return None; }
    let tiny = scale * 1e-13;

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= tiny { return None; }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col+1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 { continue; }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0f64; n];
    for row in (0..n).rev() {
        let tail = (row+1..n)
            .map(|k| a[row][k] * x[k])
            .sum::<f64>();
        x[row] = (b[row] - tail) / a[row][row];
    }
    if x.iter().all(|v| v.is_finite()) { Some(x) } else { None }
}


/// Weighted Gram matrix `Xᵀ W X` and vector `Xᵀ W y`
/// for a design given as columns.
pub(crate) fn weighted_normal_equations(
    columns: &[&[f64]],
    weights: &[f64],
    y: &[f64],
) -> (Vec<Vec<f64>>, Vec<f64>)
{
    let k = columns.len();
    let mut gram = vec![vec![0f64; k]; k];
    let mut rhs = vec![0f64; k];
    for a in 0..k {
        for b in a..k {
            let v = columns[a].iter()
                .zip(columns[b])
                .zip(weights)
                .map(|((x, z), w)| w * x * z)
                .sum::<f64>();
            gram[a][b] = v;
            gram[b][a] = v;
        }
        rhs[a] = columns[a].iter()
            .zip(y)
            .zip(weights)
            .map(|((x, t), w)| w * x * t)
            .sum::<f64>();
    }
    (gram, rhs)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_2x2() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve(a, vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(solve(a, vec![1.0, 2.0]).is_none());
    }
}
