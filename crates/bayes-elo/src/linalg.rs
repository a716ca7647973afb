//! Dense linear solves for the small systems Newton's method produces.

/// Pivots smaller than this, relative to the largest entry, mark the
/// matrix as singular.
const PIVOT_EPSILON: f64 = 1e-12;

/// Solves `matrix * x = rhs` by Gaussian elimination with partial pivoting.
///
/// Returns `None` if the matrix is singular.
pub(crate) fn solve(matrix: &[Vec<f64>], rhs: &[f64]) -> Option<Vec<f64>> {
    let columns = vec![rhs.to_vec()];
    solve_many(matrix, columns).map(|mut solutions| solutions.remove(0))
}

/// Inverts a square matrix. Returns `None` if it is singular.
pub(crate) fn invert(matrix: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let identity = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    // Columns of the inverse come back as rows; transpose them.
    let columns = solve_many(matrix, identity)?;
    Some(
        (0..n)
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect(),
    )
}

fn solve_many(matrix: &[Vec<f64>], mut rhs: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let n = matrix.len();
    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let scale = a
        .iter()
        .flatten()
        .fold(0.0_f64, |max, v| max.max(v.abs()));
    if n == 0 || scale == 0.0 {
        return None;
    }

    for col in 0..n {
        let pivot_row = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() <= PIVOT_EPSILON * scale {
            return None;
        }
        a.swap(col, pivot_row);
        for b in rhs.iter_mut() {
            b.swap(col, pivot_row);
        }

        let pivot = a[col].clone();
        for row in col + 1..n {
            let factor = a[row][col] / pivot[col];
            if factor == 0.0 {
                continue;
            }
            for (k, value) in pivot.iter().enumerate().skip(col) {
                a[row][k] -= factor * value;
            }
            for b in rhs.iter_mut() {
                let eliminated = b[col];
                b[row] -= factor * eliminated;
            }
        }
    }

    for b in rhs.iter_mut() {
        for row in (0..n).rev() {
            let tail: f64 = (row + 1..n).map(|k| a[row][k] * b[k]).sum();
            b[row] = (b[row] - tail) / a[row][row];
        }
    }
    Some(rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_two_by_two() {
        let m = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let x = solve(&m, &[3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }

    #[test]
    fn solve_needs_pivoting() {
        let m = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let x = solve(&m, &[2.0, 3.0]).unwrap();
        assert_eq!(x, vec![3.0, 2.0]);
    }

    #[test]
    fn singular_matrix() {
        let m = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        assert!(solve(&m, &[1.0, 1.0]).is_none());
        assert!(invert(&m).is_none());
        assert!(invert(&[]).is_none());
    }

    #[test]
    fn invert_round_trip() {
        let m = vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ];
        let inv = invert(&m).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let product: f64 = (0..3).map(|k| m[i][k] * inv[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((product - expected).abs() < 1e-12);
            }
        }
    }
}
