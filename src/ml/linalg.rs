//! Small dense linear-algebra helpers over row-major `Vec<Vec<f64>>`

use crate::error::{Error, Result};

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Column means of a row-major matrix
pub(crate) fn column_means(rows: &[Vec<f64>], width: usize) -> Vec<f64> {
    let n = rows.len().max(1) as f64;
    let mut means = vec![0.0; width];
    for row in rows {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v;
        }
    }
    means.iter_mut().for_each(|m| *m /= n);
    means
}

/// Subtract column means from every row and the target mean from `y`
pub(crate) fn center(rows: &[Vec<f64>], y: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>, Vec<f64>, f64) {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    let x_mean = column_means(rows, width);
    let y_mean = y.iter().sum::<f64>() / y.len().max(1) as f64;

    let xc = rows
        .iter()
        .map(|row| row.iter().zip(&x_mean).map(|(v, m)| v - m).collect())
        .collect();
    let yc = y.iter().map(|v| v - y_mean).collect();

    (xc, yc, x_mean, y_mean)
}

/// `XᵀX + ridge·I` and `Xᵀy` for row-major `X`
pub(crate) fn normal_equations(rows: &[Vec<f64>], y: &[f64], ridge: f64) -> (Vec<Vec<f64>>, Vec<f64>) {
    let p = rows.first().map(Vec::len).unwrap_or(0);
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for (row, &target) in rows.iter().zip(y) {
        for i in 0..p {
            xty[i] += row[i] * target;
            for j in i..p {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 0..p {
        for j in 0..i {
            xtx[i][j] = xtx[j][i];
        }
        xtx[i][i] += ridge;
    }

    (xtx, xty)
}

/// Solve `A x = b` by Gauss-Jordan elimination with partial pivoting
pub(crate) fn solve(a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>> {
    let n = a.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if a.iter().any(|row| row.len() != n) || b.len() != n {
        return Err(Error::DimensionMismatch(
            "linear system must be square".to_string(),
        ));
    }

    let mut augmented: Vec<Vec<f64>> = a
        .iter()
        .zip(b)
        .map(|(row, &rhs)| {
            let mut r = row.clone();
            r.push(rhs);
            r
        })
        .collect();

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
        .max(1.0);

    for i in 0..n {
        let pivot_row = (i..n)
            .max_by(|&r1, &r2| {
                augmented[r1][i]
                    .abs()
                    .partial_cmp(&augmented[r2][i].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(i);

        if augmented[pivot_row][i].abs() < 1e-12 * scale {
            return Err(Error::ComputationError(
                "matrix is singular".to_string(),
            ));
        }
        augmented.swap(i, pivot_row);

        let pivot = augmented[i][i];
        for v in augmented[i].iter_mut() {
            *v /= pivot;
        }

        let pivot_values = augmented[i].clone();
        for (r, row) in augmented.iter_mut().enumerate() {
            let factor = row[i];
            if r != i && factor != 0.0 {
                for c in i..=n {
                    row[c] -= factor * pivot_values[c];
                }
            }
        }
    }

    Ok(augmented.into_iter().map(|row| row[n]).collect())
}
