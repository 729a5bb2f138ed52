//! Small dense matrix kernel.
//!
//! Only what the normal-equation solver needs: transpose, multiply and a
//! Gauss-Jordan inverse. Matrices here are tiny (companies ≤ tens, observations
//! ≤ thousands), so everything is a plain row-major `Vec<f64>` rebuilt per call.

use std::fmt;
use std::ops::Index;

use crate::error::RegressionError;

/// Pivots with an absolute value below this are treated as zero during inversion.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Rectangular, row-major matrix of `f64`.
#[derive(Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Build from a row-major slice.
    pub fn from_row_slice(rows: usize, cols: usize, values: &[f64]) -> Result<Self, RegressionError> {
        if values.len() != rows * cols {
            return Err(RegressionError::mismatch(
                "from_row_slice",
                format!("{rows}x{cols}"),
                format!("{} values", values.len()),
            ));
        }
        Ok(Self {
            rows,
            cols,
            data: values.to_vec(),
        })
    }

    /// Build from a list of rows. All rows must have the same length.
    ///
    /// An empty list gives a `0 × 0` matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RegressionError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RegressionError::mismatch(
                    "from_rows",
                    format!("row 0 has {cols} columns"),
                    format!("row {i} has {} columns", row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// `n × 1` column vector.
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Borrow row `i`.
    ///
    /// # Panics
    /// Panics if `i >= nrows()`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// Copy out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `Mᵀ`, where `Mᵀ[j][i] = M[i][j]`.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Matrix product `self · other`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, RegressionError> {
        if self.cols != other.rows {
            return Err(RegressionError::mismatch(
                "multiply",
                self.shape_label(),
                other.shape_label(),
            ));
        }

        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                out.data[i * other.cols + j] = acc;
            }
        }
        Ok(out)
    }

    /// Gauss-Jordan inverse.
    ///
    /// Works on `[M | I]` and pivots on the diagonal in row order without any row
    /// exchange. Returns `Ok(None)` as soon as a pivot falls below
    /// [`PIVOT_TOLERANCE`], so a matrix with a small leading pivot is reported
    /// as singular even if a row swap would have rescued it.
    ///
    /// Errors only if the matrix is not square.
    pub fn inverse(&self) -> Result<Option<Matrix>, RegressionError> {
        if !self.is_square() {
            return Err(RegressionError::mismatch(
                "inverse",
                self.shape_label(),
                "square matrix",
            ));
        }

        let n = self.rows;
        let width = 2 * n;

        // Augmented working buffer [M | I], owned by this call.
        let mut aug = vec![0.0; n * width];
        for i in 0..n {
            aug[i * width..i * width + n].copy_from_slice(self.row(i));
            aug[i * width + n + i] = 1.0;
        }

        for i in 0..n {
            let pivot = aug[i * width + i];
            if pivot.abs() < PIVOT_TOLERANCE {
                return Ok(None);
            }

            for j in 0..width {
                aug[i * width + j] /= pivot;
            }

            for k in 0..n {
                if k == i {
                    continue;
                }
                let factor = aug[k * width + i];
                for j in 0..width {
                    aug[k * width + j] -= factor * aug[i * width + j];
                }
            }
        }

        let mut inv = Matrix::zeros(n, n);
        for i in 0..n {
            inv.data[i * n..(i + 1) * n].copy_from_slice(&aug[i * width + n..(i + 1) * width]);
        }
        Ok(Some(inv))
    }

    /// Largest absolute element-wise difference, or `None` if shapes differ.
    #[cfg(test)]
    pub(crate) fn max_abs_diff(&self, other: &Matrix) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    fn shape_label(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(i < self.rows && j < self.cols, "matrix index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("data", &self.to_rows())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix {
        let values: Vec<f64> = (0..rows * cols).map(|_| rng.gen_range(-10.0..10.0)).collect();
        Matrix::from_row_slice(rows, cols, &values).unwrap()
    }

    /// Random matrix with a dominant diagonal: invertible and well-conditioned.
    fn random_well_conditioned(rng: &mut StdRng, n: usize) -> Matrix {
        let mut rows = random_matrix(rng, n, n).to_rows();
        for (i, row) in rows.iter_mut().enumerate() {
            let off: f64 = row.iter().map(|v| v.abs()).sum();
            row[i] = off + 1.0;
        }
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { op: "from_rows", .. }));
    }

    #[test]
    fn from_rows_empty_is_0x0() {
        let e = Matrix::from_rows(vec![]).unwrap();
        assert_eq!(e.shape(), (0, 0));
        assert_eq!(e.transpose().shape(), (0, 0));
    }

    #[test]
    fn transpose_swaps_indices() {
        let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let t = a.transpose();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn transpose_twice_is_identity_map() {
        let mut rng = StdRng::seed_from_u64(7);
        for (r, c) in [(1, 1), (1, 5), (4, 1), (3, 7), (6, 2)] {
            let a = random_matrix(&mut rng, r, c);
            assert_eq!(a.transpose().transpose(), a);
        }
    }

    #[test]
    fn multiply_known_product() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let c = a.multiply(&b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
    }

    #[test]
    fn multiply_by_identity_keeps_matrix() {
        let mut rng = StdRng::seed_from_u64(11);
        for (n, k) in [(1, 3), (3, 3), (5, 2)] {
            let a = random_matrix(&mut rng, n, k);
            let out = Matrix::identity(n).multiply(&a).unwrap();
            assert_eq!(out, a);
        }
    }

    #[test]
    fn multiply_rejects_incompatible_shapes() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        let err = a.multiply(&b).unwrap_err();
        assert_eq!(err, RegressionError::mismatch("multiply", "2x3", "2x3"));
    }

    #[test]
    fn inverse_of_known_matrix() {
        let a = m(vec![vec![4.0, 7.0], vec![2.0, 6.0]]);
        let inv = a.inverse().unwrap().unwrap();
        let expected = m(vec![vec![0.6, -0.7], vec![-0.2, 0.4]]);
        assert!(inv.max_abs_diff(&expected).unwrap() < 1e-12);

        let prod = a.multiply(&inv).unwrap();
        assert!(prod.max_abs_diff(&Matrix::identity(2)).unwrap() < 1e-12);
    }

    #[test]
    fn inverse_round_trip_on_well_conditioned_matrices() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..=6 {
            let a = random_well_conditioned(&mut rng, n);
            let inv = a.inverse().unwrap().expect("diagonally dominant matrix is invertible");
            let back = inv.inverse().unwrap().expect("inverse is invertible");
            assert!(back.max_abs_diff(&a).unwrap() < 1e-9, "n={n}");
        }
    }

    #[test]
    fn inverse_reports_singular_for_zero_row_or_column() {
        let zero_row = m(vec![vec![1.0, 2.0], vec![0.0, 0.0]]);
        assert_eq!(zero_row.inverse().unwrap(), None);

        let zero_col = m(vec![vec![1.0, 0.0], vec![3.0, 0.0]]);
        assert_eq!(zero_col.inverse().unwrap(), None);
    }

    #[test]
    fn inverse_does_not_reorder_rows() {
        // Invertible, but the leading pivot is zero and no row swap is attempted.
        let a = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(a.inverse().unwrap(), None);
    }

    #[test]
    fn inverse_rejects_non_square() {
        let err = Matrix::zeros(2, 3).inverse().unwrap_err();
        assert!(matches!(err, RegressionError::DimensionMismatch { op: "inverse", .. }));
    }

    #[test]
    fn inverse_of_empty_matrix_is_empty() {
        let inv = Matrix::zeros(0, 0).inverse().unwrap().unwrap();
        assert_eq!(inv.shape(), (0, 0));
    }

    #[test]
    fn get_is_bounds_checked() {
        let a = m(vec![vec![1.0, 2.0]]);
        assert_eq!(a.get(0, 1), Some(2.0));
        assert_eq!(a.get(1, 0), None);
        assert_eq!(a[(0, 0)], 1.0);
    }
}
