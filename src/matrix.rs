//! Dense row-major matrix.
//!
//! `Matrix` is the only numeric container in the crate: weights, layer outputs,
//! error signals and gradients are all matrices, and row vectors (`rows == 1`)
//! stand in for single examples.
//!
//! Two API layers are exposed, mirroring the rest of the crate:
//!
//! - named methods (`try_add`, `matmul`, `hadamard_product`, ...) validate shapes and
//!   return [`Result`];
//! - `std::ops` operators (`+`, `-`, `*`, `+=`, `-=`, `*=`) are sugar over the same code
//!   and panic on shape mismatch, since a mismatch there is a programmer error.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

use crate::matmul::gemm_f64;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major, `values.len() == rows * cols`.
    values: Vec<f64>,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols],
        }
    }

    /// A single-row matrix holding `values`.
    pub fn row(values: Vec<f64>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            values,
        }
    }

    /// Build a matrix from nested rows.
    ///
    /// Returns an error if the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::InvalidData(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            values,
        })
    }

    /// Fill a `rows x cols` matrix by calling `f` once per cell in row-major order.
    pub fn from_fn<F: FnMut() -> f64>(rows: usize, cols: usize, mut f: F) -> Self {
        let values = (0..rows * cols).map(|_| f()).collect();
        Self { rows, cols, values }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn is_row_vector(&self) -> bool {
        self.rows == 1
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    /// Returns the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.values[row * self.cols + col])
        } else {
            None
        }
    }

    /// Append one column holding `val`. Row vectors only.
    pub fn add_val(&mut self, val: f64) -> Result<&mut Self> {
        self.require_row_vector("add_val")?;
        self.values.push(val);
        self.cols += 1;
        Ok(self)
    }

    /// Drop the last column. Row vectors only.
    pub fn remove_last(&mut self) -> Result<&mut Self> {
        self.require_row_vector("remove_last")?;
        if self.values.pop().is_none() {
            return Err(Error::EmptyMatrix { op: "remove_last" });
        }
        self.cols -= 1;
        Ok(self)
    }

    pub fn try_add(&self, rhs: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.add_in_place(rhs)?;
        Ok(out)
    }

    pub fn try_sub(&self, rhs: &Matrix) -> Result<Matrix> {
        let mut out = self.clone();
        out.sub_in_place(rhs)?;
        Ok(out)
    }

    pub fn add_in_place(&mut self, rhs: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(rhs, "add", |x, y| *x += y)
    }

    pub fn sub_in_place(&mut self, rhs: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(rhs, "sub", |x, y| *x -= y)
    }

    /// Element-wise product, in place.
    pub fn hadamard_product(&mut self, rhs: &Matrix) -> Result<&mut Self> {
        self.zip_in_place(rhs, "hadamard_product", |x, y| *x *= y)
    }

    /// Multiply every cell by `scalar`, in place.
    pub fn scale(&mut self, scalar: f64) -> &mut Self {
        for v in &mut self.values {
            *v *= scalar;
        }
        self
    }

    pub fn scaled(&self, scalar: f64) -> Matrix {
        let mut out = self.clone();
        out.scale(scalar);
        out
    }

    /// Standard matrix product `self * rhs`.
    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix> {
        if self.cols != rhs.rows {
            return Err(Error::ShapeMismatch {
                op: "matmul",
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }

        let mut out = Matrix::zeros(self.rows, rhs.cols);
        gemm_f64(
            self.rows,
            rhs.cols,
            self.cols,
            &self.values,
            &rhs.values,
            &mut out.values,
        );
        Ok(out)
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.values[c * self.rows + r] = self.values[r * self.cols + c];
            }
        }
        out
    }

    /// Kronecker product: block `(i, j)` of the result is `self(i, j) * rhs`.
    ///
    /// For a column vector `a` and a row vector `b` this is the outer product `a b`.
    pub fn kronecker_product(&self, rhs: &Matrix) -> Matrix {
        let out_cols = self.cols * rhs.cols;
        let mut out = Matrix::zeros(self.rows * rhs.rows, out_cols);

        for r1 in 0..self.rows {
            for c1 in 0..self.cols {
                let a = self.values[r1 * self.cols + c1];
                for r2 in 0..rhs.rows {
                    let row = r1 * rhs.rows + r2;
                    let rhs_row = &rhs.values[r2 * rhs.cols..(r2 + 1) * rhs.cols];
                    let start = row * out_cols + c1 * rhs.cols;
                    for (dst, &b) in out.values[start..start + rhs.cols].iter_mut().zip(rhs_row) {
                        *dst = a * b;
                    }
                }
            }
        }

        out
    }

    /// Largest cell value.
    pub fn max(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(Error::EmptyMatrix { op: "max" });
        }
        Ok(self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Flat index of the largest cell; ties go to the first occurrence.
    pub fn argmax(&self) -> Result<usize> {
        let (first, rest) = self
            .values
            .split_first()
            .ok_or(Error::EmptyMatrix { op: "argmax" })?;

        let mut best = *first;
        let mut best_idx = 0;
        for (i, &v) in rest.iter().enumerate() {
            if v > best {
                best = v;
                best_idx = i + 1;
            }
        }
        Ok(best_idx)
    }

    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn map_in_place<F: Fn(f64) -> f64>(&mut self, f: F) -> &mut Self {
        for v in &mut self.values {
            *v = f(*v);
        }
        self
    }

    fn require_row_vector(&self, op: &'static str) -> Result<()> {
        if self.rows != 1 {
            return Err(Error::NotARowVector {
                op,
                rows: self.rows,
            });
        }
        Ok(())
    }

    fn zip_in_place<F: Fn(&mut f64, f64)>(
        &mut self,
        rhs: &Matrix,
        op: &'static str,
        f: F,
    ) -> Result<&mut Self> {
        if self.shape() != rhs.shape() {
            return Err(Error::ShapeMismatch {
                op,
                lhs: self.shape(),
                rhs: rhs.shape(),
            });
        }
        for (x, &y) in self.values.iter_mut().zip(&rhs.values) {
            f(x, y);
        }
        Ok(self)
    }
}

impl From<Vec<f64>> for Matrix {
    fn from(values: Vec<f64>) -> Self {
        Matrix::row(values)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.values[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.values[row * self.cols + col]
    }
}

#[track_caller]
fn or_panic<T>(res: Result<T>) -> T {
    match res {
        Ok(v) => v,
        Err(e) => panic!("{e}"),
    }
}

impl Add<&Matrix> for Matrix {
    type Output = Matrix;

    #[track_caller]
    fn add(mut self, rhs: &Matrix) -> Matrix {
        or_panic(self.add_in_place(rhs).map(|_| ()));
        self
    }
}

impl Add<&Matrix> for &Matrix {
    type Output = Matrix;

    #[track_caller]
    fn add(self, rhs: &Matrix) -> Matrix {
        or_panic(self.try_add(rhs))
    }
}

impl Sub<&Matrix> for Matrix {
    type Output = Matrix;

    #[track_caller]
    fn sub(mut self, rhs: &Matrix) -> Matrix {
        or_panic(self.sub_in_place(rhs).map(|_| ()));
        self
    }
}

impl Sub<&Matrix> for &Matrix {
    type Output = Matrix;

    #[track_caller]
    fn sub(self, rhs: &Matrix) -> Matrix {
        or_panic(self.try_sub(rhs))
    }
}

impl AddAssign<&Matrix> for Matrix {
    #[track_caller]
    fn add_assign(&mut self, rhs: &Matrix) {
        or_panic(self.add_in_place(rhs).map(|_| ()));
    }
}

impl SubAssign<&Matrix> for Matrix {
    #[track_caller]
    fn sub_assign(&mut self, rhs: &Matrix) {
        or_panic(self.sub_in_place(rhs).map(|_| ()));
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    #[track_caller]
    fn mul(self, rhs: &Matrix) -> Matrix {
        or_panic(self.matmul(rhs))
    }
}

impl Mul<f64> for Matrix {
    type Output = Matrix;

    fn mul(mut self, scalar: f64) -> Matrix {
        self.scale(scalar);
        self
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Matrix {
        self.scaled(scalar)
    }
}

impl Mul<Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, mut rhs: Matrix) -> Matrix {
        rhs.scale(self);
        rhs
    }
}

impl Mul<&Matrix> for f64 {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        rhs.scaled(self)
    }
}

impl MulAssign<f64> for Matrix {
    fn mul_assign(&mut self, scalar: f64) {
        self.scale(scalar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: &[&[f64]]) -> Matrix {
        let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(&rows).unwrap()
    }

    #[test]
    fn add_matches_hand_computed_sum() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let b = m(&[&[7.0, 7.0], &[7.0, 7.0]]);
        assert_eq!(&a + &b, m(&[&[8.0, 9.0], &[10.0, 11.0]]));
    }

    #[test]
    fn matmul_matches_hand_computed_product() {
        let a = m(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        let b = m(&[&[7.0, 8.0, 9.0, 10.0], &[11.0, 12.0, 13.0, 14.0]]);
        let expected = m(&[
            &[29.0, 32.0, 35.0, 38.0],
            &[65.0, 72.0, 79.0, 86.0],
            &[101.0, 112.0, 123.0, 134.0],
        ]);
        assert_eq!(a.matmul(&b).unwrap(), expected);
        assert_eq!(&a * &b, expected);
    }

    #[test]
    fn matmul_rejects_incompatible_inner_dims() {
        let a = Matrix::zeros(2, 3);
        let err = a.matmul(&Matrix::zeros(2, 3)).unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                op: "matmul",
                lhs: (2, 3),
                rhs: (2, 3)
            }
        ));
    }

    #[test]
    fn transpose_swaps_dimensions() {
        let a = m(&[&[7.0, 8.0, 9.0, 10.0], &[11.0, 12.0, 13.0, 14.0]]);
        let expected = m(&[&[7.0, 11.0], &[8.0, 12.0], &[9.0, 13.0], &[10.0, 14.0]]);
        assert_eq!(a.transpose(), expected);
    }

    #[test]
    fn kronecker_product_builds_scaled_blocks() {
        let a = m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]);
        let b = m(&[
            &[7.0, 8.0, 9.0],
            &[10.0, 11.0, 12.0],
            &[13.0, 14.0, 15.0],
            &[16.0, 17.0, 18.0],
        ]);
        let expected = m(&[
            &[7.0, 8.0, 9.0, 14.0, 16.0, 18.0, 21.0, 24.0, 27.0],
            &[10.0, 11.0, 12.0, 20.0, 22.0, 24.0, 30.0, 33.0, 36.0],
            &[13.0, 14.0, 15.0, 26.0, 28.0, 30.0, 39.0, 42.0, 45.0],
            &[16.0, 17.0, 18.0, 32.0, 34.0, 36.0, 48.0, 51.0, 54.0],
            &[28.0, 32.0, 36.0, 35.0, 40.0, 45.0, 42.0, 48.0, 54.0],
            &[40.0, 44.0, 48.0, 50.0, 55.0, 60.0, 60.0, 66.0, 72.0],
            &[52.0, 56.0, 60.0, 65.0, 70.0, 75.0, 78.0, 84.0, 90.0],
            &[64.0, 68.0, 72.0, 80.0, 85.0, 90.0, 96.0, 102.0, 108.0],
        ]);
        let k = a.kronecker_product(&b);
        assert_eq!(k.shape(), (8, 9));
        assert_eq!(k, expected);
    }

    #[test]
    fn kronecker_of_column_and_row_is_outer_product() {
        let col = Matrix::row(vec![1.0, 2.0, 1.0]).transpose();
        let row = Matrix::row(vec![3.0, -1.0]);
        let expected = m(&[&[3.0, -1.0], &[6.0, -2.0], &[3.0, -1.0]]);
        assert_eq!(col.kronecker_product(&row), expected);
    }

    #[test]
    fn hadamard_multiplies_in_place_and_checks_shapes() {
        let mut a = m(&[&[1.0, 2.0], &[3.0, 4.0]]);
        a.hadamard_product(&m(&[&[2.0, 0.5], &[-1.0, 0.0]])).unwrap();
        assert_eq!(a, m(&[&[2.0, 1.0], &[-3.0, 0.0]]));

        assert!(a.hadamard_product(&Matrix::zeros(1, 4)).is_err());
    }

    #[test]
    fn add_and_sub_reject_shape_mismatch() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(2, 3);
        assert!(a.try_add(&b).is_err());
        assert!(a.try_sub(&b).is_err());
    }

    #[test]
    #[should_panic(expected = "shape mismatch in add")]
    fn add_operator_panics_on_shape_mismatch() {
        let _ = &Matrix::zeros(1, 2) + &Matrix::zeros(2, 1);
    }

    #[test]
    fn scalar_multiply_commutes() {
        let a = m(&[&[1.0, -2.0], &[0.5, 4.0]]);
        assert_eq!(&a * 3.0, 3.0 * &a);
        assert_eq!(a.clone() * 3.0, m(&[&[3.0, -6.0], &[1.5, 12.0]]));
    }

    #[test]
    fn bias_helpers_only_work_on_row_vectors() {
        let mut v = Matrix::row(vec![1.0, 2.0]);
        v.add_val(1.0).unwrap();
        assert_eq!(v, Matrix::row(vec![1.0, 2.0, 1.0]));
        v.remove_last().unwrap().remove_last().unwrap();
        assert_eq!(v, Matrix::row(vec![1.0]));

        let mut not_row = Matrix::zeros(2, 2);
        assert!(matches!(
            not_row.add_val(1.0),
            Err(Error::NotARowVector { rows: 2, .. })
        ));
        assert!(matches!(
            not_row.remove_last(),
            Err(Error::NotARowVector { rows: 2, .. })
        ));
    }

    #[test]
    fn max_and_argmax() {
        let v = Matrix::row(vec![0.1, 0.7, 0.7, -3.0]);
        assert_eq!(v.max().unwrap(), 0.7);
        assert_eq!(v.argmax().unwrap(), 1);

        assert!(matches!(
            Matrix::zeros(0, 0).max(),
            Err(Error::EmptyMatrix { .. })
        ));
        assert!(Matrix::zeros(1, 0).argmax().is_err());
    }

    #[test]
    fn from_fn_fills_in_row_major_order() {
        let mut next = 0.0;
        let a = Matrix::from_fn(2, 3, || {
            next += 1.0;
            next
        });
        assert_eq!(a, m(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]));
        assert_eq!(a[(1, 0)], 4.0);
        assert_eq!(a.get(2, 0), None);
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn equality_is_exact_and_shape_aware() {
        let a = Matrix::row(vec![1.0, 2.0]);
        assert_ne!(a, a.transpose());
        assert_ne!(a, Matrix::row(vec![1.0, 2.0 + f64::EPSILON * 2.0]));
    }
}
