//! Dense LU factorization with partial pivoting.

use super::equations::EquationRows;
use crate::error::{KirchhoffError, Result};

/// Square linear system Ax = b over branch currents.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// Coefficient matrix A (row-major)
    pub a: Vec<f64>,
    /// Right-hand side b
    pub b: Vec<f64>,
    /// Solution x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    lu: Vec<f64>,
    pivots: Vec<usize>,
    row_scale: Vec<f64>,
    factored: bool,
}

impl LinearSystem {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            b: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
            row_scale: vec![1.0; size],
            factored: false,
        }
    }

    /// Copy stacked equation rows into a square system.
    ///
    /// Fails with [`KirchhoffError::DimensionMismatch`] unless the rows form
    /// a square block.
    pub fn from_rows(rows: &EquationRows) -> Result<Self> {
        if !rows.is_square() {
            return Err(KirchhoffError::DimensionMismatch {
                rows: rows.len(),
                columns: rows.columns,
            });
        }

        let mut system = Self::new(rows.columns);
        for (r, row) in rows.coefficients.iter().enumerate() {
            if row.len() != rows.columns {
                return Err(KirchhoffError::DimensionMismatch {
                    rows: rows.len(),
                    columns: row.len(),
                });
            }
            system.a[r * system.size..(r + 1) * system.size].copy_from_slice(row);
        }
        system.b.copy_from_slice(&rows.rhs);
        Ok(system)
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Set matrix element at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] = value;
        self.factored = false;
    }

    /// Largest absolute coefficient of A.
    pub fn max_abs(&self) -> f64 {
        self.a.iter().fold(0.0_f64, |m, v| m.max(v.abs()))
    }

    /// Perform LU decomposition with partial pivoting.
    ///
    /// Each row is first scaled by its own largest coefficient, so KCL rows
    /// of unit entries and KVL rows in ohms are compared on equal terms. A
    /// scaled pivot whose magnitude is below `tolerance`, or a row with no
    /// nonzero coefficient, marks the matrix as singular.
    pub fn factor(&mut self, tolerance: f64) -> Result<()> {
        let n = self.size;
        self.factored = false;
        self.lu.copy_from_slice(&self.a);
        for (i, p) in self.pivots.iter_mut().enumerate() {
            *p = i;
        }

        for i in 0..n {
            let row = &mut self.lu[i * n..(i + 1) * n];
            let scale = row.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if scale == 0.0 || !scale.is_finite() {
                log::debug!("row {} has no usable coefficient (scale {})", i, scale);
                return Err(KirchhoffError::SingularMatrix);
            }
            row.iter_mut().for_each(|v| *v /= scale);
            self.row_scale[i] = scale;
        }

        for k in 0..n {
            let (max_row, max_val) = (k..n)
                .map(|i| (i, self.lu[i * n + k].abs()))
                .fold((k, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });

            if max_val <= tolerance {
                log::debug!("scaled pivot {} below tolerance {:e} in column {}", max_val, tolerance, k);
                return Err(KirchhoffError::SingularMatrix);
            }

            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        self.factored = true;
        Ok(())
    }

    /// Solve using the factorization from [`LinearSystem::factor`].
    pub fn solve(&mut self) -> Result<&[f64]> {
        if !self.factored {
            return Err(KirchhoffError::SingularMatrix);
        }
        let n = self.size;

        for i in 0..n {
            let p = self.pivots[i];
            self.x[i] = self.b[p] / self.row_scale[p];
        }

        // L y = P b
        for i in 0..n {
            for j in 0..i {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
        }

        // U x = y
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
            self.x[i] /= self.lu[i * n + i];
        }

        if self.x.iter().any(|v| !v.is_finite()) {
            return Err(KirchhoffError::SingularMatrix);
        }
        Ok(&self.x)
    }

    /// Residual `A x - b` of the current solution.
    pub fn residual(&self) -> Vec<f64> {
        (0..self.size)
            .map(|i| {
                let row = &self.a[i * self.size..(i + 1) * self.size];
                row.iter().zip(&self.x).map(|(a, x)| a * x).sum::<f64>() - self.b[i]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DEFAULT_PIVOT_TOLERANCE;
    use approx::assert_relative_eq;

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero in the leading position forces a row swap
        let mut sys = LinearSystem::new(2);
        sys.set(0, 0, 0.0);
        sys.set(0, 1, 2.0);
        sys.set(1, 0, 3.0);
        sys.set(1, 1, 1.0);
        sys.b = vec![4.0, 5.0];

        sys.factor(DEFAULT_PIVOT_TOLERANCE).unwrap();
        let x = sys.solve().unwrap().to_vec();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert!(sys.residual().iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn test_rows_of_unequal_magnitude_solve() {
        // Unit KCL-style row beside a row in teraohms
        let mut sys = LinearSystem::new(2);
        sys.set(0, 0, 1.0);
        sys.set(0, 1, -1.0);
        sys.set(1, 0, 1e3);
        sys.set(1, 1, 1e13);
        sys.b = vec![0.0, 1e13 + 1e3];

        sys.factor(DEFAULT_PIVOT_TOLERANCE).unwrap();
        let x = sys.solve().unwrap().to_vec();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_row_is_singular() {
        let mut sys = LinearSystem::new(2);
        sys.set(0, 0, 1.0);
        sys.set(0, 1, 1.0);
        assert!(matches!(
            sys.factor(DEFAULT_PIVOT_TOLERANCE),
            Err(KirchhoffError::SingularMatrix)
        ));
    }

    #[test]
    fn test_singular_detected() {
        let mut sys = LinearSystem::new(2);
        sys.set(0, 0, 1.0);
        sys.set(0, 1, 2.0);
        sys.set(1, 0, 2.0);
        sys.set(1, 1, 4.0);
        assert!(matches!(
            sys.factor(DEFAULT_PIVOT_TOLERANCE),
            Err(KirchhoffError::SingularMatrix)
        ));
    }

    #[test]
    fn test_zero_matrix_is_singular() {
        let mut sys = LinearSystem::new(3);
        assert!(matches!(
            sys.factor(DEFAULT_PIVOT_TOLERANCE),
            Err(KirchhoffError::SingularMatrix)
        ));
    }

    #[test]
    fn test_solve_before_factor_fails() {
        let mut sys = LinearSystem::new(1);
        sys.set(0, 0, 1.0);
        assert!(sys.solve().is_err());
    }

    #[test]
    fn test_from_rows_rejects_rectangular() {
        let mut rows = EquationRows::new(2);
        rows.push(super::super::RowKind::Node(crate::circuit::NodeId(1)), vec![1.0, -1.0], 0.0);
        assert!(matches!(
            LinearSystem::from_rows(&rows),
            Err(KirchhoffError::DimensionMismatch { rows: 1, columns: 2 })
        ));
    }
}
