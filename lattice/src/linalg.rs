//! Exact integer and rational matrices.
//!
//! Lattice computations never touch floating point. [`IntMatrix`] holds the
//! involutions and basis changes that end up integral, [`RatMatrix`] carries
//! the intermediate products of basis completion (`V·D·V⁻¹`) whose integrality
//! is only known after the fact.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::linalg::{rank, IntMatrix};
//!
//! let m = IntMatrix::identity(3);
//! assert!(m.is_identity());
//! assert_eq!(rank(&[vec![1, 2, 3], vec![2, 4, 6]]), 1);
//! ```

use std::fmt;
use std::ops::Mul;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};

// ============================================================================
// Integer matrices
// ============================================================================

/// Dense row-major matrix with `i64` entries.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntMatrix {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl IntMatrix {
    /// The `rows × cols` zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// The `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1;
        }
        m
    }

    /// Square diagonal matrix with the given diagonal.
    pub fn diagonal(diag: &[i64]) -> Self {
        let n = diag.len();
        let mut m = Self::zeros(n, n);
        for (i, &x) in diag.iter().enumerate() {
            m.data[i * n + i] = x;
        }
        m
    }

    /// Builds a matrix from its rows.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegenerateBasis`] when the rows have different lengths.
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != cols) {
            return Err(LatticeError::DegenerateBasis(
                "matrix rows have different lengths".to_string(),
            ));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    /// Builds a matrix whose columns are the given vectors.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegenerateBasis`] when the columns have different lengths.
    pub fn from_columns(cols: &[Vec<i64>]) -> Result<Self> {
        Ok(Self::from_rows(cols)?.transpose())
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> i64 {
        self.data[i * self.cols + j]
    }

    /// Overwrites the entry at row `i`, column `j`.
    pub fn set(&mut self, i: usize, j: usize, value: i64) {
        self.data[i * self.cols + j] = value;
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[i64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// All rows as owned vectors.
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.get(i, j);
            }
        }
        t
    }

    /// Matrix times column vector.
    pub fn mul_vec(&self, v: &[i64]) -> Vec<i64> {
        (0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect()
    }

    /// True for a square identity matrix.
    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows)
                .all(|i| (0..self.cols).all(|j| self.get(i, j) == i64::from(i == j)))
    }

    /// Exact rational copy of this matrix.
    pub fn to_rational(&self) -> RatMatrix {
        RatMatrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|&x| BigRational::from_integer(BigInt::from(x)))
                .collect(),
        }
    }
}

impl Mul for &IntMatrix {
    type Output = IntMatrix;

    fn mul(self, rhs: &IntMatrix) -> IntMatrix {
        debug_assert_eq!(self.cols, rhs.rows);
        let mut out = IntMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a == 0 {
                    continue;
                }
                for j in 0..rhs.cols {
                    out.data[i * rhs.cols + j] += a * rhs.get(k, j);
                }
            }
        }
        out
    }
}

impl fmt::Display for IntMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let cells: Vec<String> = self.row(i).iter().map(|x| format!("{x:>3}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

// ============================================================================
// Rational matrices
// ============================================================================

/// Dense row-major matrix with arbitrary-precision rational entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RatMatrix {
    rows: usize,
    cols: usize,
    data: Vec<BigRational>,
}

impl RatMatrix {
    /// The `n × n` identity matrix.
    pub fn identity(n: usize) -> Self {
        IntMatrix::identity(n).to_rational()
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entry at row `i`, column `j`.
    pub fn get(&self, i: usize, j: usize) -> &BigRational {
        &self.data[i * self.cols + j]
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.get(i, j).clone());
            }
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }

    /// True for a square identity matrix.
    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|i| {
                (0..self.cols).all(|j| {
                    let x = self.get(i, j);
                    if i == j {
                        x.is_one()
                    } else {
                        x.is_zero()
                    }
                })
            })
    }

    /// True when every entry has denominator one.
    pub fn is_integral(&self) -> bool {
        self.data.iter().all(BigRational::is_integer)
    }

    /// Integer copy of this matrix, or `None` when an entry is fractional or
    /// does not fit in `i64`.
    pub fn to_integer(&self) -> Option<IntMatrix> {
        let data = self
            .data
            .iter()
            .map(|x| if x.is_integer() { x.to_integer().to_i64() } else { None })
            .collect::<Option<Vec<i64>>>()?;
        Some(IntMatrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    /// Inverse by Gauss-Jordan elimination, `None` when singular or not square.
    pub fn inverse(&self) -> Option<Self> {
        if self.rows != self.cols {
            return None;
        }
        let n = self.rows;
        let mut a = self.clone();
        let mut inv = Self::identity(n);
        for col in 0..n {
            let pivot = (col..n).find(|&r| !a.get(r, col).is_zero())?;
            a.swap_rows(col, pivot);
            inv.swap_rows(col, pivot);
            let p = a.get(col, col).clone();
            a.scale_row(col, &p);
            inv.scale_row(col, &p);
            for r in 0..n {
                if r == col || a.get(r, col).is_zero() {
                    continue;
                }
                let factor = a.get(r, col).clone();
                a.sub_row_multiple(r, col, &factor);
                inv.sub_row_multiple(r, col, &factor);
            }
        }
        Some(inv)
    }

    /// Rank over the rationals.
    pub fn rank(&self) -> usize {
        let mut a = self.clone();
        a.row_reduce().len()
    }

    /// Reduces `self` to reduced row echelon form in place and returns the
    /// pivot columns.
    fn row_reduce(&mut self) -> Vec<usize> {
        let mut pivots = Vec::new();
        let mut row = 0;
        for col in 0..self.cols {
            if row == self.rows {
                break;
            }
            let Some(p) = (row..self.rows).find(|&r| !self.get(r, col).is_zero()) else {
                continue;
            };
            self.swap_rows(row, p);
            let lead = self.get(row, col).clone();
            self.scale_row(row, &lead);
            for r in 0..self.rows {
                if r != row && !self.get(r, col).is_zero() {
                    let factor = self.get(r, col).clone();
                    self.sub_row_multiple(r, row, &factor);
                }
            }
            pivots.push(col);
            row += 1;
        }
        pivots
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Divides row `r` by `divisor`.
    fn scale_row(&mut self, r: usize, divisor: &BigRational) {
        for j in 0..self.cols {
            let x = &self.data[r * self.cols + j] / divisor;
            self.data[r * self.cols + j] = x;
        }
    }

    /// `row[target] -= factor * row[source]`.
    fn sub_row_multiple(&mut self, target: usize, source: usize, factor: &BigRational) {
        for j in 0..self.cols {
            let x = &self.data[target * self.cols + j] - factor * &self.data[source * self.cols + j];
            self.data[target * self.cols + j] = x;
        }
    }
}

impl Mul for &RatMatrix {
    type Output = RatMatrix;

    fn mul(self, rhs: &RatMatrix) -> RatMatrix {
        debug_assert_eq!(self.cols, rhs.rows);
        let mut data = vec![BigRational::zero(); self.rows * rhs.cols];
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    data[i * rhs.cols + j] += a * rhs.get(k, j);
                }
            }
        }
        RatMatrix {
            rows: self.rows,
            cols: rhs.cols,
            data,
        }
    }
}

// ============================================================================
// Vector-level helpers
// ============================================================================

/// Rank of a list of integer vectors over the rationals.
///
/// Uses fraction-free elimination on `i128` with gcd normalization, which is
/// ample for the small entries of divisor classes.
pub fn rank(rows: &[Vec<i64>]) -> usize {
    let mut m: Vec<Vec<i128>> = rows
        .iter()
        .map(|r| r.iter().map(|&x| i128::from(x)).collect())
        .collect();
    let cols = m.first().map_or(0, Vec::len);
    let mut rank = 0;
    for col in 0..cols {
        let Some(p) = (rank..m.len()).find(|&r| m[r][col] != 0) else {
            continue;
        };
        m.swap(rank, p);
        for r in rank + 1..m.len() {
            if m[r][col] == 0 {
                continue;
            }
            let a = m[rank][col];
            let b = m[r][col];
            let pivot_row = m[rank].clone();
            for (x, y) in m[r].iter_mut().zip(&pivot_row) {
                *x = *x * a - *y * b;
            }
            let g = m[r].iter().fold(0i128, |g, &x| g.gcd(&x));
            if g > 1 {
                for x in m[r].iter_mut() {
                    *x /= g;
                }
            }
        }
        rank += 1;
        if rank == m.len() {
            break;
        }
    }
    rank
}

/// True when `v` lies in the rational span of `rows`.
pub fn in_span(rows: &[Vec<i64>], v: &[i64]) -> bool {
    let mut all = rows.to_vec();
    all.push(v.to_vec());
    rank(&all) == rank(rows)
}

/// Basis of the right kernel `{x : A·x = 0}` of the matrix with the given rows,
/// each basis vector scaled to a primitive integer vector.
///
/// `ncols` fixes the ambient dimension when `rows` is empty. `None` when a
/// kernel vector has an entry outside the `i64` range.
pub fn integer_kernel(rows: &[Vec<i64>], ncols: usize) -> Option<Vec<Vec<i64>>> {
    let mut a = if rows.is_empty() {
        IntMatrix::zeros(0, ncols).to_rational()
    } else {
        let data: Vec<BigRational> = rows
            .iter()
            .flatten()
            .map(|&x| BigRational::from_integer(BigInt::from(x)))
            .collect();
        RatMatrix {
            rows: rows.len(),
            cols: ncols,
            data,
        }
    };
    let pivots = a.row_reduce();
    let mut kernel = Vec::new();
    for free in (0..ncols).filter(|c| !pivots.contains(c)) {
        let mut v = vec![BigRational::zero(); ncols];
        v[free] = BigRational::one();
        for (r, &p) in pivots.iter().enumerate() {
            v[p] = -a.get(r, free).clone();
        }
        kernel.push(primitive(&v)?);
    }
    Some(kernel)
}

/// Scales a rational vector to the primitive integer vector on the same ray.
fn primitive(v: &[BigRational]) -> Option<Vec<i64>> {
    let lcm = v
        .iter()
        .fold(BigInt::one(), |acc, x| acc.lcm(x.denom()));
    let ints: Vec<BigInt> = v.iter().map(|x| (x * &lcm).to_integer()).collect();
    let g = ints
        .iter()
        .fold(BigInt::zero(), |acc, x| acc.gcd(x))
        .abs();
    ints.iter()
        .map(|x| {
            let y = if g.is_zero() { x.clone() } else { x / &g };
            y.to_i64()
        })
        .collect()
}
