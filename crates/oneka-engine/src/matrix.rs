//! Row-major dense matrix of `f64`.
//!
//! `Matrix` is the universal container of the engine: a rectangular block of
//! doubles with shape `(rows, cols)` stored contiguously row by row. Both
//! dimensions are zero or both are positive, and the buffer length always
//! equals `rows * cols`.
//!
//! Shape mismatches, out-of-range indices, and illegal literal characters
//! are programmer errors and panic; they are never returned as values. All
//! arithmetic returns a freshly allocated result, so an expression may reuse
//! any of its operands.
//!
//! The four product flavors (`mul`, `tr_mul`, `mul_tr`, `tr_mul_tr`) feed
//! the strided dot primitives so that a transposed operand is read
//! column-major in place, never copied.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use crate::dot::{dot_self, dot_strided};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates an empty 0 x 0 matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        assert!(
            (rows == 0) == (cols == 0),
            "matrix dimensions must both be zero or both be positive, got {rows}x{cols}"
        );
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a `rows x cols` matrix with every element set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        let mut m = Self::zeros(rows, cols);
        m.data.fill(value);
        m
    }

    /// Creates a `rows x cols` matrix from a row-major slice.
    pub fn from_slice(rows: usize, cols: usize, values: &[f64]) -> Self {
        let mut m = Self::zeros(rows, cols);
        assert_eq!(
            values.len(),
            rows * cols,
            "expected {} values for a {rows}x{cols} matrix, got {}",
            rows * cols,
            values.len()
        );
        m.data.copy_from_slice(values);
        m
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Parses a permissive row-major literal.
    ///
    /// Rows are separated by `;`, columns by `,`. Space and tab are ignored.
    /// An empty or unparseable token becomes `0.0`, shorter rows are
    /// right-padded with zeros to the longest row, and a trailing `;`
    /// appends a full zero row. Characters outside
    /// `{-, 0-9, e, E, ., ',', ';', space, tab}` panic.
    ///
    /// # Examples
    ///
    /// ```
    /// use oneka_engine::Matrix;
    ///
    /// let m = Matrix::from_literal("1, 2; 3");
    /// assert_eq!(m.shape(), (2, 2));
    /// assert_eq!(m[(1, 1)], 0.0);
    /// ```
    pub fn from_literal(text: &str) -> Self {
        for c in text.chars() {
            assert!(
                matches!(c, '-' | '0'..='9' | 'e' | 'E' | '.' | ',' | ';' | ' ' | '\t'),
                "illegal character {c:?} in matrix literal"
            );
        }
        let parsed: Vec<Vec<f64>> = text
            .split(';')
            .map(|row| {
                row.split(',')
                    .map(|token| {
                        let cleaned: String =
                            token.chars().filter(|c| *c != ' ' && *c != '\t').collect();
                        cleaned.parse::<f64>().unwrap_or(0.0)
                    })
                    .collect()
            })
            .collect();
        let rows = parsed.len();
        let cols = parsed.iter().map(Vec::len).max().unwrap_or(0);
        let mut m = Self::zeros(rows, cols);
        for (r, row) in parsed.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                m[(r, c)] = *value;
            }
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Discards the contents and zero-fills to the new shape.
    ///
    /// Resizing to the current shape still zero-fills.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        assert!(
            (rows == 0) == (cols == 0),
            "matrix dimensions must both be zero or both be positive, got {rows}x{cols}"
        );
        self.rows = rows;
        self.cols = cols;
        self.data.clear();
        self.data.resize(rows * cols, 0.0);
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// The row-major element buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The row-major buffer starting at element `(row, col)`.
    pub fn slice_from(&self, row: usize, col: usize) -> &[f64] {
        assert!(
            row < self.rows && col < self.cols,
            "offset ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col..]
    }

    /// Row `r` as a contiguous slice.
    pub fn row(&self, r: usize) -> &[f64] {
        assert!(
            r < self.rows,
            "row {r} out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copies the matrix out as nested row vectors.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// Column sums as a `1 x cols` row.
    pub fn col_sums(&self) -> Matrix {
        assert!(!self.is_empty(), "column sums need at least one element");
        let mut out = Matrix::zeros(1, self.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out[(0, c)] += self[(r, c)];
            }
        }
        out
    }

    /// Row sums as a `rows x 1` column.
    pub fn row_sums(&self) -> Matrix {
        assert!(!self.is_empty(), "row sums need at least one element");
        let mut out = Matrix::zeros(self.rows, 1);
        for r in 0..self.rows {
            out[(r, 0)] = self.row(r).iter().sum();
        }
        out
    }

    /// Sum of the diagonal of a square matrix.
    pub fn trace(&self) -> f64 {
        assert!(!self.is_empty(), "trace needs at least one element");
        assert_eq!(self.rows, self.cols, "trace requires a square matrix");
        (0..self.rows).map(|i| self[(i, i)]).sum()
    }

    /// Largest absolute element.
    pub fn max_abs(&self) -> f64 {
        assert!(!self.is_empty(), "max_abs needs at least one element");
        self.data.iter().fold(0.0, |acc, v| acc.max(v.abs()))
    }

    /// L1 norm: maximum absolute column sum.
    pub fn norm_l1(&self) -> f64 {
        assert!(!self.is_empty(), "L1 norm needs at least one element");
        (0..self.cols)
            .map(|c| (0..self.rows).map(|r| self[(r, c)].abs()).sum())
            .fold(0.0, f64::max)
    }

    /// L-infinity norm: maximum absolute row sum.
    pub fn norm_inf(&self) -> f64 {
        assert!(!self.is_empty(), "L-infinity norm needs at least one element");
        (0..self.rows)
            .map(|r| self.row(r).iter().map(|v| v.abs()).sum())
            .fold(0.0, f64::max)
    }

    /// Frobenius norm: square root of the sum of squared elements.
    pub fn norm_fro(&self) -> f64 {
        assert!(!self.is_empty(), "Frobenius norm needs at least one element");
        dot_self(&self.data, 1, self.data.len()).sqrt()
    }

    /// The transposed matrix.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out[(c, r)] = self[(r, c)];
            }
        }
        out
    }

    /// Element-wise `value + self`.
    pub fn scalar_add(&self, value: f64) -> Matrix {
        let mut out = self.clone();
        for v in &mut out.data {
            *v += value;
        }
        out
    }

    /// Element-wise `value * self`.
    pub fn scale(&self, value: f64) -> Matrix {
        let mut out = self.clone();
        for v in &mut out.data {
            *v *= value;
        }
        out
    }

    /// Product `A * B`.
    pub fn mul(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.rows,
            "inner dimensions must agree for A*B: {}x{} by {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        for r in 0..out.rows {
            for c in 0..out.cols {
                out[(r, c)] = dot_strided(
                    self.slice_from(r, 0),
                    1,
                    rhs.slice_from(0, c),
                    rhs.cols,
                    self.cols,
                );
            }
        }
        out
    }

    /// Product `A' * B` without materializing the transpose.
    pub fn tr_mul(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.rows, rhs.rows,
            "inner dimensions must agree for A'*B: {}x{} by {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = Matrix::zeros(self.cols, rhs.cols);
        for r in 0..out.rows {
            for c in 0..out.cols {
                out[(r, c)] = dot_strided(
                    self.slice_from(0, r),
                    self.cols,
                    rhs.slice_from(0, c),
                    rhs.cols,
                    self.rows,
                );
            }
        }
        out
    }

    /// Product `A * B'` without materializing the transpose.
    pub fn mul_tr(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.cols,
            "inner dimensions must agree for A*B': {}x{} by {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = Matrix::zeros(self.rows, rhs.rows);
        for r in 0..out.rows {
            for c in 0..out.cols {
                out[(r, c)] =
                    dot_strided(self.slice_from(r, 0), 1, rhs.slice_from(c, 0), 1, self.cols);
            }
        }
        out
    }

    /// Product `A' * B'` without materializing either transpose.
    pub fn tr_mul_tr(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.rows, rhs.cols,
            "inner dimensions must agree for A'*B': {}x{} by {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );
        let mut out = Matrix::zeros(self.cols, rhs.rows);
        for r in 0..out.rows {
            for c in 0..out.cols {
                out[(r, c)] = dot_strided(
                    self.slice_from(0, r),
                    self.cols,
                    rhs.slice_from(c, 0),
                    1,
                    self.rows,
                );
            }
        }
        out
    }
}

/// Quadratic form `a' * B * c` with `a` and `c` as columns.
pub fn quad_form(a: &Matrix, b: &Matrix, c: &Matrix) -> f64 {
    assert_eq!(a.cols(), 1, "a must be a column vector");
    assert_eq!(c.cols(), 1, "c must be a column vector");
    assert_eq!(a.rows(), b.rows(), "a and B dimensions must agree");
    assert_eq!(b.cols(), c.rows(), "B and c dimensions must agree");
    assert!(!b.is_empty(), "quadratic form needs at least one element");
    let mut sum = 0.0;
    for r in 0..b.rows() {
        sum += a[(r, 0)] * dot_strided(b.slice_from(r, 0), 1, c.as_slice(), 1, b.cols());
    }
    sum
}

/// Quadratic form `a * B * c` with `a` as a row and `c` as a column.
pub fn quad_form_row(a: &Matrix, b: &Matrix, c: &Matrix) -> f64 {
    assert_eq!(a.rows(), 1, "a must be a row vector");
    quad_form(&a.transpose(), b, c)
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (r, c): (usize, usize)) -> &f64 {
        assert!(
            r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &self.data[r * self.cols + c]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
        assert!(
            r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[r * self.cols + c]
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "addition requires matching shapes"
        );
        let mut out = self.clone();
        for (v, w) in out.data.iter_mut().zip(&rhs.data) {
            *v += w;
        }
        out
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "subtraction requires matching shapes"
        );
        let mut out = self.clone();
        for (v, w) in out.data.iter_mut().zip(&rhs.data) {
            *v -= w;
        }
        out
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Matrix {
        self.scale(-1.0)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        Matrix::mul(self, rhs)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            if r > 0 {
                writeln!(f)?;
            }
            for c in 0..self.cols {
                write!(f, "{:>13.5}", self[(r, c)])?;
            }
        }
        Ok(())
    }
}
