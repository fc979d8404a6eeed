//! Cholesky-based linear solvers.
//!
//! This module implements the factorization at the heart of the inference:
//!
//! ```text
//! A = L·L'          (A symmetric positive-definite, L lower-triangular)
//! ```
//!
//! and the two consumers built on it:
//! - the SPD inverse, by forward/back substitution against the columns of
//!   the identity,
//! - the least-squares solution of an overdetermined system via the normal
//!   equations `A'A·X = A'B`.
//!
//! Only the lower triangle of the input is read by the factorization; the
//! upper triangle of `L` is zero. A non-positive pivot aborts with
//! [`SolveError::NotSpd`]; a least-squares system whose normal-equations
//! matrix fails the factorization reports [`SolveError::Singular`].

use crate::dot::dot;
use crate::error::{Result, SolveError};
use crate::matrix::Matrix;

/// Cholesky factorization of a symmetric positive-definite matrix.
///
/// Returns the lower-triangular `L` with strictly positive diagonal such
/// that `A = L·L'`. Fails at the first diagonal whose squared value would
/// be non-positive.
pub fn cholesky(a: &Matrix) -> Result<Matrix> {
    assert_eq!(a.rows(), a.cols(), "Cholesky requires a square matrix");
    let n = a.rows();
    let mut l = Matrix::zeros(n, n);
    for j in 0..n {
        let d = a[(j, j)] - dot(&l.row(j)[..j], &l.row(j)[..j]);
        if d <= 0.0 {
            return Err(SolveError::NotSpd);
        }
        let d = d.sqrt();
        l[(j, j)] = d;
        for i in j + 1..n {
            let s = a[(i, j)] - dot(&l.row(i)[..j], &l.row(j)[..j]);
            l[(i, j)] = s / d;
        }
    }
    Ok(l)
}

/// Solves `L·L'·X = B` by forward then back substitution.
fn cholesky_solve(l: &Matrix, b: &Matrix) -> Matrix {
    let n = l.rows();
    let mut x = Matrix::zeros(n, b.cols());
    for col in 0..b.cols() {
        // L·y = b, overwriting x with y.
        for i in 0..n {
            let mut s = b[(i, col)];
            for j in 0..i {
                s -= l[(i, j)] * x[(j, col)];
            }
            x[(i, col)] = s / l[(i, i)];
        }
        // L'·x = y, in place.
        for i in (0..n).rev() {
            let mut s = x[(i, col)];
            for j in i + 1..n {
                s -= l[(j, i)] * x[(j, col)];
            }
            x[(i, col)] = s / l[(i, i)];
        }
    }
    x
}

/// Inverse of a symmetric positive-definite matrix via Cholesky.
pub fn spd_inverse(a: &Matrix) -> Result<Matrix> {
    assert_eq!(a.rows(), a.cols(), "SPD inverse requires a square matrix");
    let l = cholesky(a)?;
    Ok(cholesky_solve(&l, &Matrix::identity(a.rows())))
}

/// Least-squares solution of `A·X = B` for `A` with at least as many rows
/// as columns and full column rank.
///
/// Minimizes the Frobenius norm of the residual through the normal
/// equations. Rank deficiency surfaces as [`SolveError::Singular`].
pub fn least_squares(a: &Matrix, b: &Matrix) -> Result<Matrix> {
    assert!(
        a.rows() >= a.cols(),
        "least squares requires at least as many rows as columns, got {}x{}",
        a.rows(),
        a.cols()
    );
    assert_eq!(a.rows(), b.rows(), "A and B must have matching row counts");
    let ata = a.tr_mul(a);
    let atb = a.tr_mul(b);
    let l = cholesky(&ata).map_err(|_| SolveError::Singular)?;
    Ok(cholesky_solve(&l, &atb))
}

/// Affine transformation `Y = X·U + 1·mu`.
///
/// `U` is square, `mu` a `1 x n` row added to every row of the product.
pub fn affine(x: &Matrix, u: &Matrix, mu: &Matrix) -> Matrix {
    assert_eq!(u.rows(), u.cols(), "U must be square");
    assert_eq!(
        x.cols(),
        u.rows(),
        "inner dimensions must agree for X*U: {}x{} by {}x{}",
        x.rows(),
        x.cols(),
        u.rows(),
        u.cols()
    );
    assert_eq!(mu.rows(), 1, "mu must be a row vector");
    assert_eq!(mu.cols(), u.cols(), "mu and U dimensions must agree");
    let mut y = x.mul(u);
    for r in 0..y.rows() {
        for c in 0..y.cols() {
            y[(r, c)] += mu[(0, c)];
        }
    }
    y
}
