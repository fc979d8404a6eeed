//! Strided inner-product primitives.
//!
//! Every matrix product in this crate bottoms out here, so a transposed
//! operand can be read column-major through a stride instead of being
//! copied first.

/// Contiguous inner product of two equal-length slices.
///
/// Sums the products left to right into a single `f64` accumulator.
///
/// # Examples
///
/// ```
/// use oneka_engine::dot::dot;
///
/// assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
/// assert_eq!(dot(&[], &[]), 0.0);
/// ```
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "dot operands must have equal length");
    let mut sum = 0.0;
    for i in 0..x.len() {
        sum += x[i] * y[i];
    }
    sum
}

/// Inner product of `n` elements read with independent strides.
///
/// Element `i` of the sum is `x[i * inc_x] * y[i * inc_y]`. With a row-major
/// buffer, a unit stride walks a row and a stride equal to the column count
/// walks a column.
pub fn dot_strided(x: &[f64], inc_x: usize, y: &[f64], inc_y: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    assert!(inc_x > 0 && inc_y > 0, "strides must be positive");
    assert!(
        (n - 1) * inc_x < x.len(),
        "x has {} elements, stride walk needs {}",
        x.len(),
        (n - 1) * inc_x + 1
    );
    assert!(
        (n - 1) * inc_y < y.len(),
        "y has {} elements, stride walk needs {}",
        y.len(),
        (n - 1) * inc_y + 1
    );
    let mut sum = 0.0;
    for i in 0..n {
        sum += x[i * inc_x] * y[i * inc_y];
    }
    sum
}

/// Sum of squares of `n` elements of `x` read with stride `inc_x`.
pub fn dot_self(x: &[f64], inc_x: usize, n: usize) -> f64 {
    dot_strided(x, inc_x, x, inc_x, n)
}
