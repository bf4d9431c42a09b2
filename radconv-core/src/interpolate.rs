//! Linear interpolation on monotonic coordinates.
//!
//! Pressure coordinates decrease with height, so every routine here accepts
//! either increasing or decreasing abscissae.

use crate::errors::{RadConvError, RadConvResult};
use crate::FloatValue;
use ndarray::Array1;

/// Straight-line interpolation through `(x0, y0)` and `(x1, y1)` evaluated at `x`.
///
/// Values outside `[x0, x1]` are extrapolated along the same line.
pub fn linear(
    x0: FloatValue,
    x1: FloatValue,
    y0: FloatValue,
    y1: FloatValue,
    x: FloatValue,
) -> FloatValue {
    if x1 == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Index `i` of the segment `[xs[i], xs[i + 1]]` used to evaluate `x`.
///
/// Points beyond either end of `xs` map onto the nearest end segment.
fn segment_index(xs: &[FloatValue], x: FloatValue) -> usize {
    let n = xs.len();
    let increasing = xs[n - 1] > xs[0];
    let position = xs.partition_point(|&xi| if increasing { xi < x } else { xi > x });
    position.clamp(1, n - 1) - 1
}

/// Evaluate the piecewise-linear function through `(xs, ys)` at `x`,
/// extrapolating linearly outside the data range.
///
/// # Errors
/// Fails if fewer than two points are given or the lengths differ.
pub fn interp_extrapolate(
    xs: &[FloatValue],
    ys: &[FloatValue],
    x: FloatValue,
) -> RadConvResult<FloatValue> {
    if xs.len() != ys.len() {
        return Err(RadConvError::ShapeMismatch {
            name: "interpolation ordinates".to_string(),
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if xs.len() < 2 {
        return Err(RadConvError::Error(
            "At least two points are required for linear interpolation".to_string(),
        ));
    }
    let i = segment_index(xs, x);
    Ok(linear(xs[i], xs[i + 1], ys[i], ys[i + 1], x))
}

/// Vectorised form of [`interp_extrapolate`].
pub fn interp_extrapolate_all(
    xs: &[FloatValue],
    ys: &[FloatValue],
    targets: &[FloatValue],
) -> RadConvResult<Array1<FloatValue>> {
    targets
        .iter()
        .map(|&x| interp_extrapolate(xs, ys, x))
        .collect::<RadConvResult<Vec<_>>>()
        .map(Array1::from)
}
