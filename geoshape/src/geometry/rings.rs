//! Planar measures over a single part (a run of vertices).
//!
//! All functions take the X and Y slices of one part only. Callers slice the
//! shape's vertex arrays with the part range first.

/// Length of the polyline through the vertices, in input order.
pub fn length_of_xys(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| {
            let dx = xs[1] - xs[0];
            let dy = ys[1] - ys[0];
            (dx * dx + dy * dy).sqrt()
        })
        .sum()
}

/// Signed area of a closed ring (first vertex repeated at the end).
///
/// Positive for counter-clockwise rings, negative for clockwise ones. The sum
/// runs over the interior vertices `1..n-1` relative to the first vertex, so
/// the closing vertex is only used as the `i + 1` neighbour.
pub fn area_of_xys(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 1..n - 1 {
        sum += (x[i] - x[0]) * (y[i + 1] - y[i - 1]);
    }
    sum / 2.0
}

/// Twice the signed area of the ring, including the implicit closing edge
/// from the last vertex back to the first.
pub(crate) fn winding_sum(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let last = n - 1;
    let mut sum = 0.0;
    for i in 0..last {
        sum += x[i] * y[i + 1] - y[i] * x[i + 1];
    }
    sum + x[last] * y[0] - y[last] * x[0]
}

/// Parity of the crossings between the ring's edges and a ray from
/// `(tx, ty)` towards negative X.
///
/// Edges are half-open in Y: an edge counts when one end lies strictly below
/// `ty` and the other at or above it. Horizontal edges never count and a
/// shared vertex is counted once.
pub(crate) fn crosses_odd(x: &[f64], y: &[f64], tx: f64, ty: f64) -> bool {
    let n = x.len().min(y.len());
    let mut odd = false;
    for edge in 0..n {
        let next = if edge < n - 1 { edge + 1 } else { 0 };
        if (y[edge] < ty && y[next] >= ty) || (y[next] < ty && y[edge] >= ty) {
            let cross_x = x[edge] + (ty - y[edge]) / (y[next] - y[edge]) * (x[next] - x[edge]);
            if cross_x < tx {
                odd = !odd;
            }
        }
    }
    odd
}
