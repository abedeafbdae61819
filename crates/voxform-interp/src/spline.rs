use crate::{error::InterpolationError, options::BoundaryMode, MAX_ORDER, MAX_RANK};

/// Centered B-spline basis function of the given order evaluated at `x`.
///
/// Orders above five evaluate to zero.
pub fn bspline(order: usize, x: f64) -> f64 {
    let ax = x.abs();
    match order {
        0 => {
            if (-0.5..0.5).contains(&x) {
                1.0
            } else {
                0.0
            }
        }
        1 => (1.0 - ax).max(0.0),
        2 => {
            if ax < 0.5 {
                0.75 - ax * ax
            } else if ax < 1.5 {
                0.5 * (1.5 - ax).powi(2)
            } else {
                0.0
            }
        }
        3 => {
            if ax < 1.0 {
                2.0 / 3.0 - ax * ax + 0.5 * ax.powi(3)
            } else if ax < 2.0 {
                (2.0 - ax).powi(3) / 6.0
            } else {
                0.0
            }
        }
        4 => {
            let x2 = ax * ax;
            if ax < 0.5 {
                115.0 / 192.0 - 5.0 / 8.0 * x2 + 0.25 * x2 * x2
            } else if ax < 1.5 {
                55.0 / 96.0 + 5.0 / 24.0 * ax - 1.25 * x2 + 5.0 / 6.0 * x2 * ax - x2 * x2 / 6.0
            } else if ax < 2.5 {
                (2.5 - ax).powi(4) / 24.0
            } else {
                0.0
            }
        }
        5 => {
            let x2 = ax * ax;
            if ax < 1.0 {
                0.55 - 0.5 * x2 + 0.25 * x2 * x2 - x2 * x2 * ax / 12.0
            } else if ax < 2.0 {
                17.0 / 40.0 + 0.625 * ax - 1.75 * x2 + 1.25 * x2 * ax - 0.375 * x2 * x2
                    + x2 * x2 * ax / 24.0
            } else if ax < 3.0 {
                (3.0 - ax).powi(5) / 120.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Index of the first tap and the `order + 1` tap weights for a coordinate.
pub(crate) fn spline_weights(order: usize, c: f64) -> (i64, [f64; MAX_ORDER + 1]) {
    let start = if order % 2 == 1 {
        c.floor() as i64 - (order / 2) as i64
    } else {
        (c + 0.5).floor() as i64 - (order / 2) as i64
    };

    let mut weights = [0.0; MAX_ORDER + 1];
    if order == 0 {
        weights[0] = 1.0;
    } else {
        for (k, w) in weights.iter_mut().enumerate().take(order + 1) {
            *w = bspline(order, c - (start + k as i64) as f64);
        }
    }
    (start, weights)
}

/// Poles of the recursive prefilter for a spline order.
fn filter_poles(order: usize) -> Vec<f64> {
    match order {
        2 => vec![8f64.sqrt() - 3.0],
        3 => vec![3f64.sqrt() - 2.0],
        4 => vec![
            (664.0 - 438976f64.sqrt()).sqrt() + 304f64.sqrt() - 19.0,
            (664.0 + 438976f64.sqrt()).sqrt() - 304f64.sqrt() - 19.0,
        ],
        5 => vec![
            (67.5 - (17745.0f64 / 4.0).sqrt()).sqrt() + (105.0f64 / 4.0).sqrt() - 6.5,
            (67.5 + (17745.0f64 / 4.0).sqrt()).sqrt() - (105.0f64 / 4.0).sqrt() - 6.5,
        ],
        _ => Vec::new(),
    }
}

// whole-sample symmetric boundary
fn init_causal_mirror(c: &mut [f64], z: f64) {
    let n = c.len();
    let z_n_1 = z.powi(n as i32 - 1);
    let mut z_i = z;
    let mut c0 = c[0] + z_n_1 * c[n - 1];
    for i in 1..n - 1 {
        c0 += z_i * (c[i] + z_n_1 * c[n - 1 - i]);
        z_i *= z;
    }
    c[0] = c0 / (1.0 - z_n_1 * z_n_1);
}

fn init_anticausal_mirror(c: &mut [f64], z: f64) {
    let n = c.len();
    c[n - 1] = (z * c[n - 2] + c[n - 1]) * z / (z * z - 1.0);
}

// half-sample symmetric boundary
fn init_causal_reflect(c: &mut [f64], z: f64) {
    let n = c.len();
    let z_n = z.powi(n as i32);
    let c0 = c[0];
    let mut z_i = z;
    let mut acc = c[0] + z_n * c[n - 1];
    for i in 1..n {
        acc += z_i * (c[i] + z_n * c[n - 1 - i]);
        z_i *= z;
    }
    c[0] = acc * z / (1.0 - z_n * z_n) + c0;
}

fn init_anticausal_reflect(c: &mut [f64], z: f64) {
    let n = c.len();
    c[n - 1] *= z / (z - 1.0);
}

/// Run the causal/anticausal recursion over one line of samples in place.
fn filter_line(line: &mut [f64], poles: &[f64], mode: BoundaryMode) {
    let n = line.len();
    if n < 2 || poles.is_empty() {
        return;
    }

    let gain: f64 = poles.iter().map(|z| (1.0 - z) * (1.0 - 1.0 / z)).product();
    line.iter_mut().for_each(|v| *v *= gain);

    let reflect = matches!(mode, BoundaryMode::Nearest | BoundaryMode::Reflect);
    for &z in poles {
        if reflect {
            init_causal_reflect(line, z);
        } else {
            init_causal_mirror(line, z);
        }
        for i in 1..n {
            line[i] += z * line[i - 1];
        }

        if reflect {
            init_anticausal_reflect(line, z);
        } else {
            init_anticausal_mirror(line, z);
        }
        for i in (0..n - 1).rev() {
            line[i] = z * (line[i + 1] - line[i]);
        }
    }
}

/// Compute the B-spline coefficients of a C-order array, one axis at a time.
///
/// Orders 0 and 1 need no prefilter and return the input unchanged.
///
/// # Arguments
///
/// * `data` - The samples, in C order.
/// * `shape` - The array shape, rank 1 to 3.
/// * `order` - The spline order, `0..=5`.
/// * `mode` - Boundary mode deciding the initial conditions of the recursion.
///
/// # Errors
///
/// Fails if the order or rank are unsupported or `data` does not match `shape`.
///
/// Example:
///
/// ```
/// use voxform_interp::{spline_filter, BoundaryMode};
///
/// // a constant signal is its own spline representation
/// let coeffs = spline_filter(&[2.0; 6], &[2, 3], 3, BoundaryMode::Mirror).unwrap();
/// assert!(coeffs.iter().all(|c| (c - 2.0).abs() < 1e-12));
/// ```
pub fn spline_filter(
    data: &[f64],
    shape: &[usize],
    order: usize,
    mode: BoundaryMode,
) -> Result<Vec<f64>, InterpolationError> {
    if order > MAX_ORDER {
        return Err(InterpolationError::InvalidOrder(order));
    }
    if shape.is_empty() || shape.len() > MAX_RANK {
        return Err(InterpolationError::InvalidRank(shape.len()));
    }
    let nvox = shape.iter().product::<usize>();
    if data.len() != nvox {
        return Err(InterpolationError::ShapeMismatch(data.len(), nvox));
    }

    let mut coeffs = data.to_vec();
    let poles = filter_poles(order);
    if poles.is_empty() {
        return Ok(coeffs);
    }

    let strides = strides_of(shape);
    for (axis, (&len, &stride)) in shape.iter().zip(strides.iter()).enumerate() {
        if len < 2 {
            continue;
        }
        log::trace!("spline_filter: axis {axis}, {len} samples per line");
        let mut line = vec![0.0; len];
        for start in (0..nvox).filter(|f| (f / stride) % len == 0) {
            for (k, v) in line.iter_mut().enumerate() {
                *v = coeffs[start + k * stride];
            }
            filter_line(&mut line, &poles, mode);
            for (k, v) in line.iter().enumerate() {
                coeffs[start + k * stride] = *v;
            }
        }
    }

    Ok(coeffs)
}

/// C-order strides of a shape.
pub(crate) fn strides_of(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::fold_index;
    use approx::assert_abs_diff_eq;

    // textbook recursion used as an oracle for the closed forms
    fn bspline_recursive(order: usize, x: f64) -> f64 {
        if order == 0 {
            return if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 };
        }
        let n = order as f64;
        let h = (n + 1.0) / 2.0;
        ((x + h) * bspline_recursive(order - 1, x + 0.5)
            + (h - x) * bspline_recursive(order - 1, x - 0.5))
            / n
    }

    #[test]
    fn test_bspline_closed_forms() {
        for order in 1..=MAX_ORDER {
            for step in -70..=70 {
                let x = step as f64 * 0.05;
                assert_abs_diff_eq!(
                    bspline(order, x),
                    bspline_recursive(order, x),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_weights_partition_of_unity() {
        for order in 0..=MAX_ORDER {
            for c in [0.0, 0.25, 0.5, 1.7, 3.999] {
                let (_, weights) = spline_weights(order, c);
                assert_abs_diff_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_weights_start() {
        assert_eq!(spline_weights(0, 1.6).0, 2);
        assert_eq!(spline_weights(1, 1.6).0, 1);
        assert_eq!(spline_weights(2, 1.6).0, 1);
        assert_eq!(spline_weights(3, 1.6).0, 0);
        assert_eq!(spline_weights(5, 1.6).0, -1);
    }

    #[test]
    fn test_filter_interpolates_samples() -> Result<(), InterpolationError> {
        // evaluating the spline at integer points must reproduce the samples
        let data = [1.0, 4.0, -2.0, 0.5, 3.0, 7.0, 2.0];
        for order in 2..=MAX_ORDER {
            for mode in [BoundaryMode::Mirror, BoundaryMode::Reflect] {
                let coeffs = spline_filter(&data, &[data.len()], order, mode)?;
                for (i, expected) in data.iter().enumerate() {
                    let (start, weights) = spline_weights(order, i as f64);
                    let value: f64 = (0..=order)
                        .map(|k| {
                            let idx = fold_index(start + k as i64, data.len(), mode);
                            weights[k] * coeffs[idx]
                        })
                        .sum();
                    assert_abs_diff_eq!(value, *expected, epsilon = 1e-9);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_filter_errors() {
        assert_eq!(
            spline_filter(&[0.0; 4], &[4], 6, BoundaryMode::Mirror),
            Err(InterpolationError::InvalidOrder(6))
        );
        assert_eq!(
            spline_filter(&[0.0; 4], &[1, 1, 2, 2], 3, BoundaryMode::Mirror),
            Err(InterpolationError::InvalidRank(4))
        );
        assert_eq!(
            spline_filter(&[0.0; 3], &[2, 2], 3, BoundaryMode::Mirror),
            Err(InterpolationError::ShapeMismatch(3, 4))
        );
    }

    #[test]
    fn test_strides() {
        assert_eq!(strides_of(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(strides_of(&[5]), vec![1]);
    }
}
