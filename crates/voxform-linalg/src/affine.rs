use crate::error::LinalgError;

/// A 4x4 homogeneous affine matrix stored row-major.
///
/// The upper-left 3x3 block holds the linear part (rotation, scale, shear) and the
/// last column holds the translation. The last row is expected to be `[0, 0, 0, 1]`.
pub type Affine4 = [[f64; 4]; 4];

/// The 4x4 identity matrix.
pub const IDENTITY: Affine4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Multiply two 4x4 matrices, `a · b`.
///
/// Example:
///
/// ```
/// use voxform_linalg::{matmul, IDENTITY};
///
/// let m = [
///     [2.0, 0.0, 0.0, 1.0],
///     [0.0, 2.0, 0.0, 2.0],
///     [0.0, 0.0, 2.0, 3.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// assert_eq!(matmul(&IDENTITY, &m), m);
/// ```
pub fn matmul(a: &Affine4, b: &Affine4) -> Affine4 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, val) in row.iter_mut().enumerate() {
            *val = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Invert a 4x4 matrix with Gauss-Jordan elimination and partial pivoting.
///
/// # Errors
///
/// Returns [`LinalgError::SingularMatrix`] if a pivot vanishes relative to the
/// magnitude of the matrix entries, and [`LinalgError::NonFinite`] if the matrix
/// holds NaN or infinite values.
///
/// Example:
///
/// ```
/// use voxform_linalg::{invert, IDENTITY};
///
/// let m = [
///     [2.0, 0.0, 0.0, -10.0],
///     [0.0, 4.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0, 5.0],
///     [0.0, 0.0, 0.0, 1.0],
/// ];
/// let inv = invert(&m).unwrap();
/// assert_eq!(inv[0], [0.5, 0.0, 0.0, 5.0]);
/// assert_eq!(invert(&IDENTITY).unwrap(), IDENTITY);
/// ```
pub fn invert(m: &Affine4) -> Result<Affine4, LinalgError> {
    if m.iter().flatten().any(|v| !v.is_finite()) {
        return Err(LinalgError::NonFinite);
    }

    let scale = m.iter().flatten().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = 4.0 * f64::EPSILON * scale;

    let mut a = *m;
    let mut inv = IDENTITY;

    for col in 0..4 {
        // pick the row with the largest magnitude in this column
        let (pivot_row, pivot) = (col..4)
            .map(|r| (r, a[r][col].abs()))
            .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if pivot <= tolerance {
            return Err(LinalgError::SingularMatrix { column: col, pivot });
        }

        a.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let p = a[col][col];
        for j in 0..4 {
            a[col][j] /= p;
            inv[col][j] /= p;
        }

        for r in 0..4 {
            if r == col {
                continue;
            }
            let factor = a[r][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..4 {
                a[r][j] -= factor * a[col][j];
                inv[r][j] -= factor * inv[col][j];
            }
        }
    }

    Ok(inv)
}

/// Map a spatial point through a homogeneous matrix.
///
/// The point is extended with a homogeneous `1`, multiplied by `m` and truncated
/// back to its three spatial components.
pub fn transform_point(m: &Affine4, p: &[f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for (i, val) in out.iter_mut().enumerate() {
        *val = m[i][0] * p[0] + m[i][1] * p[1] + m[i][2] * p[2] + m[i][3];
    }
    out
}

/// Map a batch of spatial points through a homogeneous matrix.
///
/// Example:
///
/// ```
/// use voxform_linalg::{transform_points, IDENTITY};
///
/// let points = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// assert_eq!(transform_points(&IDENTITY, &points), points);
/// ```
pub fn transform_points(m: &Affine4, points: &[[f64; 3]]) -> Vec<[f64; 3]> {
    points.iter().map(|p| transform_point(m, p)).collect()
}

/// Element-wise closeness test, `|a - b| <= atol + rtol * |b|`.
pub fn allclose(a: &Affine4, b: &Affine4, rtol: f64, atol: f64) -> bool {
    a.iter()
        .flatten()
        .zip(b.iter().flatten())
        .all(|(x, y)| (x - y).abs() <= atol + rtol * y.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn random_affine(rng: &mut StdRng) -> Affine4 {
        let mut m = IDENTITY;
        for row in m.iter_mut().take(3) {
            for val in row.iter_mut() {
                *val = rng.random_range(-5.0..5.0);
            }
        }
        // keep the linear block well conditioned
        for (i, row) in m.iter_mut().enumerate().take(3) {
            row[i] += 20.0;
        }
        m
    }

    #[test]
    fn test_invert_roundtrip() -> Result<(), LinalgError> {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let m = random_affine(&mut rng);
            let inv = invert(&m)?;
            let prod = matmul(&m, &inv);
            for i in 0..4 {
                for j in 0..4 {
                    assert_abs_diff_eq!(prod[i][j], IDENTITY[i][j], epsilon = 1e-12);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_invert_permutation() -> Result<(), LinalgError> {
        // zero on the leading diagonal forces a row swap
        let m = [
            [0.0, 1.0, 0.0, 3.0],
            [1.0, 0.0, 0.0, -2.0],
            [0.0, 0.0, -1.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let inv = invert(&m)?;
        assert_eq!(transform_point(&inv, &transform_point(&m, &[1.0, 2.0, 3.0])), [1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_invert_singular() {
        let m = [
            [1.0, 2.0, 0.0, 0.0],
            [2.0, 4.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        assert!(matches!(
            invert(&m),
            Err(LinalgError::SingularMatrix { .. })
        ));

        let mut zero = IDENTITY;
        zero[2][2] = 0.0;
        assert!(invert(&zero).is_err());
    }

    #[test]
    fn test_invert_non_finite() {
        let mut m = IDENTITY;
        m[0][3] = f64::NAN;
        assert_eq!(invert(&m), Err(LinalgError::NonFinite));
    }

    #[test]
    fn test_transform_point_translation() {
        let mut m = IDENTITY;
        m[0][3] = 1.0;
        m[1][3] = -2.0;
        m[2][3] = 0.5;
        assert_eq!(transform_point(&m, &[0.0, 0.0, 0.0]), [1.0, -2.0, 0.5]);
    }

    #[test]
    fn test_allclose() {
        let mut b = IDENTITY;
        b[0][3] = 1e-6;
        assert!(allclose(&IDENTITY, &b, 1e-5, 1e-5));
        b[0][3] = 1e-4;
        assert!(!allclose(&IDENTITY, &b, 1e-5, 1e-5));
        // relative part scales with the magnitude of the entry
        let mut c = IDENTITY;
        c[0][0] = 1000.0;
        let mut d = c;
        d[0][0] = 1000.005;
        assert!(allclose(&c, &d, 1e-5, 1e-5));
    }
}
