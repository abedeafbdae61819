use crate::options::BoundaryMode;

/// Slack allowed around the valid range in constant mode, so grid points that only
/// miss the border by rounding still interpolate.
const CONSTANT_TOLERANCE: f64 = 1e-9;

/// Fold a fractional coordinate into the range covered by the input.
///
/// Returns `None` if the coordinate lies outside the input in constant mode.
pub(crate) fn fold_coordinate(c: f64, len: usize, mode: BoundaryMode) -> Option<f64> {
    let last = (len - 1) as f64;
    match mode {
        BoundaryMode::Constant => {
            if c < -CONSTANT_TOLERANCE || c > last + CONSTANT_TOLERANCE {
                None
            } else {
                Some(c.clamp(0.0, last))
            }
        }
        BoundaryMode::Nearest => Some(c.clamp(0.0, last)),
        BoundaryMode::Mirror => {
            if len == 1 {
                return Some(0.0);
            }
            let period = 2.0 * last;
            let c = c.rem_euclid(period);
            Some(if c > last { period - c } else { c })
        }
        BoundaryMode::Reflect => {
            let n = len as f64;
            let c = (c + 0.5).rem_euclid(2.0 * n);
            Some(if c > n { 2.0 * n - c } else { c } - 0.5)
        }
        BoundaryMode::Wrap => Some(c.rem_euclid(len as f64)),
    }
}

/// Map a (possibly out of range) integer tap position to a valid array index.
///
/// Constant mode mirrors taps: only the coordinate decides whether `cval` is used.
pub(crate) fn fold_index(i: i64, len: usize, mode: BoundaryMode) -> usize {
    let n = len as i64;
    if n == 1 {
        return 0;
    }
    if (0..n).contains(&i) {
        return i as usize;
    }
    let folded = match mode {
        BoundaryMode::Nearest => i.clamp(0, n - 1),
        BoundaryMode::Constant | BoundaryMode::Mirror => {
            let period = 2 * (n - 1);
            let i = i.rem_euclid(period);
            if i >= n {
                period - i
            } else {
                i
            }
        }
        BoundaryMode::Reflect => {
            let period = 2 * n;
            let i = i.rem_euclid(period);
            if i >= n {
                period - 1 - i
            } else {
                i
            }
        }
        BoundaryMode::Wrap => i.rem_euclid(n),
    };
    folded as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_index() {
        // d c b | a b c d | c b a
        let mirror: Vec<_> = (-3..7)
            .map(|i| fold_index(i, 4, BoundaryMode::Mirror))
            .collect();
        assert_eq!(mirror, vec![3, 2, 1, 0, 1, 2, 3, 2, 1, 0]);

        // d c b a | a b c d | d c b a
        let reflect: Vec<_> = (-4..8)
            .map(|i| fold_index(i, 4, BoundaryMode::Reflect))
            .collect();
        assert_eq!(reflect, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);

        let wrap: Vec<_> = (-2..6).map(|i| fold_index(i, 4, BoundaryMode::Wrap)).collect();
        assert_eq!(wrap, vec![2, 3, 0, 1, 2, 3, 0, 1]);

        let nearest: Vec<_> = (-2..6)
            .map(|i| fold_index(i, 4, BoundaryMode::Nearest))
            .collect();
        assert_eq!(nearest, vec![0, 0, 0, 1, 2, 3, 3, 3]);

        assert_eq!(fold_index(-5, 1, BoundaryMode::Reflect), 0);
    }

    #[test]
    fn test_fold_coordinate() {
        assert_eq!(fold_coordinate(-0.5, 4, BoundaryMode::Constant), None);
        assert_eq!(fold_coordinate(3.5, 4, BoundaryMode::Constant), None);
        assert_eq!(fold_coordinate(-1e-12, 4, BoundaryMode::Constant), Some(0.0));
        assert_eq!(fold_coordinate(-2.0, 4, BoundaryMode::Nearest), Some(0.0));
        assert_eq!(fold_coordinate(-1.0, 4, BoundaryMode::Mirror), Some(1.0));
        assert_eq!(fold_coordinate(4.0, 4, BoundaryMode::Mirror), Some(2.0));
        assert_eq!(fold_coordinate(-1.0, 4, BoundaryMode::Reflect), Some(0.0));
        assert_eq!(fold_coordinate(4.5, 4, BoundaryMode::Reflect), Some(2.5));
        assert_eq!(fold_coordinate(5.25, 4, BoundaryMode::Wrap), Some(1.25));
    }
}
