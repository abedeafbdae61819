use std::borrow::Cow;

use rayon::prelude::*;

use crate::{
    boundary::{fold_coordinate, fold_index},
    error::InterpolationError,
    options::ResampleOptions,
    spline::{spline_filter, spline_weights, strides_of},
    MAX_ORDER, MAX_RANK,
};

/// Spline coefficients ready to be evaluated at fractional positions.
struct Sampler<'a> {
    coeffs: Cow<'a, [f64]>,
    shape: &'a [usize],
    strides: Vec<usize>,
    options: &'a ResampleOptions,
}

impl<'a> Sampler<'a> {
    fn new(
        input: &'a [f64],
        shape: &'a [usize],
        options: &'a ResampleOptions,
    ) -> Result<Self, InterpolationError> {
        options.validate()?;
        if shape.is_empty() || shape.len() > MAX_RANK {
            return Err(InterpolationError::InvalidRank(shape.len()));
        }
        let nvox = shape.iter().product::<usize>();
        if input.len() != nvox {
            return Err(InterpolationError::ShapeMismatch(input.len(), nvox));
        }

        let coeffs = if options.prefilter && options.order > 1 {
            Cow::Owned(spline_filter(input, shape, options.order, options.mode)?)
        } else {
            Cow::Borrowed(input)
        };

        Ok(Self {
            coeffs,
            shape,
            strides: strides_of(shape),
            options,
        })
    }

    /// Interpolate at one position; only the first `rank` components are read.
    fn sample(&self, coord: &[f64]) -> f64 {
        let rank = self.shape.len();
        let order = self.options.order;
        let taps = order + 1;

        let mut offsets = [[0usize; MAX_ORDER + 1]; MAX_RANK];
        let mut weights = [[0.0f64; MAX_ORDER + 1]; MAX_RANK];
        for axis in 0..rank {
            let len = self.shape[axis];
            let Some(c) = fold_coordinate(coord[axis], len, self.options.mode) else {
                return self.options.cval;
            };
            let (start, w) = spline_weights(order, c);
            weights[axis] = w;
            for (k, offset) in offsets[axis].iter_mut().enumerate().take(taps) {
                let index = fold_index(start + k as i64, len, self.options.mode);
                *offset = index * self.strides[axis];
            }
        }

        // odometer over the taps^rank neighbourhood
        let mut counter = [0usize; MAX_RANK];
        let mut acc = 0.0;
        for _ in 0..taps.pow(rank as u32) {
            let mut offset = 0;
            let mut weight = 1.0;
            for axis in 0..rank {
                offset += offsets[axis][counter[axis]];
                weight *= weights[axis][counter[axis]];
            }
            acc += weight * self.coeffs[offset];

            for axis in (0..rank).rev() {
                counter[axis] += 1;
                if counter[axis] < taps {
                    break;
                }
                counter[axis] = 0;
            }
        }
        acc
    }
}

/// Interpolate an array at precomputed fractional coordinates.
///
/// # Arguments
///
/// * `input` - The samples, in C order.
/// * `shape` - The input shape, rank 1 to 3.
/// * `coordinates` - One position per output sample, in input index space. Only the
///   first `shape.len()` components of each position are used.
/// * `options` - Spline order, boundary mode, fill value and prefilter switch.
///
/// # Returns
///
/// One interpolated value per coordinate, in the same order.
///
/// # Errors
///
/// Fails if the order or rank are unsupported or `input` does not match `shape`.
///
/// Example:
///
/// ```
/// use voxform_interp::{map_coordinates, ResampleOptions};
///
/// let input = [0.0, 1.0, 2.0, 3.0];
/// let options = ResampleOptions::default().with_order(1);
/// let points = [[0.5, 0.5, 0.0], [5.0, 0.0, 0.0]];
/// let out = map_coordinates(&input, &[2, 2], &points, &options).unwrap();
/// assert_eq!(out, vec![1.5, 0.0]);
/// ```
pub fn map_coordinates(
    input: &[f64],
    shape: &[usize],
    coordinates: &[[f64; 3]],
    options: &ResampleOptions,
) -> Result<Vec<f64>, InterpolationError> {
    let sampler = Sampler::new(input, shape, options)?;
    log::debug!(
        "map_coordinates: {} points from {:?}, order {}, mode {}",
        coordinates.len(),
        shape,
        options.order,
        options.mode
    );

    Ok(coordinates
        .par_iter()
        .map(|coord| sampler.sample(coord))
        .collect())
}

/// Resample an array through a per-element inverse mapping.
///
/// For each output index, `mapping` writes the corresponding fractional position in
/// the input into its second argument; the input is then interpolated there.
///
/// # Arguments
///
/// * `input` - The samples, in C order.
/// * `shape` - The input shape, rank 1 to 3.
/// * `output_shape` - The shape of the result.
/// * `mapping` - Called once per output index, possibly from several threads.
/// * `options` - Spline order, boundary mode, fill value and prefilter switch.
///
/// # Errors
///
/// Fails on invalid options or shapes, and with the first error returned by `mapping`.
///
/// Example:
///
/// ```
/// use voxform_interp::{geometric_transform, InterpolationError, ResampleOptions};
///
/// let input = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
/// let options = ResampleOptions::default().with_order(0);
/// // flip the second axis
/// let out = geometric_transform(&input, &[2, 3], &[2, 3], |idx, coord| {
///     coord[0] = idx[0] as f64;
///     coord[1] = 2.0 - idx[1] as f64;
///     Ok::<_, InterpolationError>(())
/// }, &options).unwrap();
/// assert_eq!(out, vec![2.0, 1.0, 0.0, 5.0, 4.0, 3.0]);
/// ```
pub fn geometric_transform<F, E>(
    input: &[f64],
    shape: &[usize],
    output_shape: &[usize],
    mapping: F,
    options: &ResampleOptions,
) -> Result<Vec<f64>, E>
where
    F: Fn(&[usize], &mut [f64]) -> Result<(), E> + Sync,
    E: From<InterpolationError> + Send,
{
    let sampler = Sampler::new(input, shape, options)?;
    if output_shape.is_empty() || output_shape.len() > MAX_RANK {
        return Err(InterpolationError::InvalidRank(output_shape.len()).into());
    }

    let out_strides = strides_of(output_shape);
    let nout = output_shape.iter().product::<usize>();
    log::debug!(
        "geometric_transform: {:?} -> {:?}, order {}, mode {}",
        shape,
        output_shape,
        options.order,
        options.mode
    );

    (0..nout)
        .into_par_iter()
        .map(|flat| {
            let mut index = [0usize; MAX_RANK];
            for (axis, (&stride, &len)) in out_strides.iter().zip(output_shape).enumerate() {
                index[axis] = (flat / stride) % len;
            }
            let mut coord = [0.0f64; MAX_RANK];
            mapping(&index[..output_shape.len()], &mut coord[..shape.len()])?;
            Ok(sampler.sample(&coord))
        })
        .collect()
}
