//! Euclidean distance transforms over boolean feature grids.
//!
//! Distances are in grid cell units. Feature cells have distance 0. A grid
//! without any feature cell yields `f32::INFINITY` everywhere.

use crate::types::{BoolGrid, DistanceGrid};
use ndarray::{Array2, Axis};

/// Stands in for "no feature on this line" in the squared-distance passes
const FAR: f64 = 1e20;

/// Exact Euclidean distance transform (Felzenszwalb & Huttenlocher).
///
/// Two separable passes over squared distances; each output is the square
/// root of an exact integer squared distance, so the result is identical
/// to [`distance_transform_brute_force`].
pub fn distance_transform(features: &BoolGrid) -> DistanceGrid {
    let (rows, cols) = features.dim();
    let feature_count = features.iter().filter(|&&f| f).count();
    log::debug!("Distance transform over {}x{} grid, {} feature pixels", rows, cols, feature_count);

    if feature_count == 0 {
        log::warn!("No feature pixels; all distances are infinite");
        return Array2::from_elem((rows, cols), f32::INFINITY);
    }

    let mut squared: Array2<f64> = features.mapv(|f| if f { 0.0 } else { FAR });

    // Columns first, then rows
    transform_lanes(&mut squared, Axis(1));
    transform_lanes(&mut squared, Axis(0));

    squared.mapv(|d2| if d2 >= FAR { f32::INFINITY } else { d2.sqrt() as f32 })
}

/// Run the 1-D transform on every lane obtained by iterating over `axis`
fn transform_lanes(grid: &mut Array2<f64>, axis: Axis) {
    #[cfg(feature = "parallel")]
    {
        use ndarray::parallel::prelude::*;
        grid.axis_iter_mut(axis)
            .into_par_iter()
            .for_each(|mut lane| {
                let output = squared_distance_1d(&lane.to_vec());
                lane.iter_mut().zip(output).for_each(|(v, d)| *v = d);
            });
    }

    #[cfg(not(feature = "parallel"))]
    for mut lane in grid.axis_iter_mut(axis) {
        let output = squared_distance_1d(&lane.to_vec());
        lane.iter_mut().zip(output).for_each(|(v, d)| *v = d);
    }
}

/// Lower envelope of parabolas: out[p] = min_q (p - q)^2 + f[q]
fn squared_distance_1d(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut out = vec![FAR; n];
    if n == 0 {
        return out;
    }

    let intersect = |q: usize, p: usize| -> f64 {
        ((f[q] + (q * q) as f64) - (f[p] + (p * p) as f64)) / (2.0 * (q as f64 - p as f64))
    };

    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        // z[0] is -inf, so k never drops below zero
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    let mut k = 0usize;
    for (p, slot) in out.iter_mut().enumerate() {
        while z[k + 1] < p as f64 {
            k += 1;
        }
        let q = v[k];
        let d = p as f64 - q as f64;
        *slot = d * d + f[q];
    }
    out
}

/// Reference implementation: minimum over every feature pixel's full
/// distance field. O(E * R * C).
pub fn distance_transform_brute_force(features: &BoolGrid) -> DistanceGrid {
    let (rows, cols) = features.dim();
    let sources: Vec<(usize, usize)> = features
        .indexed_iter()
        .filter(|&(_, &f)| f)
        .map(|(idx, _)| idx)
        .collect();

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        sources
            .iter()
            .map(|&(sr, sc)| {
                let dr = r.abs_diff(sr) as u64;
                let dc = c.abs_diff(sc) as u64;
                dr * dr + dc * dc
            })
            .min()
            .map(|d2| (d2 as f64).sqrt() as f32)
            .unwrap_or(f32::INFINITY)
    })
}
