//! Smoothing filters used to derive the "spline" of a chromatogram.
//!
//! All filters read a borrowed slice and write a trace of the same length,
//! either into a fresh vector ([`smooth`]) or into a caller provided
//! buffer (the `*_into` variants). The input is never modified.
//!
//! The kernel is picked once, through [`crate::ExtractionConfig::smoother`],
//! and threaded down to every call site.

use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

/// Polynomial order used by the Savitzky-Golay filter.
pub const SAVGOL_POLYNOMIAL_ORDER: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmootherKind {
    MovingAverage,
    #[default]
    Gaussian,
    SavitzkyGolay,
}

/// Smooths `values` with the requested kernel.
///
/// The window is clamped to `values.len() / 3`; a (clamped) window of
/// 1 or less returns an unmodified copy.
///
/// Example:
/// ```
/// use eicpeaks::smoothing::{smooth, SmootherKind};
///
/// let raw = vec![0.0, 1.0, 5.0, 1.0, 0.0];
/// // Too short to smooth with any window, comes back as-is.
/// assert_eq!(smooth(&raw, 10, SmootherKind::Gaussian), raw);
/// ```
pub fn smooth(values: &[f32], window: usize, kind: SmootherKind) -> Vec<f32> {
    let mut out = Vec::with_capacity(values.len());
    smooth_into(values, window, kind, &mut out);
    out
}

/// Same as [`smooth`] but writes into `out`, replacing its contents.
pub fn smooth_into(values: &[f32], window: usize, kind: SmootherKind, out: &mut Vec<f32>) {
    let window = window.min(values.len() / 3);
    if window <= 1 {
        out.clear();
        out.extend_from_slice(values);
        return;
    }

    match kind {
        SmootherKind::MovingAverage => moving_average_into(values, window, out),
        SmootherKind::Gaussian => gaussian_smooth_into(values, window, out),
        SmootherKind::SavitzkyGolay => {
            savitzky_golay_into(values, window, SAVGOL_POLYNOMIAL_ORDER, out)
        }
    }
}

/// Centered moving average over `2 * half_window + 1` points.
///
/// Near the edges the average only runs over the points that exist.
pub fn moving_average_into(values: &[f32], half_window: usize, out: &mut Vec<f32>) {
    out.clear();
    if half_window == 0 || values.is_empty() {
        out.extend_from_slice(values);
        return;
    }

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0f64);
    let mut running = 0.0f64;
    for v in values {
        running += *v as f64;
        prefix.push(running);
    }

    out.extend((0..values.len()).map(|i| {
        let start = i.saturating_sub(half_window);
        let end = (i + half_window + 1).min(values.len());
        ((prefix[end] - prefix[start]) / (end - start) as f64) as f32
    }));
}

/// Gaussian-weighted smoothing over a `window` sized neighborhood.
///
/// The kernel has radius `window / 2` and a sigma of half the radius, so
/// the outermost weights sit two standard deviations away from the center.
/// Weights falling outside the data are dropped and the rest renormalized.
pub fn gaussian_smooth_into(values: &[f32], window: usize, out: &mut Vec<f32>) {
    out.clear();
    if window <= 1 || values.len() < 2 {
        out.extend_from_slice(values);
        return;
    }

    let kernel_radius = (window / 2).max(1);
    let sigma = (kernel_radius as f32 / 2.0).max(0.5);
    let kernel: Vec<f32> = (0..=2 * kernel_radius)
        .map(|kernel_pos| {
            let distance_from_center = kernel_pos as f32 - kernel_radius as f32;
            (-0.5 * (distance_from_center / sigma).powi(2)).exp()
        })
        .collect();

    for point_idx in 0..values.len() {
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for (kernel_offset, weight) in kernel.iter().enumerate() {
            let Some(data_idx) = (point_idx + kernel_offset).checked_sub(kernel_radius) else {
                continue;
            };
            if data_idx < values.len() {
                weighted_sum += values[data_idx] * weight;
                weight_total += weight;
            }
        }

        out.push(weighted_sum / weight_total);
    }
}

/// Savitzky-Golay smoothing with `half_window` points on each side.
///
/// Coefficients come from a least squares polynomial fit of the requested
/// order (reduced when the window cannot support it). Points closer than
/// `half_window` to either edge are evaluated on the fit of the first/last
/// full window instead of being padded.
pub fn savitzky_golay_into(values: &[f32], half_window: usize, order: usize, out: &mut Vec<f32>) {
    out.clear();
    let window_len = 2 * half_window + 1;
    if half_window == 0 || values.len() < window_len {
        out.extend_from_slice(values);
        return;
    }

    let Some(coefficients) = savitzky_golay_coefficients(half_window, order.min(2 * half_window))
    else {
        warn!(
            "Singular Savitzky-Golay system for half window {}, returning unsmoothed data",
            half_window
        );
        out.extend_from_slice(values);
        return;
    };

    let n = values.len();
    out.extend((0..n).map(|i| {
        let start = i.saturating_sub(half_window).min(n - window_len);
        // Row `half_window` is the centered fit, the others evaluate the
        // same polynomial off-center for the edges.
        let row = &coefficients[i - start];
        row.iter()
            .zip(values[start..start + window_len].iter())
            .map(|(c, v)| c * (*v as f64))
            .sum::<f64>() as f32
    }));
}

/// Coefficient table for a `2 * half_window + 1` window.
///
/// Row `r` holds the weights that evaluate the fitted polynomial at window
/// position `r`, column `j` the weight of the `j`-th point of the window.
fn savitzky_golay_coefficients(half_window: usize, order: usize) -> Option<Vec<Vec<f64>>> {
    let window_len = 2 * half_window + 1;
    let n_terms = order + 1;
    // Positions are scaled to [-1, 1] to keep the normal equations well conditioned.
    let scale = half_window as f64;
    let positions: Vec<f64> = (0..window_len)
        .map(|r| (r as f64 - half_window as f64) / scale)
        .collect();

    let design: Vec<Vec<f64>> = positions
        .iter()
        .map(|x| (0..n_terms).map(|k| x.powi(k as i32)).collect())
        .collect();

    let mut normal = vec![vec![0.0f64; n_terms]; n_terms];
    for row in design.iter() {
        for a in 0..n_terms {
            for b in 0..n_terms {
                normal[a][b] += row[a] * row[b];
            }
        }
    }

    let mut table = Vec::with_capacity(window_len);
    for t in positions.iter() {
        let rhs: Vec<f64> = (0..n_terms).map(|k| t.powi(k as i32)).collect();
        let z = solve_linear_system(normal.clone(), rhs)?;
        let row: Vec<f64> = design
            .iter()
            .map(|d| d.iter().zip(z.iter()).map(|(a, b)| a * b).sum())
            .collect();
        table.push(row);
    }
    Some(table)
}

/// Gaussian elimination with partial pivoting.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&x, &y| a[x][col].abs().total_cmp(&a[y][col].abs()))?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
