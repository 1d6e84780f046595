use crate::smoothing::gaussian_smooth_into;
use serde::Serialize;
use tracing::warn;

pub const DEFAULT_BASELINE_SMOOTHING_WINDOW: usize = 5;
pub const DEFAULT_BASELINE_QUANTILE: u32 = 40;

/// Robust lower envelope of an intensity trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub values: Vec<f32>,
    /// Number of observations whose intensity is strictly above the baseline.
    pub above_baseline_count: usize,
    /// Clip ceiling taken from the intensity quantile.
    pub qcut: f32,
}

/// Allocates a zeroed buffer of `n` floats, `None` if the allocator refuses.
pub(crate) fn try_alloc_buffer(n: usize, context: &str) -> Option<Vec<f32>> {
    let mut buffer = Vec::new();
    match buffer.try_reserve_exact(n) {
        Ok(()) => {
            buffer.resize(n, 0.0);
            Some(buffer)
        }
        Err(e) => {
            warn!("Unable to allocate {} floats for {}: {}", n, context, e);
            None
        }
    }
}

/// Value at rank `floor(n * quantile / 101)` of the sorted intensities.
pub fn quantile_cut(intensity: &[f32], quantile: u32) -> Option<f32> {
    if intensity.is_empty() {
        return None;
    }
    let mut sorted = intensity.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let cut_fraction = quantile as f32 / 101.0;
    let pos = ((sorted.len() as f32 * cut_fraction) as usize).min(sorted.len() - 1);
    Some(sorted[pos])
}

/// Estimates the baseline of `intensity`.
///
/// Every point is clipped to the `quantile` cut and the clipped trace is
/// smoothed with the gaussian kernel over `smoothing_window` points.
/// Returns `None` on empty input or when the buffer cannot be allocated;
/// callers treat that as "no baseline".
pub fn estimate(intensity: &[f32], smoothing_window: usize, quantile: u32) -> Option<Baseline> {
    let qcut = quantile_cut(intensity, quantile)?;
    let mut raw = try_alloc_buffer(intensity.len(), "clipped intensities")?;
    for (b, x) in raw.iter_mut().zip(intensity.iter()) {
        *b = x.min(qcut);
    }

    let mut values = try_alloc_buffer(intensity.len(), "baseline")?;
    gaussian_smooth_into(&raw, smoothing_window, &mut values);
    // Rounding in the convolution must not lift the baseline past the cut.
    for v in values.iter_mut() {
        *v = v.min(qcut);
    }

    let above_baseline_count = intensity
        .iter()
        .zip(values.iter())
        .filter(|(x, b)| x > b)
        .count();

    Some(Baseline {
        values,
        above_baseline_count,
        qcut,
    })
}
