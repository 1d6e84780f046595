//! Quality check of how gaussian a peak looks.

/// Sigma stored on peaks that were never fit.
pub const UNFIT_SIGMA: f32 = 0.0;
/// R² stored on peaks that were never fit. Low enough that they rank poorly.
pub const UNFIT_R2: f32 = 0.03;

const MIN_SIGMA: f64 = 0.1;
const SIGMA_GROWTH: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianFit {
    /// Width of the best gaussian, in observations.
    pub sigma: f32,
    /// Coefficient of determination of the best gaussian, in `[0, 1]`.
    pub r2: f32,
}

impl Default for GaussianFit {
    fn default() -> Self {
        Self {
            sigma: UNFIT_SIGMA,
            r2: UNFIT_R2,
        }
    }
}

/// Fits `exp(-x^2 / 2 sigma^2)` centered on the middle of `values`.
///
/// The observed values are normalized by their maximum and sigma is
/// searched on a geometric grid. Returns `None` for inputs that cannot be
/// fit (fewer than 3 points or a non-positive maximum).
pub fn fit_gaussian(values: &[f32]) -> Option<GaussianFit> {
    if values.len() < 3 {
        return None;
    }
    let max = values.iter().copied().fold(f32::MIN, f32::max);
    if !(max > 0.0) {
        return None;
    }

    let observed: Vec<f64> = values.iter().map(|v| (*v / max) as f64).collect();
    let center = (values.len() / 2) as f64;
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();

    let max_sigma = values.len() as f64;
    let mut sigma = MIN_SIGMA;
    let mut best_sigma = sigma;
    let mut best_ss_res = f64::INFINITY;
    while sigma <= max_sigma {
        let ss_res: f64 = observed
            .iter()
            .enumerate()
            .map(|(i, y)| {
                let x = i as f64 - center;
                let expected = (-(x * x) / (2.0 * sigma * sigma)).exp();
                (expected - y).powi(2)
            })
            .sum();
        if ss_res < best_ss_res {
            best_ss_res = ss_res;
            best_sigma = sigma;
        }
        sigma *= SIGMA_GROWTH;
    }

    let r2 = if ss_tot > 0.0 {
        (1.0 - best_ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Some(GaussianFit {
        sigma: best_sigma as f32,
        r2: r2 as f32,
    })
}
