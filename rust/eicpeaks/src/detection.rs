//! Peak picking on a chromatogram: local maxima of the spline, boundary
//! search, per-peak statistics and ranking.

use crate::config::ExtractionConfig;
use crate::gaussian_fit::{
    GaussianFit,
    fit_gaussian,
};
use crate::models::chromatogram::Chromatogram;
use crate::models::peak::Peak;
use crate::shape::{
    FALLING,
    RISING,
    ShapeCode,
};
use crate::utils::stats::Summary;

/// Relative step change above which a walk counts as climbing.
const MIN_RELATIVE_RISE: f32 = 0.01;
/// Consecutive climbing steps that stop a boundary walk.
const MAX_CLIMBING_STEPS: usize = 2;
/// Walks stop once the spline drops under this fraction of the apex.
const MIN_APEX_FRACTION: f32 = 0.01;
/// Floor of the signal/baseline denominator.
const MIN_BASELINE_LEVEL: f32 = 10.0;
const MIN_WIDTH_FOR_SYMMETRY: usize = 5;
const MIN_GAUSSIAN_HALF_WINDOW: usize = 3;

/// Indices of the local maxima of `spline`, left to right.
///
/// Strict maxima are reported as is. A rising plateau is reported at its
/// last index when it is followed by a fall, and skipped when followed by
/// a further rise.
pub fn find_local_maxima(spline: &[f32]) -> Vec<usize> {
    let n = spline.len();
    let mut out = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if spline[i] > spline[i - 1] && spline[i] > spline[i + 1] {
            out.push(i);
        } else if spline[i] > spline[i - 1] && spline[i] == spline[i + 1] {
            let high_point = spline[i];
            while i + 2 < n {
                i += 1;
                if spline[i + 1] == high_point {
                    continue;
                }
                if spline[i + 1] < high_point {
                    out.push(i);
                }
                break;
            }
        }
        i += 1;
    }
    out
}

impl Chromatogram {
    /// Smooths the trace, seeds a peak at every local maximum of the spline
    /// and computes bounds, statistics and ranks for all of them.
    ///
    /// Replaces any previously detected peaks.
    pub fn detect_peaks(&mut self, config: &ExtractionConfig) -> &[Peak] {
        self.peaks.clear();
        if self.is_empty() {
            return &self.peaks;
        }

        self.compute_spline(config.smoothing_window, config.smoother);
        let Some(spline) = self.spline() else {
            return &self.peaks;
        };
        for pos in find_local_maxima(spline) {
            self.add_peak(pos);
        }

        self.rank_peaks(config);
        &self.peaks
    }

    /// Computes bounds and statistics of every peak and assigns ranks.
    ///
    /// Peaks are stably sorted by fractional area, largest first, and
    /// `peak_rank` is the position in that order. The spline and the baseline
    /// are computed first when missing, bounds cannot be searched without them.
    pub fn rank_peaks(&mut self, config: &ExtractionConfig) {
        if self.spline().is_none() {
            self.compute_spline(config.smoothing_window, config.smoother);
        }
        if self.baseline().is_none() {
            self.compute_baseline(config.baseline_smoothing_window, config.baseline_quantile);
        }

        let mut peaks = std::mem::take(&mut self.peaks);
        for peak in peaks.iter_mut() {
            self.find_peak_bounds(peak);
            self.compute_peak_details(peak);
        }

        peaks.sort_by(Peak::cmp_area_desc);
        for (rank, peak) in peaks.iter_mut().enumerate() {
            peak.peak_rank = rank;
        }
        self.peaks = peaks;
    }

    /// Walks outwards from the apex of `peak` and sets `min_pos`/`max_pos`.
    ///
    /// Each walk keeps the lowest raw-intensity point seen so far as the
    /// boundary and stops when the spline reaches zero, sinks to the
    /// baseline, drops under 1% of the apex or climbs for two consecutive
    /// steps. The apex then moves to the highest point with an m/z inside the
    /// bounds and zero-intensity shoulders are trimmed.
    ///
    /// No-op without a spline and a baseline.
    pub fn find_peak_bounds(&self, peak: &mut Peak) {
        let n = self.len();
        let (Some(spline), Some(baseline)) = (self.spline(), self.baseline()) else {
            return;
        };
        if n == 0 || peak.pos >= n {
            return;
        }
        let baseline = &baseline.values;
        let apex = peak.pos;

        let mut lb =
            self.walk_bound(spline, baseline, apex, (0..apex).rev(), apex.saturating_sub(1));
        let mut rb = self.walk_bound(spline, baseline, apex, (apex + 1)..n, (apex + 1).min(n - 1));

        let mut pos = apex;
        for k in lb..=rb {
            if self.intensity[k] > self.intensity[pos] && self.mz[k] > 0.0 {
                pos = k;
            }
        }

        // Keeps the zero point right next to the signal as the bound.
        for k in lb..pos {
            if self.intensity[k] > 0.0 {
                break;
            }
            lb = k;
        }
        for k in ((pos + 1)..=rb).rev() {
            if self.intensity[k] > 0.0 {
                break;
            }
            rb = k;
        }

        if lb == pos && pos > 0 {
            lb = pos - 1;
        }
        if rb == pos && pos + 1 < n {
            rb = pos + 1;
        }

        peak.pos = pos;
        peak.min_pos = lb;
        peak.max_pos = rb;
    }

    fn walk_bound(
        &self,
        spline: &[f32],
        baseline: &[f32],
        apex: usize,
        steps: impl Iterator<Item = usize>,
        start_bound: usize,
    ) -> usize {
        let apex_value = spline[apex];
        let mut bound = start_bound;
        let mut last_value = apex_value;
        let mut climbing_steps = 0;

        for i in steps {
            let rel_slope = if last_value != 0.0 {
                (spline[i] - last_value) / last_value
            } else {
                0.0
            };
            if rel_slope > MIN_RELATIVE_RISE {
                climbing_steps += 1;
            } else {
                climbing_steps = 0;
            }

            if self.intensity[i] <= self.intensity[bound] {
                bound = i;
            }

            if spline[i] == 0.0
                || spline[i] <= baseline[i]
                || spline[i] <= apex_value * MIN_APEX_FRACTION
                || climbing_steps >= MAX_CLIMBING_STEPS
            {
                break;
            }
            last_value = spline[i];
        }
        bound
    }

    /// Fills in areas, intensities, m/z aggregates, retention times, width,
    /// symmetry and the gaussian fit of `peak` from the observations within
    /// its bounds.
    ///
    /// No-op without a baseline or with bounds that do not contain the apex.
    pub fn compute_peak_details(&self, peak: &mut Peak) {
        let n = self.len();
        let Some(baseline) = self.baseline() else {
            return;
        };
        if n == 0 || peak.pos >= n {
            return;
        }
        peak.min_pos = peak.min_pos.min(n - 1);
        peak.max_pos = peak.max_pos.min(n - 1);
        if peak.min_pos > peak.pos || peak.pos > peak.max_pos {
            return;
        }
        let above_baseline_count = baseline.above_baseline_count;
        let baseline = &baseline.values;

        if self.is_blank() {
            peak.from_blank_sample = true;
        }

        peak.peak_intensity = self.intensity[peak.pos];
        peak.no_noise_obs = 0;
        peak.peak_area = 0.0;
        let mut baseline_area = 0.0;
        let mut observed_mzs = Vec::with_capacity(peak.max_pos - peak.min_pos + 1);
        let mut shape = ShapeCode::with_capacity(peak.max_pos - peak.min_pos + 1);

        let mut last_value = self.intensity[peak.min_pos];
        for j in peak.min_pos..=peak.max_pos {
            let intensity = self.intensity[j];
            peak.peak_area += intensity;
            baseline_area += baseline[j];
            if intensity > baseline[j] {
                peak.no_noise_obs += 1;
            }
            if peak.peak_intensity < intensity {
                peak.peak_intensity = intensity;
                peak.pos = j;
            }
            if self.mz[j] > 0.0 {
                observed_mzs.push(self.mz[j]);
            }
            shape.push_observation(intensity, baseline[j], last_value);
            last_value = intensity;
        }

        peak.width = self.peak_width(peak);

        if !self.rt.is_empty() {
            peak.rt = self.rt[peak.pos];
            peak.rt_min = self.rt[peak.min_pos];
            peak.rt_max = self.rt[peak.max_pos];
        }
        if !self.scans.is_empty() {
            peak.scan = self.scans[peak.pos];
            peak.min_scan = self.scans[peak.min_pos];
            peak.max_scan = self.scans[peak.max_pos];
        }

        let mut top_count = 1;
        peak.peak_area_top = self.intensity[peak.pos];
        if peak.pos > peak.min_pos {
            peak.peak_area_top += self.intensity[peak.pos - 1];
            top_count += 1;
        }
        if peak.pos < peak.max_pos {
            peak.peak_area_top += self.intensity[peak.pos + 1];
            top_count += 1;
        }
        peak.peak_area_top /= top_count as f32;

        let max_baseline = baseline[peak.pos]
            .max(MIN_BASELINE_LEVEL)
            .max(self.intensity[peak.min_pos].max(self.intensity[peak.max_pos]));
        peak.peak_mz = self.mz[peak.pos];
        peak.peak_baseline_level = baseline[peak.pos];
        peak.no_noise_fraction = peak.no_noise_obs as f32 / (above_baseline_count + 1) as f32;
        peak.peak_area_corrected = peak.peak_area - baseline_area;
        peak.peak_area_fractional = peak.peak_area_corrected / (self.total_intensity + 1.0);
        peak.signal_baseline_ratio = peak.peak_intensity / max_baseline;

        match Summary::from_values(&observed_mzs) {
            Some(summary) => {
                peak.median_mz = summary.median;
                peak.base_mz = summary.mean;
                peak.mz_min = summary.min;
                peak.mz_max = summary.max;
            }
            None => peak.median_mz = 0.0,
        }
        if peak.median_mz == 0.0 {
            peak.median_mz = peak.peak_mz;
        }

        if peak.width >= MIN_WIDTH_FOR_SYMMETRY {
            peak.symmetry = shape.longest_symmetry(RISING, FALLING);
        }
        self.check_gaussian_fit(peak);
    }

    /// One plus the above-baseline observations directly left and right of
    /// the apex, not counting the bounds themselves. 0 without a baseline.
    pub fn peak_width(&self, peak: &Peak) -> usize {
        let Some(baseline) = self.baseline() else {
            return 0;
        };
        let baseline = &baseline.values;
        if peak.pos >= self.len() {
            return 0;
        }
        let max_pos = peak.max_pos.min(self.len() - 1);

        let left = ((peak.min_pos + 1)..peak.pos)
            .rev()
            .take_while(|&i| self.intensity[i] > baseline[i])
            .count();
        let right = ((peak.pos + 1)..max_pos)
            .take_while(|&j| self.intensity[j] > baseline[j])
            .count();

        1 + left + right
    }

    /// Fits a gaussian to the raw intensities of the largest window
    /// symmetric around the apex that fits in the bounds.
    ///
    /// Peaks with fewer than 3 points on either side, or with an apex outside
    /// the chromatogram, keep the unfit defaults.
    pub fn check_gaussian_fit(&self, peak: &mut Peak) {
        let fit = GaussianFit::default();
        peak.gauss_fit_sigma = fit.sigma;
        peak.gauss_fit_r2 = fit.r2;

        let n = self.len();
        if n == 0 || peak.pos >= n {
            return;
        }
        let min_pos = peak.min_pos.min(n - 1);
        let max_pos = peak.max_pos.min(n - 1);
        if peak.pos < min_pos || max_pos < peak.pos {
            return;
        }
        let left = peak.pos - min_pos;
        let right = max_pos - peak.pos;
        if left == 0 || right == 0 {
            return;
        }
        let moves = left.min(right);
        if moves < MIN_GAUSSIAN_HALF_WINDOW {
            return;
        }

        let start = peak.pos - moves;
        let end = peak.pos + moves;
        if let Some(fit) = fit_gaussian(&self.intensity[start..=end]) {
            peak.gauss_fit_sigma = fit.sigma;
            peak.gauss_fit_r2 = fit.r2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::Baseline;
    use crate::models::peak::ChromatogramId;
    use crate::smoothing::SmootherKind;

    fn chrom_from(intensity: Vec<f32>) -> Chromatogram {
        let n = intensity.len();
        Chromatogram::try_new(
            ChromatogramId(0),
            (0..n).map(|x| x as f32 * 0.1).collect(),
            intensity,
            vec![250.0; n],
            (0..n as u32).collect(),
        )
        .unwrap()
    }

    fn unsmoothed() -> ExtractionConfig {
        ExtractionConfig {
            smoothing_window: 1,
            ..ExtractionConfig::default()
        }
    }

    fn flat_baseline(n: usize, level: f32) -> Baseline {
        Baseline {
            values: vec![level; n],
            above_baseline_count: 0,
            qcut: level,
        }
    }

    #[test]
    fn test_local_maxima() {
        assert_eq!(find_local_maxima(&[0.0, 1.0, 5.0, 1.0, 0.0]), vec![2]);
        assert_eq!(find_local_maxima(&[0.0, 3.0, 5.0, 5.0, 5.0, 2.0, 0.0]), vec![4]);
        // Plateau followed by a rise is absorbed into the next maximum.
        assert_eq!(find_local_maxima(&[0.0, 3.0, 3.0, 5.0, 1.0]), vec![3]);
        // Plateau running into the end is not a peak.
        assert!(find_local_maxima(&[0.0, 3.0, 3.0, 3.0]).is_empty());
        assert_eq!(find_local_maxima(&[0.0, 4.0, 0.0, 6.0, 0.0]), vec![1, 3]);
        assert!(find_local_maxima(&[]).is_empty());
        assert!(find_local_maxima(&[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_detect_single_peak() {
        let mut c = chrom_from(vec![0.0, 1.0, 5.0, 1.0, 0.0]);
        let peaks = c.detect_peaks(&unsmoothed());
        assert_eq!(peaks.len(), 1);
        let peak = &peaks[0];
        assert_eq!(peak.pos, 2);
        assert_eq!(peak.min_pos, 0);
        assert_eq!(peak.max_pos, 4);
        assert_eq!(peak.peak_intensity, 5.0);
        assert_eq!(peak.peak_area, 7.0);
        assert!((peak.rt - 0.2).abs() < 1e-6);
        assert_eq!(peak.scan, 2);
        assert_eq!(peak.peak_mz, 250.0);
        assert_eq!(peak.median_mz, 250.0);
        assert_eq!(peak.peak_rank, 0);
        assert!(peak.peak_area >= peak.peak_area_corrected);
        // apex + both neighbors
        assert!((peak.peak_area_top - 7.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_detect_plateau() {
        let mut c = chrom_from(vec![0.0, 3.0, 5.0, 5.0, 5.0, 2.0, 0.0]);
        let peaks = c.detect_peaks(&unsmoothed());
        assert_eq!(peaks.len(), 1);
        assert!(peaks[0].min_pos <= peaks[0].pos && peaks[0].pos <= peaks[0].max_pos);
    }

    #[test]
    fn test_bounds_stop_at_neighbor_shoulder() {
        // Two peaks sharing a valley: neither walk climbs into the other one.
        let intensity = vec![
            0.0, 10.0, 50.0, 100.0, 50.0, 20.0, 15.0, 40.0, 90.0, 200.0, 90.0, 30.0, 0.0,
        ];
        let n = intensity.len();
        let mut c = chrom_from(intensity);
        c.compute_spline(1, SmootherKind::Gaussian);
        c.replace_baseline(Some(flat_baseline(n, 1.0)));

        let mut first = Peak::new(c.id, 3);
        c.find_peak_bounds(&mut first);
        assert_eq!(first.pos, 3);
        assert_eq!(first.min_pos, 0);
        assert!(first.max_pos <= 7, "{:?}", first);

        let mut second = Peak::new(c.id, 9);
        c.find_peak_bounds(&mut second);
        assert_eq!(second.pos, 9);
        assert!(second.min_pos >= 5, "{:?}", second);
        assert_eq!(second.max_pos, 12);
    }

    #[test]
    fn test_right_walk_uses_its_own_baseline() {
        // The left walk stops at index 1 where the baseline is high. The right
        // walk must compare against the baseline on its own side, which is low,
        // and reach the end of the trace. Comparing the right walk against the
        // baseline where the left walk stopped (50.0) would end it at index 6,
        // the first point with a spline under 50.
        let intensity = vec![0.0, 30.0, 60.0, 100.0, 80.0, 60.0, 40.0, 20.0, 5.0];
        let n = intensity.len();
        let mut c = chrom_from(intensity);
        c.compute_spline(1, SmootherKind::Gaussian);
        let mut values = vec![1.0; n];
        values[0] = 50.0;
        values[1] = 50.0;
        c.replace_baseline(Some(Baseline {
            values,
            above_baseline_count: 0,
            qcut: 50.0,
        }));

        let mut peak = Peak::new(c.id, 3);
        c.find_peak_bounds(&mut peak);
        assert_eq!(peak.min_pos, 1);
        assert_eq!(peak.max_pos, 8);
        assert_ne!(peak.max_pos, 6);
    }

    #[test]
    fn test_gaussian_fit_out_of_range_peak_keeps_defaults() {
        let intensity: Vec<f32> = (0..200)
            .map(|i| 100.0 * (-((i as f32 - 100.0) / 8.0).powi(2) / 2.0).exp())
            .collect();
        let c = chrom_from(intensity);
        let mut peak = Peak::new(c.id, 300);
        peak.min_pos = 290;
        peak.max_pos = 310;
        c.check_gaussian_fit(&mut peak);
        assert_eq!(peak.gauss_fit_sigma, 0.0);
        assert_eq!(peak.gauss_fit_r2, 0.03);

        // Bounds past the end are clamped before the window is taken.
        let mut peak = Peak::new(c.id, 196);
        peak.min_pos = 190;
        peak.max_pos = 250;
        c.check_gaussian_fit(&mut peak);
        assert_eq!(peak.max_pos, 250);
        assert!(peak.gauss_fit_r2 >= 0.0 && peak.gauss_fit_r2 <= 1.0);
    }

    #[test]
    fn test_bounds_move_apex_to_raw_maximum() {
        // Seeded one index left of the raw maximum.
        let intensity = vec![0.0, 10.0, 40.0, 80.0, 90.0, 30.0, 0.0];
        let n = intensity.len();
        let mut c = chrom_from(intensity);
        c.compute_spline(1, SmootherKind::Gaussian);
        c.replace_baseline(Some(flat_baseline(n, 0.0)));

        let mut peak = Peak::new(c.id, 3);
        c.find_peak_bounds(&mut peak);
        assert_eq!(peak.pos, 4);
        assert!(peak.min_pos < peak.pos && peak.pos < peak.max_pos);
    }

    #[test]
    fn test_bounds_stop_at_first_zero() {
        let intensity = vec![0.0, 0.0, 0.0, 5.0, 9.0, 5.0, 0.0, 0.0, 0.0];
        let n = intensity.len();
        let mut c = chrom_from(intensity);
        c.compute_spline(1, SmootherKind::Gaussian);
        c.replace_baseline(Some(flat_baseline(n, -1.0)));

        let mut peak = Peak::new(c.id, 4);
        c.find_peak_bounds(&mut peak);
        assert_eq!(peak.min_pos, 2);
        assert_eq!(peak.max_pos, 6);
    }

    #[test]
    fn test_bounds_widened_when_apex_moves_onto_bound() {
        let intensity = vec![0.0, 1.0, 10.0, 50.0, 1.0, 0.0];
        let mut c = chrom_from(intensity);
        c.compute_spline(1, SmootherKind::Gaussian);
        // The right walk stops on its first step, where the raw maximum sits.
        c.replace_baseline(Some(Baseline {
            values: vec![0.0, 0.0, 0.0, 60.0, 0.0, 0.0],
            above_baseline_count: 0,
            qcut: 60.0,
        }));

        let mut peak = Peak::new(c.id, 2);
        c.find_peak_bounds(&mut peak);
        assert_eq!(peak.pos, 3);
        assert_eq!(peak.min_pos, 0);
        assert_eq!(peak.max_pos, 4);
    }

    #[test]
    fn test_bounds_noop_without_derived_buffers() {
        let c = chrom_from(vec![0.0, 1.0, 5.0, 1.0, 0.0]);
        let mut peak = Peak::new(c.id, 2);
        c.find_peak_bounds(&mut peak);
        c.compute_peak_details(&mut peak);
        assert_eq!((peak.min_pos, peak.max_pos), (2, 2));
        assert_eq!(peak.peak_area, 0.0);
    }

    #[test]
    fn test_bounds_at_edges() {
        let mut c = chrom_from(vec![9.0, 5.0, 1.0, 5.0, 9.0]);
        c.compute_spline(1, SmootherKind::Gaussian);
        c.replace_baseline(Some(flat_baseline(5, 0.0)));
        for apex in [0, 4] {
            let mut peak = Peak::new(c.id, apex);
            c.find_peak_bounds(&mut peak);
            assert!(peak.min_pos <= peak.pos && peak.pos <= peak.max_pos);
            assert!(peak.max_pos < 5);
        }
    }

    #[test]
    fn test_details_statistics() {
        let intensity = vec![0.0, 2.0, 20.0, 60.0, 100.0, 60.0, 20.0, 2.0, 0.0];
        let n = intensity.len();
        let mut c = chrom_from(intensity);
        c.mz = vec![0.0, 250.1, 250.2, 250.3, 250.4, 250.5, 250.6, 250.7, 0.0];
        c.replace_baseline(Some(Baseline {
            values: vec![1.0; n],
            above_baseline_count: 7,
            qcut: 1.0,
        }));

        let mut peak = Peak::new(c.id, 4);
        peak.min_pos = 0;
        peak.max_pos = 8;
        c.compute_peak_details(&mut peak);

        assert_eq!(peak.peak_area, 264.0);
        assert_eq!(peak.peak_area_corrected, 264.0 - 9.0);
        assert!((peak.peak_area_fractional - 255.0 / 265.0).abs() < 1e-5);
        assert_eq!(peak.no_noise_obs, 7);
        assert!((peak.no_noise_fraction - 7.0 / 8.0).abs() < 1e-6);
        assert!((peak.peak_area_top - 220.0 / 3.0).abs() < 1e-4);
        assert!((peak.signal_baseline_ratio - 10.0).abs() < 1e-6);
        assert_eq!(peak.width, 7);
        assert_eq!(peak.symmetry, 3);
        assert!((peak.median_mz - 250.4).abs() < 1e-9);
        assert!((peak.base_mz - 250.4).abs() < 1e-9);
        assert_eq!(peak.mz_min, 250.1);
        assert_eq!(peak.mz_max, 250.7);
        assert_eq!(peak.peak_baseline_level, 1.0);
        assert!(peak.gauss_fit_r2 > 0.9, "{:?}", peak);
        assert!(peak.gauss_fit_sigma > 0.0);
        assert!(!peak.from_blank_sample);
    }

    #[test]
    fn test_details_relocates_apex() {
        let intensity = vec![0.0, 5.0, 10.0, 30.0, 5.0, 0.0];
        let mut c = chrom_from(intensity);
        c.replace_baseline(Some(flat_baseline(6, 0.0)));
        let mut peak = Peak::new(c.id, 2);
        peak.min_pos = 0;
        peak.max_pos = 5;
        c.compute_peak_details(&mut peak);
        assert_eq!(peak.pos, 3);
        assert_eq!(peak.peak_intensity, 30.0);
        // Too narrow for a gaussian fit.
        assert_eq!(peak.gauss_fit_r2, 0.03);
        assert_eq!(peak.gauss_fit_sigma, 0.0);
    }

    #[test]
    fn test_details_without_observed_mz() {
        let mut c = chrom_from(vec![0.0, 5.0, 10.0, 5.0, 0.0]);
        c.mz = vec![0.0; 5];
        c.replace_baseline(Some(flat_baseline(5, 0.0)));
        let mut peak = Peak::new(c.id, 2);
        peak.min_pos = 0;
        peak.max_pos = 4;
        c.compute_peak_details(&mut peak);
        assert_eq!(peak.median_mz, 0.0);
        assert_eq!(peak.peak_mz, 0.0);
    }

    #[test]
    fn test_details_flags_blank_samples() {
        let mut c = chrom_from(vec![0.0, 5.0, 10.0, 5.0, 0.0]).with_sample(std::sync::Arc::new(
            crate::models::peak::SampleInfo {
                name: "blank".to_string(),
                is_blank: true,
            },
        ));
        let peaks = c.detect_peaks(&unsmoothed());
        assert_eq!(peaks.len(), 1);
        assert!(peaks[0].from_blank_sample);
    }

    #[test]
    fn test_details_invalid_bounds_noop() {
        let mut c = chrom_from(vec![0.0, 5.0, 10.0, 5.0, 0.0]);
        c.replace_baseline(Some(flat_baseline(5, 0.0)));
        let mut peak = Peak::new(c.id, 1);
        peak.min_pos = 3;
        peak.max_pos = 4;
        c.compute_peak_details(&mut peak);
        assert_eq!(peak.peak_area, 0.0);

        let mut peak = Peak::new(c.id, 12);
        c.compute_peak_details(&mut peak);
        assert_eq!(peak.peak_area, 0.0);
    }

    #[test]
    fn test_rank_orders_by_fractional_area() {
        let mut intensity = vec![0.0f32; 40];
        for (i, v) in [10.0, 40.0, 10.0].iter().enumerate() {
            intensity[5 + i] = *v;
        }
        for (i, v) in [30.0, 120.0, 30.0].iter().enumerate() {
            intensity[20 + i] = *v;
        }
        for (i, v) in [20.0, 80.0, 20.0].iter().enumerate() {
            intensity[30 + i] = *v;
        }
        let mut c = chrom_from(intensity);
        let peaks = c.detect_peaks(&unsmoothed());
        assert_eq!(peaks.len(), 3);
        let positions: Vec<usize> = peaks.iter().map(|p| p.pos).collect();
        assert_eq!(positions, vec![21, 31, 6]);
        let ranks: Vec<usize> = peaks.iter().map(|p| p.peak_rank).collect();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_redetect_replaces_peaks() {
        let mut c = chrom_from(vec![0.0, 1.0, 5.0, 1.0, 0.0]);
        c.detect_peaks(&unsmoothed());
        c.detect_peaks(&unsmoothed());
        assert_eq!(c.peaks.len(), 1);
    }
}
