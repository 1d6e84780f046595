use crate::baseline::{
    self,
    Baseline,
    try_alloc_buffer,
};
use crate::errors::DataProcessingError;
use crate::models::peak::{
    ChromatogramId,
    Peak,
    SampleInfo,
};
use crate::smoothing::{
    SmootherKind,
    smooth_into,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A single (rt, intensity, m/z) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromPoint {
    pub rt: f32,
    pub intensity: f32,
    pub mz: f64,
}

/// Extracted ion chromatogram of one sample.
///
/// `rt`, `intensity`, `mz` and `scans` are index aligned. An m/z of 0 means
/// no ion was observed at that scan.
///
/// The derived `spline` and `baseline` are `None` until computed (or when
/// their buffers could not be allocated); every operation that needs them
/// is a no-op while they are absent.
#[derive(Debug, Clone)]
pub struct Chromatogram {
    pub id: ChromatogramId,
    pub sample: Option<Arc<SampleInfo>>,

    pub rt: Vec<f32>,
    pub intensity: Vec<f32>,
    pub mz: Vec<f64>,
    pub scans: Vec<u32>,

    spline: Option<Vec<f32>>,
    baseline: Option<Baseline>,

    pub rt_min: f32,
    pub rt_max: f32,
    pub mz_min: f64,
    pub mz_max: f64,
    pub max_intensity: f32,
    /// Sum of the raw intensities, replaced by the sum of the spline once computed.
    pub total_intensity: f32,

    pub peaks: Vec<Peak>,
}

impl Chromatogram {
    pub fn try_new(
        id: ChromatogramId,
        rt: Vec<f32>,
        intensity: Vec<f32>,
        mz: Vec<f64>,
        scans: Vec<u32>,
    ) -> Result<Self, DataProcessingError> {
        for (other, name) in [
            (intensity.len(), "intensity"),
            (mz.len(), "mz"),
            (scans.len(), "scans"),
        ] {
            if other != rt.len() {
                return Err(DataProcessingError::ExpectedSlicesSameLength {
                    expected: rt.len(),
                    other,
                    context: format!("Chromatogram {} rt vs {}", id, name),
                });
            }
        }
        if rt.iter().chain(intensity.iter()).any(|x| !x.is_finite())
            || mz.iter().any(|x| !x.is_finite())
        {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: format!("Chromatogram {}", id),
            });
        }

        let mut out = Self {
            id,
            sample: None,
            rt,
            intensity,
            mz,
            scans,
            spline: None,
            baseline: None,
            rt_min: 0.0,
            rt_max: 0.0,
            mz_min: 0.0,
            mz_max: 0.0,
            max_intensity: 0.0,
            total_intensity: 0.0,
            peaks: Vec::new(),
        };
        out.update_summary();
        Ok(out)
    }

    pub fn with_sample(mut self, sample: Arc<SampleInfo>) -> Self {
        self.sample = Some(sample);
        self
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    pub fn spline(&self) -> Option<&[f32]> {
        self.spline.as_deref()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    pub fn is_blank(&self) -> bool {
        self.sample.as_ref().is_some_and(|s| s.is_blank)
    }

    fn update_summary(&mut self) {
        self.rt_min = self.rt.iter().copied().fold(f32::INFINITY, f32::min);
        self.rt_max = self.rt.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if self.rt.is_empty() {
            self.rt_min = 0.0;
            self.rt_max = 0.0;
        }

        let observed_mzs = self.mz.iter().copied().filter(|mz| *mz > 0.0);
        let (mz_min, mz_max) = observed_mzs.fold((f64::INFINITY, f64::NEG_INFINITY), |acc, mz| {
            (acc.0.min(mz), acc.1.max(mz))
        });
        if mz_min <= mz_max {
            self.mz_min = mz_min;
            self.mz_max = mz_max;
        }

        self.max_intensity = self.intensity.iter().copied().fold(0.0, f32::max);
        self.total_intensity = self.intensity.iter().sum();
    }

    /// Recomputes the smoothed trace, replacing any previous one.
    pub fn compute_spline(&mut self, window: usize, kind: SmootherKind) {
        self.spline = None;
        if self.is_empty() {
            return;
        }
        let Some(mut spline) = try_alloc_buffer(self.len(), "spline") else {
            return;
        };
        smooth_into(&self.intensity, window, kind, &mut spline);
        self.total_intensity = spline.iter().sum();
        self.spline = Some(spline);
    }

    #[cfg(test)]
    pub(crate) fn replace_baseline(&mut self, baseline: Option<Baseline>) {
        self.baseline = baseline;
    }

    /// Recomputes the baseline, replacing any previous one.
    pub fn compute_baseline(&mut self, smoothing_window: usize, quantile: u32) {
        self.baseline = baseline::estimate(&self.intensity, smoothing_window, quantile);
    }

    /// Seeds a peak with its apex at `pos`, returns its index.
    pub fn add_peak(&mut self, pos: usize) -> usize {
        self.peaks.push(Peak::new(self.id, pos));
        self.peaks.len() - 1
    }

    /// Removes the peak at index `i`, if there is one.
    pub fn remove_peak(&mut self, i: usize) -> Option<Peak> {
        if i < self.peaks.len() {
            Some(self.peaks.remove(i))
        } else {
            None
        }
    }

    /// Observations inside the bounds of `peak`, clamped to the chromatogram.
    pub fn peak_points(&self, peak: &Peak) -> Vec<ChromPoint> {
        if self.is_empty() {
            return Vec::new();
        }
        let last = self.len() - 1;
        let min_pos = peak.min_pos.min(last);
        let max_pos = peak.max_pos.min(last);
        (min_pos..=max_pos)
            .map(|i| ChromPoint {
                rt: self.rt[i],
                intensity: self.intensity[i],
                mz: self.mz[i],
            })
            .collect()
    }

    pub fn summary(&self) {
        debug!(
            "Chromatogram {}: mz={}-{} rt={}-{} maxIntensity={} peaks={}",
            self.id,
            self.mz_min,
            self.mz_max,
            self.rt_min,
            self.rt_max,
            self.max_intensity,
            self.peaks.len()
        );
    }

    /// Builds a composite chromatogram averaging the spline of every input.
    ///
    /// The union of the input rt ranges is split in `1 + max(len)` evenly
    /// spaced bins. Each bin holds the summed positive spline intensity of the
    /// observations falling in it divided by the number of inputs, and the
    /// mean of their non-zero m/z values. Inputs without a spline only
    /// contribute m/z.
    pub fn merge(chromatograms: &[Chromatogram]) -> Chromatogram {
        let mut merged = Chromatogram {
            id: ChromatogramId::REFERENCE,
            sample: None,
            rt: Vec::new(),
            intensity: Vec::new(),
            mz: Vec::new(),
            scans: Vec::new(),
            spline: None,
            baseline: None,
            rt_min: 0.0,
            rt_max: 0.0,
            mz_min: 0.0,
            mz_max: 0.0,
            max_intensity: 0.0,
            total_intensity: 0.0,
            peaks: Vec::new(),
        };

        let non_empty = || chromatograms.iter().filter(|c| !c.is_empty());
        let Some(longest) = non_empty().map(|c| c.len()).max() else {
            return merged;
        };
        let max_len = longest + 1;
        let min_rt = non_empty().map(|c| c.rt_min).fold(f32::INFINITY, f32::min);
        let max_rt = non_empty().map(|c| c.rt_max).fold(f32::NEG_INFINITY, f32::max);
        let span = max_rt - min_rt;

        let mut intensity = vec![0.0f32; max_len];
        let mut mz = vec![0.0f64; max_len];
        let mut mz_count = vec![0usize; max_len];
        let rt: Vec<f32> = (0..max_len)
            .map(|i| min_rt + i as f32 * (span / max_len as f32))
            .collect();
        let scans: Vec<u32> = (0..max_len as u32).collect();

        for chrom in non_empty() {
            for j in 0..chrom.len() {
                let bin = if span > 0.0 {
                    let raw = ((chrom.rt[j] - min_rt) / span * max_len as f32).floor();
                    (raw.max(0.0) as usize).min(max_len - 1)
                } else {
                    0
                };

                if let Some(spline) = chrom.spline() {
                    if spline[j] > 0.0 {
                        intensity[bin] += spline[j];
                    }
                }
                if chrom.mz[j] > 0.0 {
                    mz[bin] += chrom.mz[j];
                    mz_count[bin] += 1;
                }
            }
        }

        let n_inputs = chromatograms.len() as f32;
        for i in 0..max_len {
            intensity[i] /= n_inputs;
            if mz_count[i] > 0 {
                mz[i] /= mz_count[i] as f64;
            }
        }

        merged.rt = rt;
        merged.intensity = intensity;
        merged.mz = mz;
        merged.scans = scans;
        merged.update_summary();
        merged.rt_min = min_rt;
        merged.rt_max = max_rt;
        merged
    }
}
