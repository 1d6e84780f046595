use crate::gaussian_fit::{
    UNFIT_R2,
    UNFIT_SIGMA,
};
use crate::models::chromatogram::Chromatogram;
use serde::{
    Deserialize,
    Serialize,
};

/// Identifies a chromatogram inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChromatogramId(pub u32);

impl ChromatogramId {
    /// Id carried by the composite chromatogram built for alignment.
    pub const REFERENCE: ChromatogramId = ChromatogramId(u32::MAX);
}

impl std::fmt::Display for ChromatogramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata of the sample a chromatogram was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub name: String,
    /// Blank/control samples still get peaks, they are only flagged.
    #[serde(default)]
    pub is_blank: bool,
}

/// Stable, non-owning reference to a peak: the chromatogram it lives in and
/// its position in that chromatogram's (ranked) peak list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeakHandle {
    pub chromatogram: ChromatogramId,
    pub index: usize,
}

impl PeakHandle {
    pub fn resolve<'a>(&self, chromatograms: &'a [Chromatogram]) -> Option<&'a Peak> {
        chromatograms
            .iter()
            .find(|c| c.id == self.chromatogram)
            .and_then(|c| c.peaks.get(self.index))
    }
}

/// A local feature of a chromatogram.
///
/// Created by peak detection with only `pos` set, bounds are filled in by the
/// boundary search and everything else by the statistics pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak {
    pub chromatogram: ChromatogramId,

    /// Apex index.
    pub pos: usize,
    pub min_pos: usize,
    pub max_pos: usize,

    pub rt: f32,
    pub rt_min: f32,
    pub rt_max: f32,
    pub scan: u32,
    pub min_scan: u32,
    pub max_scan: u32,

    pub peak_intensity: f32,
    pub peak_mz: f64,
    pub median_mz: f64,
    /// Mean m/z of the observations with a non-zero m/z.
    pub base_mz: f64,
    pub mz_min: f64,
    pub mz_max: f64,

    pub peak_area: f32,
    pub peak_area_corrected: f32,
    /// Mean intensity of the apex and its in-bounds direct neighbors.
    pub peak_area_top: f32,
    pub peak_area_fractional: f32,
    pub peak_baseline_level: f32,
    pub signal_baseline_ratio: f32,

    pub no_noise_obs: usize,
    pub no_noise_fraction: f32,

    pub width: usize,
    pub symmetry: usize,
    pub gauss_fit_sigma: f32,
    pub gauss_fit_r2: f32,

    pub peak_rank: usize,
    pub group_num: Option<usize>,
    pub group_overlap: f32,
    pub from_blank_sample: bool,
}

impl Peak {
    pub fn new(chromatogram: ChromatogramId, pos: usize) -> Self {
        Self {
            chromatogram,
            pos,
            min_pos: pos,
            max_pos: pos,
            rt: 0.0,
            rt_min: 0.0,
            rt_max: 0.0,
            scan: 0,
            min_scan: 0,
            max_scan: 0,
            peak_intensity: 0.0,
            peak_mz: 0.0,
            median_mz: 0.0,
            base_mz: 0.0,
            mz_min: 0.0,
            mz_max: 0.0,
            peak_area: 0.0,
            peak_area_corrected: 0.0,
            peak_area_top: 0.0,
            peak_area_fractional: 0.0,
            peak_baseline_level: 0.0,
            signal_baseline_ratio: 0.0,
            no_noise_obs: 0,
            no_noise_fraction: 0.0,
            width: 0,
            symmetry: 0,
            gauss_fit_sigma: UNFIT_SIGMA,
            gauss_fit_r2: UNFIT_R2,
            peak_rank: 0,
            group_num: None,
            group_overlap: 0.0,
            from_blank_sample: false,
        }
    }

    /// Ordering that puts larger fractional areas first.
    pub fn cmp_area_desc(a: &Peak, b: &Peak) -> std::cmp::Ordering {
        b.peak_area_fractional.total_cmp(&a.peak_area_fractional)
    }
}
