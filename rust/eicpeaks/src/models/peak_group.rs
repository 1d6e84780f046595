use crate::models::peak::{
    ChromatogramId,
    Peak,
    PeakHandle,
};
use crate::utils::stats::{
    Summary,
    mean_f32,
};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// A peak that was assigned to a group, and where it came from.
///
/// The peak is a snapshot taken at assignment time; `handle` points back at
/// the live peak in its chromatogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMember {
    pub handle: PeakHandle,
    pub peak: Peak,
}

/// Aggregates over the members of a [`PeakGroup`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStatistics {
    pub mean_rt: f32,
    pub min_rt: f32,
    pub max_rt: f32,
    pub mean_mz: f64,
    pub median_mz: f64,
    pub min_mz: f64,
    pub max_mz: f64,

    pub max_intensity: f32,
    pub max_area: f32,
    pub max_area_top: f32,
    pub max_area_corrected: f32,
    pub max_area_fractional: f32,
    pub max_signal_baseline_ratio: f32,
    pub max_no_noise_obs: usize,
    pub max_gauss_r2: f32,

    /// Members from regular (non blank) samples.
    pub sample_count: usize,
    pub sample_mean: f32,
    pub blank_sample_count: usize,
    pub blank_max: f32,
    pub blank_mean: f32,
}

/// Peaks of different chromatograms that represent the same feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakGroup {
    pub group_id: usize,
    pub members: Vec<GroupMember>,
    pub stats: GroupStatistics,
}

impl PeakGroup {
    pub fn new(group_id: usize) -> Self {
        Self {
            group_id,
            members: Vec::new(),
            stats: GroupStatistics::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add_peak(&mut self, handle: PeakHandle, peak: Peak) {
        self.members.push(GroupMember { handle, peak });
    }

    pub fn peaks(&self) -> impl Iterator<Item = &Peak> {
        self.members.iter().map(|m| &m.peak)
    }

    /// Keeps a single member per chromatogram: the one that matched the group
    /// best, the more intense one on ties. Relative order is preserved.
    pub fn reduce(&mut self) {
        let mut best: HashMap<ChromatogramId, usize> = HashMap::with_capacity(self.members.len());
        for (i, member) in self.members.iter().enumerate() {
            match best.entry(member.handle.chromatogram) {
                Entry::Vacant(e) => {
                    e.insert(i);
                }
                Entry::Occupied(mut e) => {
                    let current = &self.members[*e.get()].peak;
                    if Self::matches_better(&member.peak, current) {
                        e.insert(i);
                    }
                }
            }
        }

        let mut i = 0;
        self.members.retain(|m| {
            let keep = best.get(&m.handle.chromatogram) == Some(&i);
            i += 1;
            keep
        });
    }

    fn matches_better(candidate: &Peak, current: &Peak) -> bool {
        match candidate.group_overlap.total_cmp(&current.group_overlap) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => candidate.peak_intensity > current.peak_intensity,
        }
    }

    /// Recomputes [`GroupStatistics`] from the current members.
    pub fn compute_statistics(&mut self) {
        let mut stats = GroupStatistics::default();
        if self.members.is_empty() {
            self.stats = stats;
            return;
        }

        stats.mean_rt = mean_f32(self.peaks().map(|p| p.rt)).unwrap_or(0.0);
        stats.min_rt = self.peaks().map(|p| p.rt_min).fold(f32::INFINITY, f32::min);
        stats.max_rt = self.peaks().map(|p| p.rt_max).fold(f32::NEG_INFINITY, f32::max);

        let apex_mzs: Vec<f64> = self.peaks().map(|p| p.peak_mz).filter(|mz| *mz > 0.0).collect();
        if let Some(summary) = Summary::from_values(&apex_mzs) {
            stats.mean_mz = summary.mean;
            stats.median_mz = summary.median;
        }
        let observed_min = self.peaks().map(|p| p.mz_min).filter(|mz| *mz > 0.0);
        stats.min_mz = observed_min.fold(f64::INFINITY, f64::min);
        stats.max_mz = self.peaks().map(|p| p.mz_max).fold(0.0, f64::max);
        if !stats.min_mz.is_finite() {
            stats.min_mz = 0.0;
        }

        let mut sample_sum = 0.0;
        let mut blank_sum = 0.0;
        for peak in self.peaks() {
            stats.max_intensity = stats.max_intensity.max(peak.peak_intensity);
            stats.max_area = stats.max_area.max(peak.peak_area);
            stats.max_area_top = stats.max_area_top.max(peak.peak_area_top);
            stats.max_area_corrected = stats.max_area_corrected.max(peak.peak_area_corrected);
            stats.max_area_fractional = stats.max_area_fractional.max(peak.peak_area_fractional);
            stats.max_signal_baseline_ratio =
                stats.max_signal_baseline_ratio.max(peak.signal_baseline_ratio);
            stats.max_no_noise_obs = stats.max_no_noise_obs.max(peak.no_noise_obs);
            stats.max_gauss_r2 = stats.max_gauss_r2.max(peak.gauss_fit_r2);

            if peak.from_blank_sample {
                stats.blank_sample_count += 1;
                stats.blank_max = stats.blank_max.max(peak.peak_intensity);
                blank_sum += peak.peak_intensity;
            } else {
                stats.sample_count += 1;
                sample_sum += peak.peak_intensity;
            }
        }
        if stats.sample_count > 0 {
            stats.sample_mean = sample_sum / stats.sample_count as f32;
        }
        if stats.blank_sample_count > 0 {
            stats.blank_mean = blank_sum / stats.blank_sample_count as f32;
        }

        self.stats = stats;
    }

    /// Ordering that puts the most intense groups first.
    pub fn cmp_intensity_desc(a: &PeakGroup, b: &PeakGroup) -> std::cmp::Ordering {
        b.stats.max_intensity.total_cmp(&a.stats.max_intensity)
    }
}
