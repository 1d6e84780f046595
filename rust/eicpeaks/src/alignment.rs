//! Cross-sample grouping of peaks.
//!
//! A composite reference is merged from all chromatograms and its peaks seed
//! the groups. Every sample peak then joins the reference peak it matches
//! best, or starts a group of its own.

use crate::config::ExtractionConfig;
use crate::models::chromatogram::Chromatogram;
use crate::models::peak::{
    Peak,
    PeakHandle,
};
use crate::models::peak_group::PeakGroup;
use std::collections::HashSet;
use tracing::{
    debug,
    instrument,
};

/// Below this overlap, peaks further apart than the max rt difference
/// are not considered at all.
const MIN_OVERLAP_FAR_PEAKS: f32 = 0.2;
/// Keeps the match score finite for identical rts/intensities.
const SCORE_EPSILON: f32 = 0.01;

/// Overlap of `[a_min, a_max]` and `[b_min, b_max]` as a fraction of their union.
///
/// 0 for disjoint intervals and 1 when one interval contains the other.
pub fn interval_overlap_fraction(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> f32 {
    if (a_min < b_min && a_max < b_min) || (b_max < a_min && b_max < a_max) {
        return 0.0;
    }
    if (b_min <= a_min && a_max <= b_max) || (a_min <= b_min && b_max <= a_max) {
        return 1.0;
    }
    if b_min >= a_min && b_min <= a_max {
        return (a_max - b_min) / (b_max - a_min);
    }
    if b_max >= a_min && b_max <= a_max {
        return (b_max - a_min) / (a_max - b_min);
    }
    0.0
}

/// Similarity of `peak` to the reference peak `reference`.
///
/// `None` when the peaks are more than `max_rt_diff` apart and overlap by
/// less than 20%. Otherwise the overlap fraction divided by the (padded)
/// rt distance and apex intensity difference.
pub fn match_score(reference: &Peak, peak: &Peak, max_rt_diff: f32) -> Option<f32> {
    let rt_distance = (peak.rt - reference.rt).abs();
    let overlap =
        interval_overlap_fraction(reference.rt_min, reference.rt_max, peak.rt_min, peak.rt_max);
    if rt_distance > max_rt_diff && overlap < MIN_OVERLAP_FAR_PEAKS {
        return None;
    }

    let intensity_distance = (peak.peak_intensity - reference.peak_intensity).abs();
    Some(overlap / ((rt_distance + SCORE_EPSILON) * (intensity_distance + SCORE_EPSILON)))
}

/// Index and score of the reference peak `peak` matches best.
///
/// Only strictly positive scores qualify; the first reference wins ties.
pub fn best_match(peak: &Peak, reference_peaks: &[Peak], max_rt_diff: f32) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (k, reference) in reference_peaks.iter().enumerate() {
        let Some(score) = match_score(reference, peak, max_rt_diff) else {
            continue;
        };
        if score > best.map_or(0.0, |(_, s)| s) {
            best = Some((k, score));
        }
    }
    best
}

/// Groups the peaks of a batch of chromatograms.
#[derive(Debug, Clone)]
pub struct Aligner {
    config: ExtractionConfig,
}

impl Aligner {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Builds the peak groups of `chromatograms`.
    ///
    /// The group assignment (`group_num`, `group_overlap`) is written back
    /// into the chromatograms' peaks. Groups hold at most one peak per
    /// chromatogram and are never empty. Peaks that lost their group to a
    /// better match of the same chromatogram keep `group_num == None`.
    #[instrument(skip_all, fields(n_chromatograms = chromatograms.len()))]
    pub fn align(&self, chromatograms: &mut [Chromatogram]) -> Vec<PeakGroup> {
        for chrom in chromatograms.iter_mut() {
            let unranked = chrom.spline().is_none() || chrom.baseline().is_none();
            if !chrom.peaks.is_empty() && unranked {
                chrom.rank_peaks(&self.config);
            }
        }

        if chromatograms.len() == 1 {
            return Self::singleton_groups(&mut chromatograms[0]);
        }

        let mut reference = Chromatogram::merge(chromatograms);
        reference.detect_peaks(&self.config);
        debug!(
            "Reference chromatogram has {} points and {} peaks",
            reference.len(),
            reference.peaks.len()
        );

        let mut groups: Vec<PeakGroup> = (0..reference.peaks.len()).map(PeakGroup::new).collect();
        for chrom in chromatograms.iter_mut() {
            let chromatogram = chrom.id;
            for (index, peak) in chrom.peaks.iter_mut().enumerate() {
                let handle = PeakHandle {
                    chromatogram,
                    index,
                };
                match best_match(peak, &reference.peaks, self.config.max_rt_diff) {
                    Some((k, score)) => {
                        peak.group_num = Some(k);
                        peak.group_overlap = score;
                        groups[k].add_peak(handle, peak.clone());
                    }
                    None => {
                        let mut group = PeakGroup::new(groups.len());
                        peak.group_num = Some(group.group_id);
                        peak.group_overlap = 0.0;
                        group.add_peak(handle, peak.clone());
                        groups.push(group);
                    }
                }
            }
        }

        for group in groups.iter_mut().filter(|g| !g.is_empty()) {
            group.reduce();
            group.compute_statistics();
        }
        groups.retain(|g| !g.is_empty());
        Self::release_reduced_peaks(chromatograms, &groups);

        debug!("Aligned peaks into {} groups", groups.len());
        groups
    }

    /// Clears the assignment of peaks that `reduce` dropped from their group.
    fn release_reduced_peaks(chromatograms: &mut [Chromatogram], groups: &[PeakGroup]) {
        let members: HashSet<PeakHandle> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.handle))
            .collect();
        let mut released = 0;
        for chrom in chromatograms.iter_mut() {
            let chromatogram = chrom.id;
            for (index, peak) in chrom.peaks.iter_mut().enumerate() {
                let handle = PeakHandle {
                    chromatogram,
                    index,
                };
                if peak.group_num.is_some() && !members.contains(&handle) {
                    peak.group_num = None;
                    peak.group_overlap = 0.0;
                    released += 1;
                }
            }
        }
        if released > 0 {
            debug!("{} peaks lost their group to a better match", released);
        }
    }

    fn singleton_groups(chrom: &mut Chromatogram) -> Vec<PeakGroup> {
        let chromatogram = chrom.id;
        let mut groups = Vec::with_capacity(chrom.peaks.len());
        for (index, peak) in chrom.peaks.iter_mut().enumerate() {
            peak.group_num = Some(index);
            let mut group = PeakGroup::new(index);
            group.add_peak(
                PeakHandle {
                    chromatogram,
                    index,
                },
                peak.clone(),
            );
            group.compute_statistics();
            groups.push(group);
        }
        groups
    }
}

/// Keeps the `rank_limit + 1` most intense groups, most intense first.
pub fn remove_low_rank_groups(groups: &mut Vec<PeakGroup>, rank_limit: usize) {
    groups.sort_by(PeakGroup::cmp_intensity_desc);
    groups.truncate(rank_limit.saturating_add(1));
}
