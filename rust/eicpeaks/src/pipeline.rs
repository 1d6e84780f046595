//! Batch processing of many chromatograms.
//!
//! Every chromatogram is processed as an independent rayon task that owns it
//! mutably for the whole run (smoothing, baseline, detection, bounds,
//! statistics and ranking). Alignment only starts once all tasks have
//! joined.

use crate::alignment::{
    Aligner,
    remove_low_rank_groups,
};
use crate::config::ExtractionConfig;
use crate::errors::{
    EicPeaksError,
    Result,
};
use crate::models::chromatogram::Chromatogram;
use crate::models::peak_group::PeakGroup;
use rayon::prelude::*;
use std::sync::atomic::{
    AtomicBool,
    AtomicUsize,
    Ordering,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{
    info,
    instrument,
    warn,
};

/// Cooperative cancellation flag shared between a caller and a running batch.
///
/// Cancelling does not interrupt a chromatogram that is already being
/// processed, it only keeps the remaining ones from starting.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Smooths, estimates the baseline and detects and ranks the peaks of a
/// single chromatogram.
pub fn process_chromatogram(chromatogram: &mut Chromatogram, config: &ExtractionConfig) {
    chromatogram.compute_baseline(config.baseline_smoothing_window, config.baseline_quantile);
    chromatogram.detect_peaks(config);
    chromatogram.summary();
}

/// Processes every chromatogram in parallel, calling `on_done` after each one.
///
/// Returns [`EicPeaksError::Cancelled`] when `cancel` was tripped before
/// all chromatograms were processed. The ones that were are left fully
/// processed, the others untouched.
#[instrument(skip_all, fields(n_chromatograms = chromatograms.len()))]
pub fn process_chromatograms<F>(
    chromatograms: &mut [Chromatogram],
    config: &ExtractionConfig,
    cancel: &CancellationToken,
    on_done: F,
) -> Result<()>
where
    F: Fn() + Sync,
{
    config.validate()?;
    let total = chromatograms.len();
    let completed = AtomicUsize::new(0);
    let start = Instant::now();

    chromatograms.par_iter_mut().for_each(|chromatogram| {
        if cancel.is_cancelled() {
            return;
        }
        process_chromatogram(chromatogram, config);
        completed.fetch_add(1, Ordering::Relaxed);
        on_done();
    });

    let completed = completed.into_inner();
    if completed < total {
        warn!("Cancelled after processing {}/{} chromatograms", completed, total);
        return Err(EicPeaksError::Cancelled { completed, total });
    }

    let num_peaks: usize = chromatograms.iter().map(|c| c.peaks.len()).sum();
    info!(
        "Detected {} peaks in {} chromatograms in {:?}",
        num_peaks,
        total,
        start.elapsed()
    );
    Ok(())
}

/// Groups already processed chromatograms and applies the rank limit, if any.
pub fn align_processed(
    chromatograms: &mut [Chromatogram],
    config: &ExtractionConfig,
) -> Vec<PeakGroup> {
    let mut groups = Aligner::new(config).align(chromatograms);
    if let Some(rank_limit) = config.rank_limit {
        remove_low_rank_groups(&mut groups, rank_limit);
    }
    groups
}

/// Full run: per-chromatogram processing, then alignment into groups.
#[instrument(skip_all)]
pub fn extract_and_align(
    chromatograms: &mut [Chromatogram],
    config: &ExtractionConfig,
    cancel: &CancellationToken,
) -> Result<Vec<PeakGroup>> {
    process_chromatograms(chromatograms, config, cancel, || {})?;
    let start = Instant::now();
    let groups = align_processed(chromatograms, config);
    info!("Aligned {} groups in {:?}", groups.len(), start.elapsed());
    Ok(groups)
}
