use eicpeaks::alignment::{
    best_match,
    match_score,
};
use eicpeaks::baseline::{
    estimate,
    quantile_cut,
};
use eicpeaks::smoothing::smooth;
use eicpeaks::{
    Aligner,
    Chromatogram,
    ChromatogramId,
    ExtractionConfig,
    Peak,
    PeakGroup,
    SmootherKind,
    remove_low_rank_groups,
};

const ALL_KINDS: [SmootherKind; 3] = [
    SmootherKind::MovingAverage,
    SmootherKind::Gaussian,
    SmootherKind::SavitzkyGolay,
];

/// Small deterministic generator so the traces are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }
}

fn noisy_trace(id: u32, seed: u64) -> Chromatogram {
    let mut rng = Lcg(seed);
    let n = 150 + (seed % 50) as usize;
    let apexes: Vec<(f32, f32)> = (0..3)
        .map(|_| (rng.next_f32() * n as f32, 200.0 + rng.next_f32() * 2000.0))
        .collect();
    let intensity: Vec<f32> = (0..n)
        .map(|i| {
            let signal: f32 = apexes
                .iter()
                .map(|(center, height)| {
                    let x = (i as f32 - center) / 3.0;
                    height * (-0.5 * x * x).exp()
                })
                .sum();
            // Some scans have no signal at all.
            if rng.next_f32() < 0.05 {
                0.0
            } else {
                signal + 30.0 + rng.next_f32() * 40.0
            }
        })
        .collect();
    let mz: Vec<f64> = intensity
        .iter()
        .map(|x| if *x > 0.0 { 445.12 } else { 0.0 })
        .collect();
    Chromatogram::try_new(
        ChromatogramId(id),
        (0..n).map(|i| 1.0 + i as f32 * 0.03).collect(),
        intensity,
        mz,
        (0..n as u32).collect(),
    )
    .unwrap()
}

fn plain(intensity: Vec<f32>) -> Chromatogram {
    let n = intensity.len();
    Chromatogram::try_new(
        ChromatogramId(0),
        (0..n).map(|i| i as f32).collect(),
        intensity,
        vec![100.0; n],
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

#[test]
fn test_window_of_one_is_identity() {
    for seed in 0..5 {
        let mut chrom = noisy_trace(0, seed);
        for kind in ALL_KINDS {
            assert_eq!(smooth(&chrom.intensity, 1, kind), chrom.intensity);
            chrom.compute_spline(1, kind);
            assert_eq!(chrom.spline().unwrap(), chrom.intensity.as_slice());
        }
    }
}

#[test]
fn test_baseline_never_exceeds_cut() {
    for seed in 0..10 {
        let chrom = noisy_trace(0, seed);
        for quantile in [0, 20, 40, 80, 100] {
            let qcut = quantile_cut(&chrom.intensity, quantile).unwrap();
            let baseline = estimate(&chrom.intensity, 5, quantile).unwrap();
            assert_eq!(baseline.qcut, qcut);
            assert!(baseline.values.iter().all(|b| *b <= qcut));
        }
    }
}

#[test]
fn test_merge_single_chromatogram() {
    let mut chrom = noisy_trace(3, 7);
    chrom.compute_spline(5, SmootherKind::Gaussian);
    let merged = Chromatogram::merge(std::slice::from_ref(&chrom));

    assert_eq!(merged.rt_min, chrom.rt_min);
    assert_eq!(merged.rt_max, chrom.rt_max);
    assert_eq!(merged.len(), chrom.len() + 1);

    // Every observation lands in its own bin, so the non-empty bins are the
    // spline itself.
    let spline = chrom.spline().unwrap();
    let occupied: Vec<f32> = merged.intensity.iter().copied().filter(|x| *x > 0.0).collect();
    let expected: Vec<f32> = spline.iter().copied().filter(|x| *x > 0.0).collect();
    assert_eq!(occupied, expected);
}

#[test]
fn test_detect_single_spike() {
    let mut chrom = plain(vec![0.0, 1.0, 5.0, 1.0, 0.0]);
    let peaks = chrom.detect_peaks(&unsmoothed());
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].pos, 2);
}

#[test]
fn test_detect_plateau() {
    let mut chrom = plain(vec![0.0, 3.0, 5.0, 5.0, 5.0, 2.0, 0.0]);
    let peaks = chrom.detect_peaks(&unsmoothed());
    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].pos, 4);
}

#[test]
fn test_bounds_and_areas_on_noisy_traces() {
    for seed in 0..20 {
        for kind in ALL_KINDS {
            let mut chrom = noisy_trace(0, seed);
            let config = ExtractionConfig {
                smoother: kind,
                ..ExtractionConfig::default()
            };
            chrom.detect_peaks(&config);
            let n = chrom.len();
            assert!(!chrom.peaks.is_empty());

            for (rank, peak) in chrom.peaks.iter().enumerate() {
                assert!(peak.min_pos <= peak.pos, "{:?}", peak);
                assert!(peak.pos <= peak.max_pos, "{:?}", peak);
                assert!(peak.max_pos < n, "{:?}", peak);
                assert!(peak.peak_area >= peak.peak_area_corrected, "{:?}", peak);
                assert_eq!(peak.peak_rank, rank);

                let apex = chrom.intensity[peak.pos];
                assert!(chrom.intensity[peak.min_pos..=peak.max_pos]
                    .iter()
                    .all(|x| *x <= apex));
            }
            assert!(chrom
                .peaks
                .windows(2)
                .all(|w| w[0].peak_area_fractional >= w[1].peak_area_fractional));
        }
    }
}

#[test]
fn test_single_chromatogram_alignment() {
    let config = ExtractionConfig::default();
    let mut chroms = vec![noisy_trace(0, 11)];
    chroms[0].detect_peaks(&config);
    let num_peaks = chroms[0].peaks.len();

    let groups = Aligner::new(&config).align(&mut chroms);
    assert_eq!(groups.len(), num_peaks);
    assert!(groups.iter().all(|g| g.len() == 1));
    // Nothing was scored against a reference.
    assert!(chroms[0].peaks.iter().all(|p| p.group_overlap == 0.0));
}

#[test]
fn test_identical_peak_outscores_distant_one() {
    let mut reference = Peak::new(ChromatogramId::REFERENCE, 0);
    reference.rt = 5.0;
    reference.rt_min = 4.8;
    reference.rt_max = 5.2;
    reference.peak_intensity = 3000.0;

    let same = Peak {
        chromatogram: ChromatogramId(0),
        ..reference.clone()
    };
    let distant = Peak {
        chromatogram: ChromatogramId(1),
        rt: 6.0,
        rt_min: 5.19,
        rt_max: 6.2,
        ..reference.clone()
    };

    let max_rt_diff = 0.5;
    assert!(match_score(&reference, &same, max_rt_diff).unwrap() > 0.0);
    assert_eq!(match_score(&reference, &distant, max_rt_diff), None);
    assert_eq!(
        best_match(&same, std::slice::from_ref(&reference), max_rt_diff).map(|(k, _)| k),
        Some(0)
    );
    assert_eq!(best_match(&distant, &[reference], max_rt_diff), None);
}

#[test]
fn test_rank_limit_caps_group_count() {
    for n_groups in 0..12 {
        for rank_limit in 0..8 {
            let mut groups: Vec<PeakGroup> = (0..n_groups)
                .map(|i| {
                    let mut g = PeakGroup::new(i);
                    g.stats.max_intensity = ((i * 37) % 11) as f32;
                    g
                })
                .collect();
            remove_low_rank_groups(&mut groups, rank_limit);
            assert_eq!(groups.len(), n_groups.min(rank_limit + 1));
            assert!(groups
                .windows(2)
                .all(|w| w[0].stats.max_intensity >= w[1].stats.max_intensity));
        }
    }
}
