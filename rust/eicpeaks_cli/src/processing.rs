use eicpeaks::pipeline::align_processed;
use eicpeaks::{
    CancellationToken,
    Chromatogram,
    ChromatogramId,
    DataProcessingError,
    ExtractionConfig,
    Peak,
    PeakGroup,
    SampleInfo,
    process_chromatograms,
};
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    BufWriter,
    Read,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::errors::CliError;

/// One extracted ion chromatogram, as found in the input file.
#[derive(Debug, Deserialize)]
pub struct SampleTrace {
    pub name: String,
    #[serde(default)]
    pub is_blank: bool,
    pub rt: Vec<f32>,
    pub intensity: Vec<f32>,
    pub mz: Vec<f64>,
    /// Defaults to the position of each observation.
    #[serde(default)]
    pub scans: Option<Vec<u32>>,
}

#[derive(Debug, Serialize)]
struct SamplePeaks<'a> {
    chromatogram: ChromatogramId,
    sample: &'a str,
    is_blank: bool,
    peaks: &'a [Peak],
}

pub fn read_traces<R: Read>(reader: R) -> Result<Vec<Chromatogram>, CliError> {
    let traces: Vec<SampleTrace> =
        serde_json::from_reader(reader).map_err(|e| CliError::ParseError { msg: e.to_string() })?;
    if traces.is_empty() {
        return Err(DataProcessingError::ExpectedNonEmptyData {
            context: Some("input traces".to_string()),
        }
        .into());
    }

    traces
        .into_iter()
        .enumerate()
        .map(|(i, trace)| -> Result<Chromatogram, CliError> {
            let scans = trace
                .scans
                .unwrap_or_else(|| (0..trace.rt.len() as u32).collect());
            let sample = Arc::new(SampleInfo {
                name: trace.name,
                is_blank: trace.is_blank,
            });
            let chrom = Chromatogram::try_new(
                ChromatogramId(i as u32),
                trace.rt,
                trace.intensity,
                trace.mz,
                scans,
            )
            .map_err(|e| e.append_to_context(&format!(" (sample {})", sample.name)))?;
            Ok(chrom.with_sample(sample))
        })
        .collect()
}

pub fn load_traces(path: &Path) -> Result<Vec<Chromatogram>, CliError> {
    info!("Reading traces from {:?}", path);
    let file = std::fs::File::open(path).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(path.to_string_lossy().to_string()),
    })?;
    read_traces(std::io::BufReader::new(file))
}

/// Detects the peaks of every chromatogram (with a progress bar) and
/// aligns them into groups.
pub fn run(
    chromatograms: &mut [Chromatogram],
    config: &ExtractionConfig,
) -> Result<Vec<PeakGroup>, CliError> {
    let start = Instant::now();
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| CliError::Config {
        source: e.to_string(),
    })?;
    let progress = ProgressBar::new(chromatograms.len() as u64).with_style(style);

    process_chromatograms(chromatograms, config, &CancellationToken::new(), || {
        progress.inc(1)
    })?;
    progress.finish();

    let groups = align_processed(chromatograms, config);
    info!(
        "Processed {} chromatograms into {} groups in {:?}",
        chromatograms.len(),
        groups.len(),
        start.elapsed()
    );
    Ok(groups)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), CliError> {
    let io_err = |source: String| CliError::Io {
        source,
        path: Some(path.to_string_lossy().to_string()),
    };
    let file = std::fs::File::create(path).map_err(|e| io_err(e.to_string()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), data).map_err(|e| io_err(e.to_string()))
}

/// Writes `peaks.json` (peaks per sample) and `groups.json` into `directory`.
pub fn write_results(
    directory: &Path,
    chromatograms: &[Chromatogram],
    groups: &[PeakGroup],
) -> Result<(), CliError> {
    let peaks: Vec<SamplePeaks> = chromatograms
        .iter()
        .map(|c| SamplePeaks {
            chromatogram: c.id,
            sample: c.sample.as_ref().map_or("", |s| s.name.as_str()),
            is_blank: c.is_blank(),
            peaks: &c.peaks,
        })
        .collect();

    let peaks_path = directory.join("peaks.json");
    write_json(&peaks_path, &peaks)?;
    let groups_path = directory.join("groups.json");
    write_json(&groups_path, groups)?;
    info!("Wrote results to {:?} and {:?}", peaks_path, groups_path);
    Ok(())
}
