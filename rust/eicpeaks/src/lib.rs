#![doc = include_str!("../README.md")]

// Declare modules
pub mod alignment;
pub mod baseline;
pub mod config;
pub mod detection;
pub mod errors;
pub mod gaussian_fit;
pub mod models;
pub mod pipeline;
pub mod shape;
pub mod smoothing;
pub mod utils;

// Re-export main structures
pub use crate::alignment::{
    Aligner,
    remove_low_rank_groups,
};
pub use crate::config::ExtractionConfig;
pub use crate::models::{
    ChromPoint,
    Chromatogram,
    ChromatogramId,
    GroupStatistics,
    Peak,
    PeakGroup,
    PeakHandle,
    SampleInfo,
};
pub use crate::pipeline::{
    CancellationToken,
    extract_and_align,
    process_chromatograms,
};
pub use crate::smoothing::SmootherKind;

// Re-export errors
pub use crate::errors::{
    DataProcessingError,
    EicPeaksError,
};
