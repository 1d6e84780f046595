pub mod chromatogram;
pub mod peak;
pub mod peak_group;

pub use chromatogram::{
    ChromPoint,
    Chromatogram,
};
pub use peak::{
    ChromatogramId,
    Peak,
    PeakHandle,
    SampleInfo,
};
pub use peak_group::{
    GroupMember,
    GroupStatistics,
    PeakGroup,
};
