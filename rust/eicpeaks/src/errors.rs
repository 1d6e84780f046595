use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedNonEmptyData {
        context: Option<String>,
    },
    ExpectedFiniteNonNanData {
        context: String,
    },
    InvalidParameter {
        name: &'static str,
        value: String,
        context: String,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedSlicesSameLength {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::ExpectedNonEmptyData {
                context: owned_context,
            } => match owned_context {
                Some(x) => x.push_str(context),
                None => *owned_context = Some(context.to_string()),
            },
            DataProcessingError::ExpectedFiniteNonNanData {
                context: owned_context,
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::InvalidParameter {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
        }
        self
    }
}

impl Display for DataProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedSlicesSameLength {
                expected,
                other,
                context,
            } => write!(
                f,
                "Expected slices of the same length ({} vs {}) in {}",
                expected, other, context
            ),
            Self::ExpectedNonEmptyData { context } => match context {
                Some(c) => write!(f, "Expected non-empty data in {}", c),
                None => write!(f, "Expected non-empty data"),
            },
            Self::ExpectedFiniteNonNanData { context } => {
                write!(f, "Expected finite, non-NaN data in {}", context)
            }
            Self::InvalidParameter {
                name,
                value,
                context,
            } => write!(f, "Invalid value {} for {} in {}", value, name, context),
        }
    }
}

impl std::error::Error for DataProcessingError {}

#[derive(Debug)]
pub enum EicPeaksError {
    DataProcessing(DataProcessingError),
    /// Batch processing was stopped through a cancellation token.
    Cancelled {
        completed: usize,
        total: usize,
    },
}

impl Display for EicPeaksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataProcessing(e) => write!(f, "{}", e),
            Self::Cancelled { completed, total } => write!(
                f,
                "Processing cancelled after {}/{} chromatograms",
                completed, total
            ),
        }
    }
}

impl std::error::Error for EicPeaksError {}

impl From<DataProcessingError> for EicPeaksError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessing(x)
    }
}

pub type Result<T> = std::result::Result<T, EicPeaksError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_context() {
        let err = DataProcessingError::ExpectedNonEmptyData { context: None }
            .append_to_context("merge");
        assert_eq!(
            err,
            DataProcessingError::ExpectedNonEmptyData {
                context: Some("merge".to_string())
            }
        );

        let err = DataProcessingError::ExpectedSlicesSameLength {
            expected: 3,
            other: 2,
            context: "rt/".to_string(),
        }
        .append_to_context("intensity");
        assert_eq!(
            err.to_string(),
            "Expected slices of the same length (3 vs 2) in rt/intensity"
        );
    }
}
