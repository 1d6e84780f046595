use eicpeaks::{
    DataProcessingError,
    EicPeaksError,
};

#[derive(Debug)]
pub enum CliError {
    Config { source: String },
    ParseError { msg: String },
    Io { source: String, path: Option<String> },
    Processing { source: String },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing input: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error accessing file {}: {}", path, source)
                } else {
                    write!(f, "Error accessing file: {}", source)
                }
            }
            CliError::Processing { source } => write!(f, "Error processing traces: {}", source),
        }
    }
}

impl std::error::Error for CliError {}

impl From<EicPeaksError> for CliError {
    fn from(e: EicPeaksError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}

impl From<DataProcessingError> for CliError {
    fn from(e: DataProcessingError) -> Self {
        CliError::Processing {
            source: e.to_string(),
        }
    }
}
