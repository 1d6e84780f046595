use eicpeaks::ExtractionConfig;
use serde::{
    Deserialize,
    Serialize,
};
use std::path::{
    Path,
    PathBuf,
};

use crate::cli::Cli;
use crate::errors::CliError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub input: Option<InputConfig>,
    #[serde(default)]
    pub analysis: ExtractionConfig,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum InputConfig {
    /// JSON list of per-sample traces.
    #[serde(rename = "traces")]
    Traces { path: PathBuf },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let file = std::fs::File::open(path).map_err(|e| CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        })?;
        serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| CliError::ParseError { msg: e.to_string() })
    }

    /// Applies the command line overrides and checks that everything
    /// needed for a run is present.
    pub fn with_cli_args(mut self, args: &Cli) -> Result<Self, CliError> {
        if let Some(path) = &args.input {
            self.input = Some(InputConfig::Traces { path: path.clone() });
        }
        if let Some(directory) = &args.output_dir {
            self.output = Some(OutputConfig {
                directory: directory.clone(),
            });
        }

        if self.input.is_none() {
            return Err(CliError::Config {
                source: "No input provided, please provide one in either the config file or with the --input flag".to_string(),
            });
        }
        if self.output.is_none() {
            return Err(CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
        self.analysis.validate()?;
        Ok(self)
    }
}
