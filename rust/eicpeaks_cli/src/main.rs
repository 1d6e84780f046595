mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::{
    Config,
    InputConfig,
};

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();
    let config = Config::from_path(&args.config)?.with_cli_args(&args)?;
    info!("Parsed configuration: {:#?}", config);

    let (Some(InputConfig::Traces { path }), Some(output)) = (&config.input, &config.output) else {
        return Err(errors::CliError::Config {
            source: "Missing input or output configuration".to_string(),
        });
    };

    std::fs::create_dir_all(&output.directory).map_err(|e| errors::CliError::Io {
        source: e.to_string(),
        path: Some(output.directory.to_string_lossy().to_string()),
    })?;

    let mut chromatograms = processing::load_traces(path)?;
    info!("Loaded {} chromatograms", chromatograms.len());

    let groups = processing::run(&mut chromatograms, &config.analysis)?;
    processing::write_results(&output.directory, &chromatograms, &groups)?;
    Ok(())
}
