use crate::cli::args::Cli;
use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::processors::DatasetPipeline;
use crate::utils::progress::ProgressReporter;
use crate::utils::timer::timed;
use crate::writers::{DatasetWriter, OutputFormat, ParquetWriter};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, Level};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    if !cli.data_dir.is_dir() {
        return Err(ProcessingError::MissingData(format!(
            "data directory not found: {}",
            cli.data_dir.display()
        )));
    }

    let (config_path, config_required) = cli.config_source();
    let config = PipelineConfig::load(&config_path, config_required)?;
    info!("Configuration: {}", config.summary());
    info!(
        "Data: {}, output: {}, workers: {}",
        cli.data_dir.display(),
        cli.output_dir.display(),
        cli.max_workers
    );

    let progress = ProgressReporter::new_spinner("Preparing datasets...", false);

    let pipeline = DatasetPipeline::new(config.clone())
        .with_max_workers(cli.max_workers)
        .with_mmap(cli.mmap);
    let datasets = pipeline.run(&cli.data_dir, &progress).await?;

    progress.set_message("Saving datasets...");
    let writer = DatasetWriter::new(cli.format)
        .with_compression(&cli.compression)
        .with_chunk_size(cli.chunk_size);
    let written = timed("Save data", || writer.write(&datasets, &config, &cli.output_dir))?;

    progress.finish_with_message(&format!(
        "Prepared {} train and {} test rows",
        datasets.train.len(),
        datasets.test.len()
    ));

    if cli.format == OutputFormat::Parquet {
        let reader = ParquetWriter::new().with_compression(&cli.compression)?;
        for path in &written {
            let file_info = reader.get_file_info(path)?;
            info!("{}:\n{}", path.display(), file_info.summary());
        }
    }

    println!("Data successfully saved in folder: {}", cli.output_dir.display());
    Ok(())
}

/// Install the global fmt subscriber: INFO, or DEBUG when verbose. Logs go
/// to stderr, or without ANSI colors to `log_file` when given.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    installed.map_err(|e| ProcessingError::Config(format!("failed to initialize logging: {}", e)))
}
