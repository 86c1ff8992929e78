use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::JoinedRecord;
use crate::processors::PreparedDatasets;
use crate::utils::constants::{COMPRESSION_SNAPPY, DEFAULT_CHUNK_SIZE, TEST_OUTPUT_STEM, TRAIN_OUTPUT_STEM};
use crate::writers::{DataFrame, ParquetWriter, PickleWriter};
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pickle,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pickle => "pkl",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pickle => f.write_str("pickle"),
            OutputFormat::Parquet => f.write_str("parquet"),
        }
    }
}

/// Persists the joined train and test tables into an output directory.
pub struct DatasetWriter {
    format: OutputFormat,
    compression: String,
    chunk_size: usize,
}

impl DatasetWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            compression: COMPRESSION_SNAPPY.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Self {
        self.compression = compression.to_string();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn output_path(&self, output_dir: &Path, stem: &str) -> PathBuf {
        output_dir.join(format!("{}.{}", stem, self.format.extension()))
    }

    /// Write `train_data.*` and `test_data.*`, creating the directory if
    /// needed. Returns the written paths, train first.
    pub fn write(
        &self,
        datasets: &PreparedDatasets,
        config: &PipelineConfig,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;

        let mut written = Vec::with_capacity(2);
        for (stem, records) in [(TRAIN_OUTPUT_STEM, &datasets.train), (TEST_OUTPUT_STEM, &datasets.test)] {
            let path = self.output_path(output_dir, stem);
            self.write_table(records, config, &path)?;
            written.push(path);
        }
        Ok(written)
    }

    fn write_table(&self, records: &[JoinedRecord], config: &PipelineConfig, path: &Path) -> Result<()> {
        let frame = DataFrame::from_joined(records, config.include_feels_like);
        info!(
            "Writing {} rows x {} columns to {}",
            frame.num_rows(),
            frame.num_columns(),
            path.display()
        );

        match self.format {
            OutputFormat::Pickle => PickleWriter::new().write_frame(&frame, path),
            OutputFormat::Parquet => {
                let config_json = serde_json::to_string(config)?;
                ParquetWriter::new()
                    .with_compression(&self.compression)?
                    .with_metadata("pipeline_config", &config_json)
                    .write_frame_batched(&frame, path, self.chunk_size)
            }
        }
    }
}
