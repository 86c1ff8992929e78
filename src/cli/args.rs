use crate::utils::constants::{COMPRESSION_SNAPPY, DEFAULT_CHUNK_SIZE, DEFAULT_CONFIG_FILE};
use crate::writers::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "energy-prep")]
#[command(about = "Prepare joined train/test tables from raw energy-meter and weather data")]
#[command(version)]
pub struct Cli {
    /// Directory holding raw/ and external/ input tables
    pub data_dir: PathBuf,

    /// Directory the prepared tables are written to
    pub output_dir: PathBuf,

    #[arg(long, help = "Pipeline configuration (YAML) [default: config.yml]")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pickle)]
    pub format: OutputFormat,

    #[arg(short, long, default_value = COMPRESSION_SNAPPY, help = "Parquet compression codec")]
    pub compression: String,

    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, help = "Rows per Parquet write batch")]
    pub chunk_size: usize,

    #[arg(long, default_value_t = num_cpus::get())]
    pub max_workers: usize,

    #[arg(long, help = "Memory-map the large input tables")]
    pub mmap: bool,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Configuration path and whether it must exist. A path given with
    /// `--config` is required; the default `config.yml` is optional.
    pub fn config_source(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["energy-prep", "data", "data/processed"]);

        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert_eq!(cli.output_dir, PathBuf::from("data/processed"));
        assert_eq!(cli.format, OutputFormat::Pickle);
        assert_eq!(cli.compression, "snappy");
        assert_eq!(cli.config_source(), (PathBuf::from("config.yml"), false));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_explicit_options() {
        let cli = Cli::parse_from([
            "energy-prep",
            "data",
            "out",
            "--config",
            "pipeline.yml",
            "--format",
            "parquet",
            "-c",
            "zstd",
            "--max-workers",
            "2",
            "-v",
        ]);

        assert_eq!(cli.format, OutputFormat::Parquet);
        assert_eq!(cli.compression, "zstd");
        assert_eq!(cli.max_workers, 2);
        assert_eq!(cli.config_source(), (PathBuf::from("pipeline.yml"), true));
        assert!(cli.verbose);
    }

    #[test]
    fn test_explicit_default_name_is_required() {
        let cli = Cli::parse_from(["energy-prep", "data", "out", "--config", "config.yml"]);
        assert_eq!(cli.config_source(), (PathBuf::from("config.yml"), true));
    }

    #[test]
    fn test_both_paths_required() {
        assert!(Cli::try_parse_from(["energy-prep", "data"]).is_err());
    }
}
