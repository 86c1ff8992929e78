use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::imputation::{ImputationReport, WeatherImputer};
use crate::models::{JoinedRecord, SiteInfo, SiteWeather, WeatherRecord};
use crate::processors::{DataMerger, FeelsLikeCalculator, MergeReport, TimestampLocalizer};
use crate::readers::{DatasetPaths, DatasetReader, RawTables};
use crate::utils::progress::ProgressReporter;
use crate::utils::timer::{timed, StageTimer};
use chrono::{NaiveDateTime, Utc};
use std::path::Path;
use tracing::info;

/// The two joined output tables plus per-table diagnostics.
#[derive(Debug)]
pub struct PreparedDatasets {
    pub train: Vec<JoinedRecord>,
    pub test: Vec<JoinedRecord>,
    pub train_report: MergeReport,
    pub test_report: MergeReport,
    pub train_imputation: Option<ImputationReport>,
    pub test_imputation: Option<ImputationReport>,
}

/// Load, merge, enrich and join the raw tables.
///
/// Stages run in a fixed order; the optional ones are switched by the
/// `PipelineConfig` the pipeline is built with.
pub struct DatasetPipeline {
    config: PipelineConfig,
    max_workers: usize,
    use_mmap: bool,
    reference_time: Option<NaiveDateTime>,
}

impl DatasetPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            max_workers: num_cpus::get(),
            use_mmap: false,
            reference_time: None,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Fix the instant the imputer measures elapsed time from.
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    pub async fn run(&self, data_dir: &Path, progress: &ProgressReporter) -> Result<PreparedDatasets> {
        progress.set_message("Reading raw tables...");
        let paths = DatasetPaths::from_data_dir(data_dir);
        let tables = {
            let _timer = StageTimer::start("Load data");
            DatasetReader::new()
                .with_mmap(self.use_mmap)
                .read_all(&paths)
                .await?
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        pool.install(|| self.process(tables, progress))
    }

    /// Every stage after loading.
    pub fn process(&self, tables: RawTables, progress: &ProgressReporter) -> Result<PreparedDatasets> {
        let RawTables {
            train,
            test,
            weather_train,
            weather_test,
            buildings,
            sites,
        } = tables;
        let merger = DataMerger::new();

        progress.set_message("Merging building metadata...");
        let (mut train, mut test) = timed("Merge building data", || {
            (
                merger.merge_buildings(train, &buildings),
                merger.merge_buildings(test, &buildings),
            )
        });

        let (weather_train, train_imputation) =
            self.prepare_weather("train", weather_train, &sites, progress)?;
        let (weather_test, test_imputation) =
            self.prepare_weather("test", weather_test, &sites, progress)?;

        progress.set_message("Merging weather...");
        timed("Merge weather data", || {
            merger.merge_weather(&mut train, weather_train);
            merger.merge_weather(&mut test, weather_test);
        });

        let train_report = MergeReport::from_records(&train);
        let test_report = MergeReport::from_records(&test);
        info!("{}", train_report.generate_summary("Train"));
        info!("{}", test_report.generate_summary("Test"));

        Ok(PreparedDatasets {
            train,
            test,
            train_report,
            test_report,
            train_imputation,
            test_imputation,
        })
    }

    /// Feels-like, imputation, site join and localization for one weather table.
    fn prepare_weather(
        &self,
        label: &str,
        mut weather: Vec<WeatherRecord>,
        sites: &[SiteInfo],
        progress: &ProgressReporter,
    ) -> Result<(Vec<SiteWeather>, Option<ImputationReport>)> {
        if self.config.include_feels_like {
            progress.set_message(&format!("Deriving feels-like temperature ({})...", label));
            timed(&format!("Feels-like temperature {}", label), || {
                FeelsLikeCalculator::new().apply(&mut weather)
            });
        }

        let mut report = None;
        if self.config.impute_weather_data {
            progress.set_message(&format!("Imputing weather ({})...", label));
            let imputer = WeatherImputer::new(self.config.imputation.clone())
                .with_reference_time(self.reference_time.unwrap_or_else(|| Utc::now().naive_utc()));
            let (imputed, stats) =
                timed(&format!("Impute weather {}", label), || imputer.impute(&weather))?;
            info!("Weather {} imputation: {}", label, stats.summary());
            weather = imputed;
            report = Some(stats);
        }

        let merger = DataMerger::new();
        let mut site_weather = timed(&format!("Merge site info {}", label), || {
            merger.merge_sites(weather, sites)
        });

        if self.config.localize_timestamps {
            progress.set_message(&format!("Localizing timestamps ({})...", label));
            let (localized, stats) = timed(&format!("Localize timestamps {}", label), || {
                TimestampLocalizer::new().localize(site_weather)
            })?;
            info!(
                "Weather {}: {} rows localized, {} DST duplicates collapsed",
                label, stats.output_rows, stats.collapsed_rows
            );
            site_weather = localized;
        }

        Ok((site_weather, report))
    }
}

impl Default for DatasetPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
