use crate::error::{ProcessingError, Result};
use crate::models::{BuildingMetadata, MeterReading, SiteInfo, WeatherRecord};
use crate::readers::{TableReader, TableRecord};
use crate::utils::constants::{
    BUILDING_METADATA_FILE, COMMA, EXTERNAL_DIR, RAW_DIR, SEMICOLON, SITE_INFO_FILE, TEST_FILE,
    TRAIN_FILE, WEATHER_TEST_FILE, WEATHER_TRAIN_FILE,
};
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::info;

/// Paths of the six input tables under a data directory.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub train: PathBuf,
    pub test: PathBuf,
    pub weather_train: PathBuf,
    pub weather_test: PathBuf,
    pub building_metadata: PathBuf,
    pub site_info: PathBuf,
}

impl DatasetPaths {
    /// `raw/` holds the competition tables, `external/` the site info.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        let raw = data_dir.join(RAW_DIR);
        Self {
            train: raw.join(TRAIN_FILE),
            test: raw.join(TEST_FILE),
            weather_train: raw.join(WEATHER_TRAIN_FILE),
            weather_test: raw.join(WEATHER_TEST_FILE),
            building_metadata: raw.join(BUILDING_METADATA_FILE),
            site_info: data_dir.join(EXTERNAL_DIR).join(SITE_INFO_FILE),
        }
    }

    pub fn all(&self) -> [&Path; 6] {
        [
            self.train.as_path(),
            self.test.as_path(),
            self.weather_train.as_path(),
            self.weather_test.as_path(),
            self.building_metadata.as_path(),
            self.site_info.as_path(),
        ]
    }

    /// Fail early with the first missing input file.
    pub fn ensure_exist(&self) -> Result<()> {
        match self.all().into_iter().find(|p| !p.is_file()) {
            Some(missing) => Err(ProcessingError::MissingData(format!(
                "input file not found: {}",
                missing.display()
            ))),
            None => Ok(()),
        }
    }
}

/// Every raw table, loaded.
#[derive(Debug)]
pub struct RawTables {
    pub train: Vec<MeterReading>,
    pub test: Vec<MeterReading>,
    pub weather_train: Vec<WeatherRecord>,
    pub weather_test: Vec<WeatherRecord>,
    pub buildings: Vec<BuildingMetadata>,
    pub sites: Vec<SiteInfo>,
}

/// Loads the six tables concurrently on blocking tasks.
pub struct DatasetReader {
    use_mmap: bool,
}

impl DatasetReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub async fn read_all(&self, paths: &DatasetPaths) -> Result<RawTables> {
        paths.ensure_exist()?;

        let train = Self::spawn_read::<MeterReading>(paths.train.clone(), COMMA, self.use_mmap);
        let test = Self::spawn_read::<MeterReading>(paths.test.clone(), COMMA, self.use_mmap);
        let weather_train =
            Self::spawn_read::<WeatherRecord>(paths.weather_train.clone(), COMMA, self.use_mmap);
        let weather_test =
            Self::spawn_read::<WeatherRecord>(paths.weather_test.clone(), COMMA, self.use_mmap);
        let buildings =
            Self::spawn_read::<BuildingMetadata>(paths.building_metadata.clone(), COMMA, false);
        let sites = Self::spawn_read::<SiteInfo>(paths.site_info.clone(), SEMICOLON, false);

        let (train, test, weather_train, weather_test, buildings, sites) =
            tokio::try_join!(train, test, weather_train, weather_test, buildings, sites)?;

        let tables = RawTables {
            train: train?,
            test: test?,
            weather_train: weather_train?,
            weather_test: weather_test?,
            buildings: buildings?,
            sites: sites?,
        };

        info!(
            "Loaded train={} test={} weather_train={} weather_test={} buildings={} sites={}",
            tables.train.len(),
            tables.test.len(),
            tables.weather_train.len(),
            tables.weather_test.len(),
            tables.buildings.len(),
            tables.sites.len()
        );

        Ok(tables)
    }

    fn spawn_read<T>(path: PathBuf, delimiter: u8, use_mmap: bool) -> JoinHandle<Result<Vec<T>>>
    where
        T: TableRecord + Send + 'static,
    {
        tokio::task::spawn_blocking(move || {
            TableReader::new()
                .with_delimiter(delimiter)
                .with_mmap(use_mmap)
                .read::<T>(&path)
        })
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}
