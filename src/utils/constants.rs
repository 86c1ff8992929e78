/// Input directory layout
pub const RAW_DIR: &str = "raw";
pub const EXTERNAL_DIR: &str = "external";

/// Input file names
pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";
pub const WEATHER_TRAIN_FILE: &str = "weather_train.csv";
pub const WEATHER_TEST_FILE: &str = "weather_test.csv";
pub const BUILDING_METADATA_FILE: &str = "building_metadata.csv";
pub const SITE_INFO_FILE: &str = "site_info.csv";

/// Output file stems
pub const TRAIN_OUTPUT_STEM: &str = "train_data";
pub const TEST_OUTPUT_STEM: &str = "test_data";

/// Default configuration file and environment prefix
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
pub const CONFIG_ENV_PREFIX: &str = "ENERGY_PREP";

/// Delimiters
pub const COMMA: u8 = b',';
pub const SEMICOLON: u8 = b';';

/// Timestamp text format used by the raw tables and the pickle output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Saturation vapor pressure constants (b, c) for T > 0 °C
pub const HUMIDITY_POSITIVE: (f64, f64) = (17.368, 238.88);
/// Saturation vapor pressure constants (b, c) for T <= 0 °C
pub const HUMIDITY_NEGATIVE: (f64, f64) = (17.966, 247.15);

/// NOAA feels-like regime thresholds (°F, wind speed units of the input)
pub const WIND_CHILL_MAX_TEMP_F: f64 = 50.0;
pub const WIND_CHILL_MIN_WIND: f64 = 3.0;
pub const HEAT_INDEX_MIN_TEMP_F: f64 = 80.0;

/// Iterative imputer defaults
pub const DEFAULT_IMPUTER_MAX_ITER: usize = 20;
pub const DEFAULT_IMPUTER_TOLERANCE: f64 = 1e-3;

/// Bayesian ridge defaults
pub const RIDGE_MAX_ITER: usize = 300;
pub const RIDGE_TOLERANCE: f64 = 1e-3;
pub const RIDGE_GAMMA_PRIOR: f64 = 1e-6;

/// Processing defaults
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_ROW_GROUP_SIZE: usize = 100_000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
