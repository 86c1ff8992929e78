pub mod data_merger;
pub mod feels_like;
pub mod localizer;
pub mod merge_report;
pub mod pipeline;

pub use data_merger::DataMerger;
pub use feels_like::{FeelsLikeCalculator, FeelsLikeStats};
pub use localizer::{LocalizationStats, TimestampLocalizer};
pub use merge_report::MergeReport;
pub use pipeline::{DatasetPipeline, PreparedDatasets};
