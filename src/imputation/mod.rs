pub mod bayesian_ridge;
pub mod iterative;
pub mod scaler;
pub mod timeline;
pub mod weather_imputer;

pub use bayesian_ridge::{BayesianRidge, GramStatistics, RidgeModel};
pub use iterative::{median, ImputeSummary, IterativeImputer};
pub use scaler::StandardScaler;
pub use timeline::{build_skeleton, distinct_sites, hourly_timeline, Skeleton};
pub use weather_imputer::{ImputationReport, WeatherImputer};
