pub mod constants;
pub mod progress;
pub mod timer;

pub use constants::*;
pub use progress::ProgressReporter;
pub use timer::{timed, StageTimer};
