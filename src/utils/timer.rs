use std::time::{Duration, Instant};
use tracing::info;

/// Logs the start of a named stage and its elapsed time when dropped.
pub struct StageTimer {
    name: String,
    started: Instant,
}

impl StageTimer {
    pub fn start(name: &str) -> Self {
        info!("[{}] - started", name);
        Self {
            name: name.to_string(),
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        info!(
            "[{}] - done in {:.2}s",
            self.name,
            self.started.elapsed().as_secs_f64()
        );
    }
}

/// Run `f` inside a [`StageTimer`] named `name`.
pub fn timed<T, F>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let _timer = StageTimer::start(name);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_closure_value() {
        let value = timed("Adding", || 2 + 3);
        assert_eq!(value, 5);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let timer = StageTimer::start("Sleeping");
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed() >= Duration::from_millis(5));
    }
}
