//! Timing utilities
//!
//! Loading and snapshot calls are timed so that slow fixtures show up in the
//! test log.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};
use log::{debug, warn};

/// Timer for a named engine operation
#[derive(Debug, Clone)]
pub struct Timer {
    /// Operation name
    name: String,

    /// Start time
    start: Instant,

    /// Duration above which the operation is reported as slow
    slow_threshold: Option<Duration>,
}

impl Timer {
    /// Start a timer for `name`
    pub fn start(name: impl Into<String>) -> Self {
        Timer {
            name: name.into(),
            start: Instant::now(),
            slow_threshold: None,
        }
    }

    /// Report the operation at warn level when it takes longer than
    /// `threshold`
    pub fn with_slow_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Whether the slow threshold has been exceeded
    pub fn is_slow(&self) -> bool {
        self.slow_threshold
            .map_or(false, |threshold| self.elapsed() > threshold)
    }

    /// Log the elapsed time with `outcome`, at warn level when slow
    pub fn finish(&self, outcome: impl Display) {
        if self.is_slow() {
            warn!("{} {} in {:?} [SLOW]", self.name, outcome, self.elapsed());
        } else {
            debug!("{} {} in {:?}", self.name, outcome, self.elapsed());
        }
    }

    /// Run `f` and log its duration
    pub fn measure<F, T>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let result = f();
        self.finish("completed");
        result
    }
}

impl Display for Timer {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {:?}", self.name, self.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_timer_basic() {
        let timer = Timer::start("load");
        thread::sleep(Duration::from_millis(10));

        assert!(timer.elapsed() >= Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10);
        assert!(timer.to_string().starts_with("load: "));
    }

    #[test]
    fn test_slow_threshold() {
        let timer = Timer::start("snapshot").with_slow_threshold(Some(Duration::from_millis(5)));
        assert!(!timer.is_slow());

        thread::sleep(Duration::from_millis(10));
        assert!(timer.is_slow());

        // No threshold, never slow
        let timer = Timer::start("snapshot").with_slow_threshold(None);
        thread::sleep(Duration::from_millis(2));
        assert!(!timer.is_slow());
    }

    #[test]
    fn test_measure() {
        let result = Timer::start("work").measure(|| 42);
        assert_eq!(result, 42);
    }
}
