//! Latency measurement around arbitrary calls.

use std::time::{Duration, Instant};

use tracing::debug;

/// Result of a [`timed`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn into_parts(self) -> (T, Duration) {
        (self.value, self.elapsed)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Timed<U> {
        Timed {
            value: f(self.value),
            elapsed: self.elapsed,
        }
    }
}

/// Runs `f`, logging how long it took under `label`.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> Timed<T> {
    let started = Instant::now();
    let value = f();
    let elapsed = started.elapsed();
    debug!(target: "finance_core::timing", label, elapsed_us = elapsed.as_micros() as u64, "call finished");
    Timed { value, elapsed }
}

/// Formats a duration for status lines, e.g. `1.204 ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let micros = elapsed.as_micros();
    if micros < 1_000 {
        format!("{micros} µs")
    } else {
        format!("{:.3} ms", elapsed.as_secs_f64() * 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_returns_closure_value() {
        let outcome = timed("sum", || (1..=10).sum::<u32>());
        assert_eq!(outcome.value, 55);
        let (value, _) = outcome.map(|sum| sum * 2).into_parts();
        assert_eq!(value, 110);
    }

    #[test]
    fn timed_passes_errors_through() {
        let outcome: Timed<Result<(), &str>> = timed("failing", || Err("boom"));
        assert_eq!(outcome.value, Err("boom"));
    }

    #[test]
    fn elapsed_formatting_switches_units() {
        assert_eq!(format_elapsed(Duration::from_micros(250)), "250 µs");
        assert_eq!(format_elapsed(Duration::from_micros(1_500)), "1.500 ms");
    }
}
