//! Time calculation utilities for scroll animations
//!
//! Provides pure functions for fixed-tick progress and interpolation.

use std::time::Duration;

/// Fixed tick interval of the animation loop in milliseconds (~60fps)
pub const TICK_MS: u64 = 16;

/// Tick interval as Duration
#[inline]
pub fn tick_duration() -> Duration {
    Duration::from_millis(TICK_MS)
}

/// Calculate animation progress from elapsed and total milliseconds
///
/// Clamped to at most 1.0 but never clamped below 0. A zero duration
/// saturates immediately.
#[inline]
pub fn progress(elapsed_ms: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    let ratio = elapsed_ms as f64 / duration_ms as f64;
    if ratio > 1.0 {
        1.0
    } else {
        ratio
    }
}

/// Direction factor for a scroll from `start` towards `to`
///
/// `+1` when moving towards larger offsets (or not moving), `-1` otherwise.
#[inline]
pub fn direction(start: f64, to: f64) -> f64 {
    if start - to <= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Position reached after travelling `eased` of `distance` from `start`
#[inline]
pub fn interpolate(start: f64, direction: f64, distance: f64, eased: f64) -> f64 {
    start + direction * distance * eased
}

/// Number of ticks needed for the elapsed time to reach `duration_ms`
#[inline]
pub fn ticks_to_complete(duration_ms: u64) -> u64 {
    duration_ms.div_ceil(TICK_MS).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_clamps_at_one() {
        assert!((progress(16, 160) - 0.1).abs() < 1e-12);
        assert!((progress(160, 160) - 1.0).abs() < 1e-12);
        assert!((progress(176, 160) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(16, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_direction() {
        assert_eq!(direction(0.0, 100.0), 1.0);
        assert_eq!(direction(100.0, 100.0), 1.0);
        assert_eq!(direction(200.0, 100.0), -1.0);
    }

    #[test]
    fn test_interpolate() {
        assert!((interpolate(0.0, 1.0, 1000.0, 0.5) - 500.0).abs() < 1e-12);
        assert!((interpolate(800.0, -1.0, 300.0, 1.0) - 500.0).abs() < 1e-12);
    }

    #[test]
    fn test_ticks_to_complete() {
        assert_eq!(ticks_to_complete(160), 10);
        assert_eq!(ticks_to_complete(650), 41);
        assert_eq!(ticks_to_complete(0), 1);
    }
}
