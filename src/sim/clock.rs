//! Simulation clock

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_DT;

/// Elapsed simulation time and the delta of the latest tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Seconds since the session started
    pub elapsed: f32,
    /// Delta applied by the most recent tick
    pub delta: f32,
    /// Number of ticks applied
    pub ticks: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame and return the delta actually applied.
    ///
    /// Negative or non-finite deltas count as zero; long frames are clamped
    /// to [`MAX_FRAME_DT`].
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.delta = dt;
        self.elapsed += dt;
        self.ticks += 1;
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let mut clock = Clock::new();
        clock.advance(0.05);
        clock.advance(0.05);
        assert_eq!(clock.ticks, 2);
        assert!((clock.elapsed - 0.1).abs() < 1e-6);
        assert!((clock.delta - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_bad_deltas_are_sanitized() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(-1.0), 0.0);
        assert_eq!(clock.advance(f32::NAN), 0.0);
        assert_eq!(clock.advance(5.0), MAX_FRAME_DT);
        assert_eq!(clock.elapsed, MAX_FRAME_DT);
    }
}
