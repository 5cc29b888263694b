//! Timing constraints derived from link configuration.

use crate::error::MoveRejected;
use crate::protocol::{Axis, PwmWindow};

use super::TimingConfig;

/// Derived timing parameters used for move admission.
///
/// Computed once at initialization and consulted for every admitted
/// pulse window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingConstraints {
    /// Motion tick period Δ in microseconds.
    pub tick_period_us: u32,

    /// Minimum width of a single step pulse level in microseconds.
    pub min_pulse_width_us: u32,
}

impl TimingConstraints {
    /// Build constraints directly from raw values.
    pub const fn new(tick_period_us: u32, min_pulse_width_us: u32) -> Self {
        Self {
            tick_period_us,
            min_pulse_width_us,
        }
    }

    /// Compute timing constraints from link configuration.
    pub fn from_config(config: &TimingConfig) -> Self {
        Self {
            tick_period_us: config.tick_period_us,
            min_pulse_width_us: config.min_pulse_width_us,
        }
    }

    /// Largest admissible tick count for a window of `duration_us`.
    ///
    /// Each tick is a toggle edge and a full step needs two edges, each
    /// held at least `min_pulse_width_us`.
    #[inline]
    pub const fn max_ticks(&self, duration_us: u32) -> u32 {
        duration_us / (2 * self.min_pulse_width_us)
    }

    /// Validate a pulse window against the pulse-width invariant.
    ///
    /// A window whose tick density exceeds the hardware limit on any
    /// axis is rejected, never clamped.
    pub fn admit(&self, window: &PwmWindow) -> Result<(), MoveRejected> {
        for axis in Axis::ALL {
            let ticks = window.ticks(axis);
            // u128: 2 * u32::MAX * u32::MAX does not fit in u64.
            let required = 2 * ticks as u128 * self.min_pulse_width_us as u128;
            if required > window.duration_us as u128 {
                return Err(MoveRejected::InvalidPulseDensity {
                    ticks,
                    duration_us: window.duration_us,
                });
            }
        }
        Ok(())
    }
}

impl Default for TimingConstraints {
    fn default() -> Self {
        Self::from_config(&TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_boundary() {
        let constraints = TimingConstraints::new(100, 5);
        assert_eq!(constraints.max_ticks(1000), 100);

        let at_limit = PwmWindow {
            duration_us: 1000,
            ticks_x: 100,
            ticks_y: 0,
            ticks_z: 0,
        };
        assert!(constraints.admit(&at_limit).is_ok());

        let over_limit = PwmWindow {
            ticks_y: 101,
            ..at_limit
        };
        assert_eq!(
            constraints.admit(&over_limit),
            Err(MoveRejected::InvalidPulseDensity {
                ticks: 101,
                duration_us: 1000,
            })
        );
    }

    #[test]
    fn zero_duration_rejects_any_ticks() {
        let constraints = TimingConstraints::new(100, 5);
        let window = PwmWindow {
            duration_us: 0,
            ticks_x: 1,
            ticks_y: 0,
            ticks_z: 0,
        };
        assert!(constraints.admit(&window).is_err());

        // A zero-length dwell is vacuously admissible.
        let dwell = PwmWindow {
            ticks_x: 0,
            ..window
        };
        assert!(constraints.admit(&dwell).is_ok());
    }

    #[test]
    fn admission_survives_wide_products() {
        let constraints = TimingConstraints::new(100, 5);
        let window = PwmWindow {
            duration_us: u32::MAX,
            ticks_x: u32::MAX,
            ticks_y: 0,
            ticks_z: 0,
        };
        // 2 * u32::MAX * 5 overflows u32 but not u64.
        assert!(constraints.admit(&window).is_err());
    }

    #[test]
    fn extreme_pulse_width_cannot_wrap_to_an_admit() {
        // 2 * (2^31 + 1) * (2^32 - 1) is 2^64 + 2^32 - 2, which wraps a
        // u64 product to 2^32 - 2, just under the window duration.
        let constraints = TimingConstraints::new(u32::MAX, u32::MAX);
        let window = PwmWindow {
            duration_us: u32::MAX,
            ticks_x: (1 << 31) + 1,
            ticks_y: 0,
            ticks_z: 0,
        };
        assert_eq!(
            constraints.admit(&window),
            Err(MoveRejected::InvalidPulseDensity {
                ticks: (1 << 31) + 1,
                duration_us: u32::MAX,
            })
        );
    }
}
