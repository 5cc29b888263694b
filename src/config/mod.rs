//! Configuration module for triaxis-link.
//!
//! Provides types for loading and validating timing configuration from
//! TOML files (with `std` feature) or pre-parsed data.

#[cfg(feature = "std")]
mod loader;
mod timing;

use serde::Deserialize;

use crate::error::{ConfigError, Error, Result};

pub use timing::TimingConstraints;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkConfig {
    /// Timing parameters of the motion tick and step hardware.
    #[serde(default)]
    pub link: TimingConfig,
}

/// Timing parameters of the `[link]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Motion tick period Δ in microseconds.
    #[serde(default = "default_tick_period_us")]
    pub tick_period_us: u32,

    /// Minimum step pulse width in microseconds.
    #[serde(default = "default_min_pulse_width_us")]
    pub min_pulse_width_us: u32,
}

fn default_tick_period_us() -> u32 {
    100
}

fn default_min_pulse_width_us() -> u32 {
    5
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_us: default_tick_period_us(),
            min_pulse_width_us: default_min_pulse_width_us(),
        }
    }
}

/// Validate a link configuration.
///
/// Checks:
/// - Tick period is non-zero
/// - Minimum pulse width is non-zero
/// - A tick can host at least one held pulse level
pub fn validate_config(config: &LinkConfig) -> Result<()> {
    let timing = &config.link;

    if timing.tick_period_us == 0 {
        return Err(Error::Config(ConfigError::InvalidTickPeriod(
            timing.tick_period_us,
        )));
    }

    if timing.min_pulse_width_us == 0 {
        return Err(Error::Config(ConfigError::InvalidPulseWidth(
            timing.min_pulse_width_us,
        )));
    }

    if timing.tick_period_us < timing.min_pulse_width_us {
        return Err(Error::Config(ConfigError::TickShorterThanPulse {
            tick_period_us: timing.tick_period_us,
            min_pulse_width_us: timing.min_pulse_width_us,
        }));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LinkConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.link.tick_period_us, 100);
        assert_eq!(config.link.min_pulse_width_us, 5);
    }

    #[test]
    fn zero_tick_period_rejected() {
        let config = LinkConfig {
            link: TimingConfig {
                tick_period_us: 0,
                min_pulse_width_us: 5,
            },
        };
        assert_eq!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidTickPeriod(0)))
        );
    }

    #[test]
    fn tick_shorter_than_pulse_rejected() {
        let config = LinkConfig {
            link: TimingConfig {
                tick_period_us: 3,
                min_pulse_width_us: 5,
            },
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::TickShorterThanPulse { .. }))
        ));
    }
}
