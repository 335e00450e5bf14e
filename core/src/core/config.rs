use std::fmt;

use super::clock::{
    DEFAULT_BASE_CLOCK_FREQUENCY, DEFAULT_TACTS_IN_FRAME, MAX_CLOCK_MULTIPLIER,
    MAX_TACTS_IN_FRAME, TactClock,
};
use crate::cpu::m6510::M6510Config;

/// Clock settings a machine is built with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineConfig {
    /// CPU clock at 1x, in Hz.
    pub base_clock_frequency: u32,
    /// Frame length at 1x, in tacts.
    pub tacts_in_frame: u32,
    /// Overclock factor applied at the next frame boundary.
    pub clock_multiplier: u32,
    /// Rate at which audio-style outputs (beeper level) are sampled, in Hz.
    pub sample_rate: u32,
    pub cpu: M6510Config,
}

impl MachineConfig {
    /// Reject settings the tact clock cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_clock_frequency == 0 {
            return Err(ConfigError::ZeroClockFrequency);
        }
        if self.tacts_in_frame == 0 {
            return Err(ConfigError::ZeroTactsInFrame);
        }
        if self.tacts_in_frame > MAX_TACTS_IN_FRAME {
            return Err(ConfigError::TactsInFrameTooLarge(self.tacts_in_frame));
        }
        if self.clock_multiplier == 0 || self.clock_multiplier > MAX_CLOCK_MULTIPLIER {
            return Err(ConfigError::InvalidClockMultiplier(self.clock_multiplier));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.sample_rate > self.base_clock_frequency {
            return Err(ConfigError::SampleRateAboveClock {
                sample_rate: self.sample_rate,
                clock: self.base_clock_frequency,
            });
        }
        Ok(())
    }

    /// Tact clock at 1x; the multiplier is applied by the frame driver.
    pub fn clock(&self) -> TactClock {
        TactClock::new(self.tacts_in_frame, self.base_clock_frequency)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            base_clock_frequency: DEFAULT_BASE_CLOCK_FREQUENCY,
            tacts_in_frame: DEFAULT_TACTS_IN_FRAME,
            clock_multiplier: 1,
            sample_rate: 44_100,
            cpu: M6510Config::default(),
        }
    }
}

/// Error type for machine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroClockFrequency,
    ZeroTactsInFrame,
    TactsInFrameTooLarge(u32),
    InvalidClockMultiplier(u32),
    ZeroSampleRate,
    SampleRateAboveClock { sample_rate: u32, clock: u32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroClockFrequency => write!(f, "base clock frequency must be non-zero"),
            ConfigError::ZeroTactsInFrame => write!(f, "tacts per frame must be non-zero"),
            ConfigError::TactsInFrameTooLarge(t) => write!(
                f,
                "{t} tacts per frame exceeds the maximum of {MAX_TACTS_IN_FRAME}"
            ),
            ConfigError::InvalidClockMultiplier(m) => write!(
                f,
                "clock multiplier {m} out of range (1..={MAX_CLOCK_MULTIPLIER})"
            ),
            ConfigError::ZeroSampleRate => write!(f, "sample rate must be non-zero"),
            ConfigError::SampleRateAboveClock { sample_rate, clock } => write!(
                f,
                "sample rate {sample_rate} Hz exceeds the {clock} Hz CPU clock"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(MachineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_tacts_in_frame_is_rejected() {
        let config = MachineConfig {
            tacts_in_frame: 0,
            ..MachineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTactsInFrame));
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let config = MachineConfig {
            tacts_in_frame: MAX_TACTS_IN_FRAME + 1,
            ..MachineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TactsInFrameTooLarge(MAX_TACTS_IN_FRAME + 1))
        );
    }

    #[test]
    fn multiplier_out_of_range_is_rejected() {
        let config = MachineConfig {
            clock_multiplier: 0,
            ..MachineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidClockMultiplier(0))
        );
        let config = MachineConfig {
            clock_multiplier: 25,
            ..MachineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_rate_must_fit_clock() {
        let config = MachineConfig {
            base_clock_frequency: 1000,
            sample_rate: 2000,
            ..MachineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SampleRateAboveClock { .. })
        ));
    }
}
