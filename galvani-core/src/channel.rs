//! Per-channel output state
//!
//! The two channels are programmed and torn down independently; nothing
//! is shared between their records.

use galvani_hal::{AnalogBus, Register};

use crate::level::{Lsb, Polarity};

/// One of the two independent programmable outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    A = 0,
    B = 1,
}

impl Channel {
    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub(crate) const fn register(self) -> Register {
        match self {
            Channel::A => Register::OutputA,
            Channel::B => Register::OutputB,
        }
    }

    pub(crate) const fn bus(self) -> AnalogBus {
        match self {
            Channel::A => AnalogBus::A,
            Channel::B => AnalogBus::B,
        }
    }
}

/// Last-programmed settings of one channel.
///
/// `enabled` is true only while the channel has a connected destination
/// and these settings are the ones latched into hardware. Disabling a
/// channel clears the flag but keeps the settings for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelState {
    /// Current direction
    pub polarity: Polarity,
    /// Step size
    pub lsb: Lsb,
    /// Step count
    pub code: u8,
    /// Whether the output is live
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_map_to_distinct_hardware() {
        assert_ne!(Channel::A.register(), Channel::B.register());
        assert_ne!(Channel::A.bus(), Channel::B.bus());
        assert_ne!(Channel::A.index(), Channel::B.index());
    }

    #[test]
    fn default_state_is_disabled_at_zero() {
        let state = ChannelState::default();
        assert!(!state.enabled);
        assert_eq!(state.code, 0);
        assert_eq!(state.polarity, Polarity::Source);
        assert_eq!(state.lsb, Lsb::Lsb37);
    }
}
