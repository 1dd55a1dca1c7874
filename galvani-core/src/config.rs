//! Session configuration types

use galvani_hal::PinId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Output destination of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Route {
    /// No destination; the channel cannot be enabled.
    #[default]
    Unrouted,
    /// Dedicated pin, switched onto the channel's analog bus while the
    /// output is live.
    Pin(PinId),
    /// Output wired permanently to the shared analog bus; enabling and
    /// disabling skip the pin-switching step.
    BusOnly,
}

impl Route {
    /// Whether the channel has any destination at all.
    pub const fn is_routed(&self) -> bool {
        !matches!(self, Route::Unrouted)
    }

    /// The dedicated pin, if this route uses one.
    pub const fn pin(&self) -> Option<PinId> {
        match self {
            Route::Pin(pin) => Some(*pin),
            _ => None,
        }
    }
}

/// Hardware description of one session.
///
/// Copied into the session at construction and treated as read-only
/// thereafter; [`crate::Idac::reconfigure`] is the only way to replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Peripheral clock feeding the block, in Hz. Sizes the iteration
    /// budget of the conversion-abort watchdog.
    pub peri_clk_hz: u32,
    /// Settle time after the block powers up, in microseconds.
    pub settle_us: u16,
    /// Channel A destination
    pub route_a: Route,
    /// Channel B destination
    pub route_b: Route,
}

impl Config {
    pub(crate) const fn route(&self, ch: Channel) -> Route {
        match ch {
            Channel::A => self.route_a,
            Channel::B => self.route_b,
        }
    }
}
