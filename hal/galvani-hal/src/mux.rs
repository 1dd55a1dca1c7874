//! Analog output multiplexing
//!
//! Each output channel drives a shared analog bus. A channel routed to a
//! dedicated pin additionally needs that pin switched onto the bus while
//! the output is live; bus-only channels skip this step.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Location of an output pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinId {
    /// IO port number
    pub port: u8,
    /// Pin number within the port
    pub pin: u8,
}

/// The analog bus an output channel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogBus {
    /// Bus served by output channel A
    A,
    /// Bus served by output channel B
    B,
}

/// Pin-to-bus switching.
///
/// Implementations wrap the vendor pin-multiplexer driver. Connecting a
/// pin that is already connected replaces the previous routing.
pub trait OutputMux {
    /// Switch `pin` onto `bus`.
    fn connect(&mut self, pin: PinId, bus: AnalogBus);

    /// Return `pin` to its idle (disconnected) function.
    fn disconnect(&mut self, pin: PinId);
}

impl<T: OutputMux + ?Sized> OutputMux for &mut T {
    fn connect(&mut self, pin: PinId, bus: AnalogBus) {
        T::connect(self, pin, bus)
    }

    fn disconnect(&mut self, pin: PinId) {
        T::disconnect(self, pin)
    }
}
