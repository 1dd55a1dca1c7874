//! Simulated shared-block hardware
//!
//! Implements the `galvani-hal` capability traits against plain memory,
//! with an event log, so the driver core can be exercised and asserted
//! on a host without the real block. The simulation also offers a few
//! knobs real hardware exposes the hard way: an external owner seizing
//! the lock, a conversion that refuses to finish, a capture that fails
//! transiently.

#![no_std]
#![deny(unsafe_code)]

use core::cell::Cell;

use embedded_hal::delay::DelayNs;
use galvani_hal::{AnalogBus, OutputMux, OwnerKey, PinId, Register, SharedBlock};
use heapless::Vec;

/// Capacity of the per-peripheral event logs.
pub const EVENT_CAPACITY: usize = 64;

const REGISTER_COUNT: usize = Register::OutputB as usize + 1;

/// One observable interaction with the simulated block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockEvent {
    /// A register was replaced with a value
    Write(Register, u32),
    /// The lock was captured under a key
    Acquired(OwnerKey),
    /// A capture attempt was refused
    AcquireRefused(OwnerKey),
    /// The lock was released
    Released(OwnerKey),
    /// A release attempt presented the wrong key
    ReleaseRefused(OwnerKey),
}

/// Simulated shared analog block.
///
/// Trait calls are logged to [`SimBlock::events`] in order; the test
/// harness knobs ([`SimBlock::seize`], [`SimBlock::force_release`],
/// [`SimBlock::set_busy_polls`], [`SimBlock::refuse_acquire`]) are not,
/// so the log reflects only what the driver did.
pub struct SimBlock {
    holder: Option<OwnerKey>,
    busy_polls: Cell<u32>,
    acquire_refused: bool,
    registers: [u32; REGISTER_COUNT],
    /// Ordered log of driver interactions
    pub events: Vec<BlockEvent, EVENT_CAPACITY>,
}

impl SimBlock {
    pub fn new() -> Self {
        Self {
            holder: None,
            busy_polls: Cell::new(0),
            acquire_refused: false,
            registers: [0; REGISTER_COUNT],
            events: Vec::new(),
        }
    }

    /// Current contents of a register.
    pub fn register(&self, reg: Register) -> u32 {
        self.registers[reg as usize]
    }

    /// Let an external owner capture the lock behind the driver's back.
    pub fn seize(&mut self, key: OwnerKey) {
        self.holder = Some(key);
    }

    /// Drop whatever lock is held, regardless of key.
    pub fn force_release(&mut self) {
        self.holder = None;
    }

    /// Report an in-progress conversion for the next `polls` status
    /// reads. Use `u32::MAX` for a conversion that never finishes.
    pub fn set_busy_polls(&mut self, polls: u32) {
        self.busy_polls.set(polls);
    }

    /// Make every capture attempt fail, as a transient low-level
    /// initialization failure would.
    pub fn refuse_acquire(&mut self, refuse: bool) {
        self.acquire_refused = refuse;
    }

    fn log(&mut self, event: BlockEvent) {
        let _ = self.events.push(event);
    }
}

impl Default for SimBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedBlock for SimBlock {
    fn holder(&self) -> Option<OwnerKey> {
        self.holder
    }

    fn acquire(&mut self, key: OwnerKey) -> bool {
        if self.acquire_refused || self.holder.is_some() {
            self.log(BlockEvent::AcquireRefused(key));
            return false;
        }
        self.holder = Some(key);
        self.log(BlockEvent::Acquired(key));
        true
    }

    fn release(&mut self, key: OwnerKey) -> bool {
        if self.holder == Some(key) {
            self.holder = None;
            self.log(BlockEvent::Released(key));
            true
        } else {
            self.log(BlockEvent::ReleaseRefused(key));
            false
        }
    }

    fn write_register(&mut self, reg: Register, value: u32) {
        self.registers[reg as usize] = value;
        self.log(BlockEvent::Write(reg, value));
    }

    fn conversion_busy(&self) -> bool {
        let remaining = self.busy_polls.get();
        if remaining == 0 {
            return false;
        }
        if remaining != u32::MAX {
            self.busy_polls.set(remaining - 1);
        }
        true
    }
}

/// One observable interaction with the simulated pin multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxEvent {
    /// A pin was switched onto a bus
    Connected(PinId, AnalogBus),
    /// A pin was returned to its idle function
    Disconnected(PinId),
}

/// Simulated pin multiplexer.
#[derive(Default)]
pub struct SimMux {
    connections: Vec<(PinId, AnalogBus), 8>,
    /// Ordered log of driver interactions
    pub events: Vec<MuxEvent, EVENT_CAPACITY>,
}

impl SimMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bus a pin is currently switched onto, if any.
    pub fn bus_for(&self, pin: PinId) -> Option<AnalogBus> {
        self.connections
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, bus)| *bus)
    }
}

impl OutputMux for SimMux {
    fn connect(&mut self, pin: PinId, bus: AnalogBus) {
        self.connections.retain(|(p, _)| *p != pin);
        let _ = self.connections.push((pin, bus));
        let _ = self.events.push(MuxEvent::Connected(pin, bus));
    }

    fn disconnect(&mut self, pin: PinId) {
        self.connections.retain(|(p, _)| *p != pin);
        let _ = self.events.push(MuxEvent::Disconnected(pin));
    }
}

/// Simulated delay provider that only accumulates the requested time.
#[derive(Debug, Default)]
pub struct SimDelay {
    /// Total time the driver asked to wait, in nanoseconds
    pub elapsed_ns: u64,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: OwnerKey = OwnerKey(7);
    const OTHER: OwnerKey = OwnerKey(8);

    #[test]
    fn lock_honours_keys() {
        let mut block = SimBlock::new();
        assert_eq!(block.holder(), None);

        assert!(block.acquire(KEY));
        assert_eq!(block.holder(), Some(KEY));
        assert!(!block.acquire(OTHER));

        assert!(!block.release(OTHER));
        assert_eq!(block.holder(), Some(KEY));
        assert!(block.release(KEY));
        assert_eq!(block.holder(), None);
    }

    #[test]
    fn busy_counts_down_per_poll() {
        let block = SimBlock::new();
        assert!(!block.conversion_busy());

        block.busy_polls.set(2);
        assert!(block.conversion_busy());
        assert!(block.conversion_busy());
        assert!(!block.conversion_busy());
    }

    #[test]
    fn mux_tracks_one_bus_per_pin() {
        let mut mux = SimMux::new();
        let pin = PinId { port: 1, pin: 4 };

        mux.connect(pin, AnalogBus::A);
        assert_eq!(mux.bus_for(pin), Some(AnalogBus::A));

        mux.connect(pin, AnalogBus::B);
        assert_eq!(mux.bus_for(pin), Some(AnalogBus::B));

        mux.disconnect(pin);
        assert_eq!(mux.bus_for(pin), None);
    }
}
