//! Shared analog block access
//!
//! The block is a single hardware resource time-shared between cooperating
//! subsystems. The low-level driver tracks ownership as a lock key; only
//! the subsystem presenting the matching key may program the block.

/// Token identifying which subsystem currently owns the shared block.
///
/// The value space is owned by the integrator; each middleware sharing the
/// block must present a distinct key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OwnerKey(pub u8);

/// Registers the driver core writes.
///
/// Offsets are opaque to the core; the implementation maps them onto the
/// real register file. Every write is a full replacement - the core never
/// performs read-modify-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Block mode configuration
    Config,
    /// Interrupt mask
    InterruptMask,
    /// Sequencer command (abort)
    SequencerStart,
    /// Output bypass switch selection
    BypassSelect,
    /// Reference generator switch selection
    RefgenSelect,
    /// Channel A output configuration
    OutputA,
    /// Channel B output configuration
    OutputB,
}

/// Low-level access to the shared block.
///
/// Implementations wrap the vendor register driver. All methods are
/// synchronous; none may block beyond the register access itself.
pub trait SharedBlock {
    /// Current lock holder, or `None` if the block is free.
    fn holder(&self) -> Option<OwnerKey>;

    /// Capture the block under `key` and apply the implementation's
    /// power-on defaults.
    ///
    /// Returns `false` if the capture failed (held elsewhere, or the
    /// low-level initialization did not complete).
    fn acquire(&mut self, key: OwnerKey) -> bool;

    /// Release the block, presenting the key it was captured under.
    ///
    /// Returns `false` if the block is not currently held under `key`.
    fn release(&mut self, key: OwnerKey) -> bool;

    /// Replace the contents of `reg` with `value`.
    fn write_register(&mut self, reg: Register, value: u32);

    /// Whether a conversion sequence is currently in progress.
    fn conversion_busy(&self) -> bool;
}

/// Forwarding implementation so a driver can borrow the block per call.
impl<T: SharedBlock + ?Sized> SharedBlock for &mut T {
    fn holder(&self) -> Option<OwnerKey> {
        T::holder(self)
    }

    fn acquire(&mut self, key: OwnerKey) -> bool {
        T::acquire(self, key)
    }

    fn release(&mut self, key: OwnerKey) -> bool {
        T::release(self, key)
    }

    fn write_register(&mut self, reg: Register, value: u32) {
        T::write_register(self, reg, value)
    }

    fn conversion_busy(&self) -> bool {
        T::conversion_busy(self)
    }
}
