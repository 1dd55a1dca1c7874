//! Block ownership and output programming
//!
//! The shared block supports one function at a time; cooperating
//! middleware time-multiplexes it by saving its own state, releasing the
//! block, and restoring later. This module implements that protocol for
//! the current-output function plus the programming sequences for the two
//! output channels.
//!
//! # Usage
//!
//! ```ignore
//! let mut idac = Idac::new(config);
//! let grant = idac.init(&mut block, &mut mux, &mut delay)?;
//!
//! idac.enable(Channel::A, 123_456, &mut block, &mut mux)?;
//! // ... channel A sources 122.4 uA ...
//! idac.disable(Channel::A, &mut block, &mut mux)?;
//!
//! // Hand the block to another middleware, reclaim it later.
//! idac.save(grant, &mut block, &mut mux)?;
//! let grant = idac.restore(&mut block)?;
//! ```

use embedded_hal::delay::DelayNs;
use galvani_hal::{OutputMux, OwnerKey, Register, SharedBlock};

use crate::channel::{Channel, ChannelState};
use crate::config::{Config, Route};
use crate::error::Error;
use crate::level::{OutputLevel, MAX_CODE};

/// Lock key this driver presents when capturing the block.
pub const OWNER_KEY: OwnerKey = OwnerKey(4);

// Fixed register image applied on every successful capture.
const BLOCK_CONFIG_DEFAULT: u32 = 0x8000_1000;
const REFGEN_IBCB_ON: u32 = 0x0000_0010;

// Bypass switch-enable bits, one per channel with a destination.
const BYPASS_A_ENABLE: u32 = 0x0000_1000;
const BYPASS_B_ENABLE: u32 = 0x0001_0000;

// Output register layout.
const POLARITY_POS: u32 = 8;
const RANGE_POS: u32 = 22;
const LEG1_EN: u32 = 1 << 24;
const LEG2_EN: u32 = 1 << 25;

// Conversion abort.
const SEQUENCER_ABORT: u32 = 0x08;
const INTR_MASK_CLEAR: u32 = 0;
/// Approximate cost of one status poll, in peripheral clock cycles.
const ABORT_POLL_CYCLES: u32 = 5;
/// Abort watchdog timeout, in seconds.
const ABORT_TIMEOUT_S: u32 = 1;

/// Proof that the block is captured by this driver.
///
/// Returned by [`Idac::init`] and [`Idac::restore`], demanded by the
/// operations that only the owner may perform, and consumed by
/// [`Idac::save`]/[`Idac::deinit`]. It cannot be constructed elsewhere,
/// so holding one means a capture succeeded earlier. The runtime key
/// checks remain: another bus master can still seize the block out from
/// under a live grant, which the owner-only operations report as
/// [`Error::Locked`].
#[derive(Debug)]
#[must_use]
pub struct Grant {
    _priv: (),
}

/// Driver session for the current-output function of the shared block.
///
/// Owns a copy of the hardware description and the two channel records.
/// Hardware itself is passed into each operation as capability handles,
/// never stored, so one session never hides the block from the rest of
/// the system.
pub struct Idac {
    cfg: Config,
    channels: [ChannelState; 2],
}

impl Idac {
    /// Allocate a session with both channels disabled.
    ///
    /// `config` is copied in and treated as read-only until
    /// [`Idac::reconfigure`]. The session is not usable for output until
    /// [`Idac::init`] (or [`Idac::restore`]) has captured the block.
    pub fn new(config: Config) -> Self {
        Self {
            cfg: config,
            channels: [ChannelState::default(); 2],
        }
    }

    /// Capture the block and bring it to the default output state.
    ///
    /// Performs [`Idac::restore`], then forces both channels into the
    /// disabled/disconnected state and applies the wake-settle delay.
    /// Any capture failure is reported as [`Error::Locked`]; callers that
    /// need to distinguish a lock conflict from a transient low-level
    /// failure should call [`Idac::restore`] directly.
    pub fn init(
        &mut self,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
        delay: &mut impl DelayNs,
    ) -> Result<Grant, Error> {
        match self.restore(hw) {
            Ok(grant) => {
                self.disconnect(Channel::A, hw, mux);
                self.disconnect(Channel::B, hw, mux);
                self.settle(delay);
                Ok(grant)
            }
            Err(_) => Err(Error::Locked),
        }
    }

    /// Release the block and stop the session.
    ///
    /// Identical to [`Idac::save`]; a later [`Idac::init`] on a fresh
    /// session repeats the full initialization. Sessions that time-share
    /// the block should prefer the [`Idac::save`]/[`Idac::restore`] pair.
    pub fn deinit(
        &mut self,
        grant: Grant,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
    ) -> Result<(), Error> {
        self.save(grant, hw, mux)
    }

    /// Capture the block for this session (the "restore" half of
    /// time-multiplexing).
    ///
    /// Fails with [`Error::Locked`] while any owner - including this
    /// driver - already holds the block. If a previous owner left a
    /// conversion running, the sequencer is told to abort and the status
    /// is polled under a bounded iteration budget sized from the
    /// peripheral clock; on exhaustion the capture proceeds anyway.
    /// Fails with [`Error::Busy`] if the low-level capture itself does
    /// not complete. Session state is never touched, so a failed restore
    /// leaves the channel records exactly as [`Idac::save`] left them.
    pub fn restore(&mut self, hw: &mut impl SharedBlock) -> Result<Grant, Error> {
        if hw.holder().is_some() {
            return Err(Error::Locked);
        }

        if hw.conversion_busy() {
            hw.write_register(Register::InterruptMask, INTR_MASK_CLEAR);
            hw.write_register(Register::SequencerStart, SEQUENCER_ABORT);

            // Bounded wait; on timeout the capture proceeds regardless.
            let mut budget = ABORT_TIMEOUT_S * self.cfg.peri_clk_hz / ABORT_POLL_CYCLES;
            while hw.conversion_busy() && budget != 0 {
                budget -= 1;
            }
        }

        if !hw.acquire(OWNER_KEY) {
            return Err(Error::Busy);
        }

        hw.write_register(Register::Config, BLOCK_CONFIG_DEFAULT);
        hw.write_register(Register::RefgenSelect, REFGEN_IBCB_ON);
        hw.write_register(Register::BypassSelect, self.bypass_bits());
        hw.write_register(Register::OutputA, 0);
        hw.write_register(Register::OutputB, 0);

        Ok(Grant { _priv: () })
    }

    /// Release the block so another middleware can capture it.
    ///
    /// Fails with [`Error::Locked`] if the block is not actually held
    /// under this driver's key (the grant was stale). On success both
    /// channels are forced into the disabled/disconnected state; their
    /// last-programmed settings stay readable for the next restore.
    pub fn save(
        &mut self,
        grant: Grant,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
    ) -> Result<(), Error> {
        let _ = grant;
        if !hw.release(OWNER_KEY) {
            return Err(Error::Locked);
        }

        self.disconnect(Channel::A, hw, mux);
        self.disconnect(Channel::B, hw, mux);
        Ok(())
    }

    /// Replace the session configuration.
    ///
    /// Fails with [`Error::Locked`] unless the block is currently held
    /// under this driver's key, and with [`Error::Busy`] while either
    /// output is live. On success the bypass switch-enable bits are
    /// recomputed and written; both channels stay disabled until the
    /// caller re-enables them.
    pub fn reconfigure(
        &mut self,
        grant: &Grant,
        config: &Config,
        hw: &mut impl SharedBlock,
    ) -> Result<(), Error> {
        let _ = grant;
        if hw.holder() != Some(OWNER_KEY) {
            return Err(Error::Locked);
        }
        if self.channels.iter().any(|ch| ch.enabled) {
            return Err(Error::Busy);
        }

        self.cfg = *config;
        hw.write_register(Register::BypassSelect, self.bypass_bits());
        Ok(())
    }

    /// Enable an output with the given current.
    ///
    /// Positive currents source, negative currents sink. The request is
    /// quantized onto the step table (see [`OutputLevel::from_nanoamps`])
    /// and programmed via [`Idac::enable_level`].
    pub fn enable(
        &mut self,
        ch: Channel,
        current_na: i32,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
    ) -> Result<(), Error> {
        let level = OutputLevel::from_nanoamps(current_na)?;
        self.enable_level(ch, level, hw, mux)
    }

    /// Enable an output with an explicit polarity, step size, and count.
    ///
    /// Fails with [`Error::BadParam`] if the count exceeds
    /// [`MAX_CODE`](crate::MAX_CODE) or the channel has no destination
    /// configured; nothing is touched until validation passes. Otherwise
    /// the level is recorded, the channel register is written, and for
    /// pin-routed channels the pin is switched onto the channel's bus.
    pub fn enable_level(
        &mut self,
        ch: Channel,
        level: OutputLevel,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
    ) -> Result<(), Error> {
        if u32::from(level.code) > MAX_CODE {
            return Err(Error::BadParam);
        }
        let route = self.cfg.route(ch);
        if !route.is_routed() {
            return Err(Error::BadParam);
        }

        let state = &mut self.channels[ch.index()];
        state.polarity = level.polarity;
        state.lsb = level.lsb;
        state.code = level.code;
        state.enabled = true;

        hw.write_register(ch.register(), output_word(&level));
        if let Route::Pin(pin) = route {
            mux.connect(pin, ch.bus());
        }
        Ok(())
    }

    /// Disable an output.
    ///
    /// Writes zero to the channel register, disconnects the pin for
    /// pin-routed channels, and clears the enabled flag; the
    /// last-programmed settings stay readable. Idempotent - disabling a
    /// disabled channel repeats the same writes with no state change.
    pub fn disable(
        &mut self,
        ch: Channel,
        hw: &mut impl SharedBlock,
        mux: &mut impl OutputMux,
    ) -> Result<(), Error> {
        self.disconnect(ch, hw, mux);
        Ok(())
    }

    /// Whether the system may enter deep sleep.
    ///
    /// Not ready exactly while this driver holds the block and at least
    /// one output is live; the power-mode transition callback should
    /// veto the transition in that case. Pure predicate, no mutation.
    pub fn deep_sleep_ready(&self, hw: &impl SharedBlock) -> bool {
        let holding = hw.holder() == Some(OWNER_KEY);
        let live = self.channels.iter().any(|ch| ch.enabled);
        !(holding && live)
    }

    /// Let the block settle after a power-up.
    ///
    /// Applies the configured settle time. Call after the system exits
    /// deep sleep; [`Idac::init`] applies it automatically.
    pub fn settle(&self, delay: &mut impl DelayNs) {
        delay.delay_us(u32::from(self.cfg.settle_us));
    }

    /// Last-programmed state of a channel.
    pub fn channel(&self, ch: Channel) -> ChannelState {
        self.channels[ch.index()]
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn bypass_bits(&self) -> u32 {
        let mut bits = 0;
        if self.cfg.route_a.is_routed() {
            bits |= BYPASS_A_ENABLE;
        }
        if self.cfg.route_b.is_routed() {
            bits |= BYPASS_B_ENABLE;
        }
        bits
    }

    fn disconnect(&mut self, ch: Channel, hw: &mut impl SharedBlock, mux: &mut impl OutputMux) {
        hw.write_register(ch.register(), 0);
        if let Route::Pin(pin) = self.cfg.route(ch) {
            mux.disconnect(pin);
        }
        self.channels[ch.index()].enabled = false;
    }
}

/// Build the single register word that latches an output level.
fn output_word(level: &OutputLevel) -> u32 {
    let index = u32::from(level.lsb.index());
    let mut word = u32::from(level.code);
    word |= (level.polarity as u32) << POLARITY_POS;
    word |= (index >> 1) << RANGE_POS;
    word |= LEG1_EN;
    // Each range setting covers a step-size pair; the odd index of the
    // pair needs the second output leg.
    if index % 2 != 0 {
        word |= LEG2_EN;
    }
    word
}
