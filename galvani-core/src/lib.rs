//! Board-agnostic driver for a shared two-channel current-output block
//!
//! The block offers two programmable current sources (channels A and B)
//! and is time-shared with other middleware that uses the same analog
//! hardware. This crate contains everything that does not depend on a
//! specific chip:
//!
//! - Current quantization (physical nanoamps to polarity/step/count)
//! - Per-channel output state
//! - The acquire/release protocol around the shared block, including
//!   recovery from a conversion left running by a previous owner
//! - Output programming and pin routing
//!
//! Hardware access goes through the capability traits in `galvani-hal`,
//! passed into each operation, so the driver can be exercised against the
//! simulated block in `galvani-sim`.

#![no_std]
#![deny(unsafe_code)]

pub mod channel;
pub mod config;
pub mod error;
pub mod level;
pub mod session;

pub use channel::{Channel, ChannelState};
pub use config::{Config, Route};
pub use error::Error;
pub use level::{Lsb, OutputLevel, Polarity, MAX_CODE, MAX_CURRENT_NA};
pub use session::{Grant, Idac, OWNER_KEY};
