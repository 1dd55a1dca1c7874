//! Galvani Hardware Abstraction Layer
//!
//! This crate defines the capability traits the Galvani driver core calls
//! into. Chip-specific crates implement them on top of the real register
//! map, pin multiplexer, and lock bookkeeping; host-side tests substitute
//! the simulated implementations from `galvani-sim`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / other block middleware   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  galvani-core (driver logic)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  galvani-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ chip-specific │       │  galvani-sim  │
//! │ implementation│       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`block::SharedBlock`] - lock bookkeeping, register writes, and
//!   conversion status of the shared analog block
//! - [`mux::OutputMux`] - connecting output pins to the analog buses
//!
//! Delays use `embedded_hal::delay::DelayNs` directly; there is no
//! Galvani-specific delay trait.

#![no_std]
#![deny(unsafe_code)]

pub mod block;
pub mod mux;

// Re-export key items at crate root for convenience
pub use block::{OwnerKey, Register, SharedBlock};
pub use mux::{AnalogBus, OutputMux, PinId};
