//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! External dependencies (clock, asset ledger) are abstracted behind plain
//! values or traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem, network, or a real token contract
//!
//! Usage: hand a [`NullGateway`] to the engine and drive time with a [`NullClock`].

pub mod clock;
pub mod gateway;

pub use clock::NullClock;
pub use gateway::{Asset, NullGateway, Transfer};
