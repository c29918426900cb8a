// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
#![no_std]

//! consumption-kernel: anonymous dispense-event tracking for vending devices.
//!
//! The kernel owns the bounded event store, the aggregation pass and the sync
//! scheduler state machine. It performs no I/O: clocks, storage and transports
//! are supplied by the host (see `consumption-node`).

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod error;
pub mod types;
pub mod event;
pub mod storage;
pub mod aggregate;
pub mod sync;
pub mod state;
pub mod snapshot;

#[cfg(test)]
pub mod tests;

/// Crate version reported to integrators.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
