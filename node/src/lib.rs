// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! consumption-node: host layer for the consumption kernel.
//!
//! Wraps the kernel's module state in a thread-safe [`tracker::Tracker`]
//! and supplies the platform pieces a device needs: wall clock, file-backed
//! blob storage, HTTPS and MQTT transports, and telemetry.

pub mod config;
pub mod errors;
pub mod platform;
pub mod storage;
pub mod telemetry;
pub mod tracker;
pub mod transport;
pub mod wire;

pub use consumption_kernel::config::Config;
pub use consumption_kernel::error::KernelError;
pub use consumption_kernel::state::Stats;
pub use errors::TrackerError;
pub use tracker::{SyncOutcome, Tracker};
