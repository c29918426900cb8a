// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Configuration record and admission rules.

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, KernelResult};
use crate::types::id::MachineId;

/// Upper bound on the event store size.
pub const MAX_BUFFER_CAPACITY: u32 = 10_000;

pub const DEFAULT_MACHINE_ID: u32 = 1;
pub const DEFAULT_BUFFER_CAPACITY: u32 = 1000;
/// One hour.
pub const DEFAULT_AGGREGATION_INTERVAL_SECS: u32 = 3600;
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_ENDPOINT: &str = "https://api.example.com/consumption";

/// Longest endpoint URL, in bytes. The persisted field is one byte wider.
pub const MAX_ENDPOINT_LEN: usize = 255;
/// Longest credential, in bytes. The persisted field is one byte wider.
pub const MAX_CREDENTIAL_LEN: usize = 127;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub machine_id: MachineId,
    pub enable_external_sync: bool,
    /// Fixed for the lifetime of an initialized module.
    pub buffer_capacity: u32,
    pub aggregation_interval_seconds: u32,
    pub endpoint: String,
    pub credential: String,
    pub max_retry_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            machine_id: MachineId(DEFAULT_MACHINE_ID),
            enable_external_sync: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            aggregation_interval_seconds: DEFAULT_AGGREGATION_INTERVAL_SECS,
            endpoint: String::from(DEFAULT_ENDPOINT),
            credential: String::new(),
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
        }
    }
}

impl Config {
    /// Admission check applied before any configuration is accepted.
    pub fn validate(&self) -> KernelResult<()> {
        if !self.machine_id.is_assigned() {
            return Err(KernelError::InvalidConfig);
        }
        if self.buffer_capacity == 0 || self.buffer_capacity > MAX_BUFFER_CAPACITY {
            return Err(KernelError::InvalidConfig);
        }
        // Strings are stored NUL-padded in fixed-width fields.
        if !fits_field(&self.endpoint, MAX_ENDPOINT_LEN) || !fits_field(&self.credential, MAX_CREDENTIAL_LEN) {
            return Err(KernelError::InvalidConfig);
        }
        Ok(())
    }

    /// Checks `next` as a runtime replacement for `self`.
    ///
    /// The event store is sized once at init, so any capacity change is
    /// refused with `InvalidParameter` even when `next` is otherwise valid.
    pub fn check_runtime_update(&self, next: &Config) -> KernelResult<()> {
        next.validate()?;
        if next.buffer_capacity != self.buffer_capacity {
            return Err(KernelError::InvalidParameter);
        }
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.buffer_capacity as usize
    }

    /// Transport sends per sync attempt. Zero configured retries still sends once.
    pub fn send_attempts(&self) -> u32 {
        self.max_retry_attempts.max(1)
    }
}

fn fits_field(value: &str, max_len: usize) -> bool {
    value.len() <= max_len && !value.as_bytes().contains(&0)
}

// Credentials stay out of log output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("machine_id", &self.machine_id)
            .field("enable_external_sync", &self.enable_external_sync)
            .field("buffer_capacity", &self.buffer_capacity)
            .field("aggregation_interval_seconds", &self.aggregation_interval_seconds)
            .field("endpoint", &self.endpoint)
            .field("credential", &if self.credential.is_empty() { "" } else { "<redacted>" })
            .field("max_retry_attempts", &self.max_retry_attempts)
            .finish()
    }
}
