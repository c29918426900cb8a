// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.
//!
//! The discriminants are the numeric codes surfaced at the module boundary;
//! `0` is reserved for success.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelError {
    /// Configuration rejected, or the module is not initialized.
    InvalidConfig = 1,
    /// Persistent storage could not hold the state blob.
    StorageFull = 2,
    /// No transport is available to reach the collector.
    NetworkUnavailable = 3,
    /// Delivery failed, or a sync is already in flight.
    ApiError = 4,
    /// Event store allocation failed.
    MemoryError = 5,
    /// Request argument rejected without touching state.
    InvalidParameter = 6,
}

impl KernelError {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn describe(self) -> &'static str {
        match self {
            KernelError::InvalidConfig => "Invalid configuration",
            KernelError::StorageFull => "Storage full",
            KernelError::NetworkUnavailable => "Network unavailable",
            KernelError::ApiError => "API error",
            KernelError::MemoryError => "Memory allocation error",
            KernelError::InvalidParameter => "Invalid parameter",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(KernelError::InvalidConfig),
            2 => Some(KernelError::StorageFull),
            3 => Some(KernelError::NetworkUnavailable),
            4 => Some(KernelError::ApiError),
            5 => Some(KernelError::MemoryError),
            6 => Some(KernelError::InvalidParameter),
            _ => None,
        }
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;

/// Numeric boundary code for a result: `0` on success.
pub fn status_code<T>(result: &KernelResult<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}
