// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Persisted state blob.
//!
//! Layout (little-endian):
//!
//! ```text
//! [MAGIC "CNSM"][SCHEMA u32]
//! [machine_id u32][flags u8][capacity u32][interval u32][max_retry u32]
//! [total_events u64][last_aggregation u32][last_sync u32][count u32]
//! [endpoint, 256 bytes NUL-padded][credential, 128 bytes NUL-padded]
//! [capacity x event (9 bytes), oldest first, unused slots zeroed]
//! [CRC-64 u64 over everything above]
//! ```
//!
//! Every slot is written whether or not it is occupied and the strings sit
//! in fixed-width fields, so the blob size depends only on the buffer
//! capacity.

pub mod encode;
pub mod decode;

use core::fmt;

use crate::config::{MAX_CREDENTIAL_LEN, MAX_ENDPOINT_LEN};
use crate::error::KernelError;

pub use decode::decode_state;
pub use encode::{encode_state, encode_to_vec, encoded_len};

pub const MAGIC: &[u8; 4] = b"CNSM";
pub const SCHEMA_VERSION: u32 = 1;

pub(crate) const FLAG_EXTERNAL_SYNC: u8 = 0b0000_0001;

/// Bytes before the variable-length strings.
pub(crate) const FIXED_HEADER_LEN: usize = 4 + 4 + 4 + 1 + 4 + 4 + 4 + 8 + 4 + 4 + 4;
pub(crate) const CHECKSUM_LEN: usize = 8;

pub(crate) const ENDPOINT_FIELD_LEN: usize = MAX_ENDPOINT_LEN + 1;
pub(crate) const CREDENTIAL_FIELD_LEN: usize = MAX_CREDENTIAL_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotError {
    BadMagic,
    UnsupportedSchema(u32),
    Truncated,
    ChecksumMismatch { expected: u64, found: u64 },
    /// Decoded fields violate a state invariant.
    Inconsistent(&'static str),
    /// Output buffer or a fixed-width field cannot hold the state.
    TooLarge,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::BadMagic => f.write_str("invalid magic bytes"),
            SnapshotError::UnsupportedSchema(v) => write!(f, "unsupported schema version {v}"),
            SnapshotError::Truncated => f.write_str("blob truncated"),
            SnapshotError::ChecksumMismatch { expected, found } => {
                write!(f, "checksum mismatch: expected {expected:#018x}, found {found:#018x}")
            }
            SnapshotError::Inconsistent(what) => write!(f, "inconsistent state: {what}"),
            SnapshotError::TooLarge => f.write_str("state does not fit the blob"),
        }
    }
}

impl From<SnapshotError> for KernelError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::TooLarge => KernelError::StorageFull,
            _ => KernelError::InvalidConfig,
        }
    }
}

pub(crate) fn checksum(bytes: &[u8]) -> u64 {
    let mut digest = crc64fast::Digest::new();
    digest.write(bytes);
    digest.sum64()
}
