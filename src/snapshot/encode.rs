// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Snapshot encoding.

use alloc::vec;
use alloc::vec::Vec;

use byteorder::{ByteOrder, LittleEndian};

use super::{
    checksum, SnapshotError, CHECKSUM_LEN, CREDENTIAL_FIELD_LEN, ENDPOINT_FIELD_LEN, FIXED_HEADER_LEN,
    FLAG_EXTERNAL_SYNC, MAGIC, SCHEMA_VERSION,
};
use crate::config::Config;
use crate::event::DispenseEvent;
use crate::state::ModuleState;

type Result<T> = core::result::Result<T, SnapshotError>;

/// Exact blob size for a module running with `config`. Only the buffer
/// capacity affects it.
pub fn encoded_len(config: &Config) -> usize {
    FIXED_HEADER_LEN
        + ENDPOINT_FIELD_LEN
        + CREDENTIAL_FIELD_LEN
        + config.capacity() * DispenseEvent::ENCODED_LEN
        + CHECKSUM_LEN
}

fn take<'a>(buf: &'a mut [u8], offset: &mut usize, len: usize) -> Result<&'a mut [u8]> {
    if *offset + len > buf.len() {
        return Err(SnapshotError::TooLarge);
    }
    let slice = &mut buf[*offset..*offset + len];
    *offset += len;
    Ok(slice)
}

fn write_u8(buf: &mut [u8], offset: &mut usize, val: u8) -> Result<()> {
    take(buf, offset, 1)?[0] = val;
    Ok(())
}

fn write_u32(buf: &mut [u8], offset: &mut usize, val: u32) -> Result<()> {
    LittleEndian::write_u32(take(buf, offset, 4)?, val);
    Ok(())
}

fn write_u64(buf: &mut [u8], offset: &mut usize, val: u64) -> Result<()> {
    LittleEndian::write_u64(take(buf, offset, 8)?, val);
    Ok(())
}

/// Writes `val` NUL-padded into a `width`-byte field. At least one NUL
/// always follows the text.
fn write_str(buf: &mut [u8], offset: &mut usize, val: &str, width: usize) -> Result<()> {
    if val.len() >= width {
        return Err(SnapshotError::TooLarge);
    }
    let field = take(buf, offset, width)?;
    field[..val.len()].copy_from_slice(val.as_bytes());
    field[val.len()..].fill(0);
    Ok(())
}

/// Writes the blob for `state` into `buf`, returning the bytes used.
///
/// The sync phase is not persisted; a restored module always starts idle.
pub fn encode_state(state: &ModuleState, buf: &mut [u8]) -> Result<usize> {
    let config = &state.config;
    let stats = state.stats();
    let mut offset = 0;

    // Header
    take(buf, &mut offset, 4)?.copy_from_slice(MAGIC);
    write_u32(buf, &mut offset, SCHEMA_VERSION)?;

    // Configuration
    write_u32(buf, &mut offset, config.machine_id.0)?;
    let flags = if config.enable_external_sync { FLAG_EXTERNAL_SYNC } else { 0 };
    write_u8(buf, &mut offset, flags)?;
    write_u32(buf, &mut offset, config.buffer_capacity)?;
    write_u32(buf, &mut offset, config.aggregation_interval_seconds)?;
    write_u32(buf, &mut offset, config.max_retry_attempts)?;

    // Counters and watermarks
    write_u64(buf, &mut offset, stats.total_events)?;
    write_u32(buf, &mut offset, stats.last_aggregation)?;
    write_u32(buf, &mut offset, stats.last_sync)?;
    write_u32(buf, &mut offset, stats.buffered_events)?;

    write_str(buf, &mut offset, &config.endpoint, ENDPOINT_FIELD_LEN)?;
    write_str(buf, &mut offset, &config.credential, CREDENTIAL_FIELD_LEN)?;

    // Slots, oldest first
    let mut written = 0;
    for event in state.ring.iter() {
        let slot: &mut [u8; DispenseEvent::ENCODED_LEN] = take(buf, &mut offset, DispenseEvent::ENCODED_LEN)?
            .try_into()
            .map_err(|_| SnapshotError::TooLarge)?;
        event.write_to(slot);
        written += 1;
    }
    let unused = (state.ring.capacity() - written) * DispenseEvent::ENCODED_LEN;
    take(buf, &mut offset, unused)?.fill(0);

    let crc = checksum(&buf[..offset]);
    write_u64(buf, &mut offset, crc)?;

    Ok(offset)
}

/// Allocates an exactly-sized buffer and encodes into it.
pub fn encode_to_vec(state: &ModuleState) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; encoded_len(&state.config)];
    let len = encode_state(state, &mut buf)?;
    buf.truncate(len);
    Ok(buf)
}
