// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Snapshot decoding.

use alloc::string::String;

use byteorder::{ByteOrder, LittleEndian};

use super::{
    checksum, SnapshotError, CHECKSUM_LEN, CREDENTIAL_FIELD_LEN, ENDPOINT_FIELD_LEN, FIXED_HEADER_LEN,
    FLAG_EXTERNAL_SYNC, MAGIC, SCHEMA_VERSION,
};
use crate::config::Config;
use crate::event::DispenseEvent;
use crate::state::ModuleState;
use crate::storage::ring::EventRing;
use crate::sync::SyncScheduler;
use crate::types::id::MachineId;

type Result<T> = core::result::Result<T, SnapshotError>;

fn take<'a>(buf: &'a [u8], offset: &mut usize, len: usize) -> Result<&'a [u8]> {
    if *offset + len > buf.len() {
        return Err(SnapshotError::Truncated);
    }
    let slice = &buf[*offset..*offset + len];
    *offset += len;
    Ok(slice)
}

fn read_u8(buf: &[u8], offset: &mut usize) -> Result<u8> {
    Ok(take(buf, offset, 1)?[0])
}

fn read_u32(buf: &[u8], offset: &mut usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(take(buf, offset, 4)?))
}

fn read_u64(buf: &[u8], offset: &mut usize) -> Result<u64> {
    Ok(LittleEndian::read_u64(take(buf, offset, 8)?))
}

fn read_str(buf: &[u8], offset: &mut usize, width: usize) -> Result<String> {
    let field = take(buf, offset, width)?;
    let len = field
        .iter()
        .position(|&b| b == 0)
        .ok_or(SnapshotError::Inconsistent("string field is not terminated"))?;
    if field[len..].iter().any(|&b| b != 0) {
        return Err(SnapshotError::Inconsistent("string field padding is not zeroed"));
    }
    core::str::from_utf8(&field[..len])
        .map(String::from)
        .map_err(|_| SnapshotError::Inconsistent("string field is not UTF-8"))
}

/// Rebuilds module state from a blob produced by [`super::encode_state`].
///
/// The checksum is verified before any field is trusted.
pub fn decode_state(buf: &[u8]) -> Result<ModuleState> {
    if buf.len() < FIXED_HEADER_LEN + CHECKSUM_LEN {
        return Err(SnapshotError::Truncated);
    }
    if &buf[0..4] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let (content, trailer) = buf.split_at(buf.len() - CHECKSUM_LEN);
    let expected = LittleEndian::read_u64(trailer);
    let found = checksum(content);
    if expected != found {
        return Err(SnapshotError::ChecksumMismatch { expected, found });
    }

    let mut offset = 4;
    let schema = read_u32(content, &mut offset)?;
    if schema != SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedSchema(schema));
    }

    let machine_id = MachineId(read_u32(content, &mut offset)?);
    let flags = read_u8(content, &mut offset)?;
    let buffer_capacity = read_u32(content, &mut offset)?;
    let aggregation_interval_seconds = read_u32(content, &mut offset)?;
    let max_retry_attempts = read_u32(content, &mut offset)?;

    let total_events = read_u64(content, &mut offset)?;
    let last_aggregation = read_u32(content, &mut offset)?;
    let last_sync = read_u32(content, &mut offset)?;
    let count = read_u32(content, &mut offset)? as usize;

    let endpoint = read_str(content, &mut offset, ENDPOINT_FIELD_LEN)?;
    let credential = read_str(content, &mut offset, CREDENTIAL_FIELD_LEN)?;

    let config = Config {
        machine_id,
        enable_external_sync: flags & FLAG_EXTERNAL_SYNC != 0,
        buffer_capacity,
        aggregation_interval_seconds,
        endpoint,
        credential,
        max_retry_attempts,
    };
    config
        .validate()
        .map_err(|_| SnapshotError::Inconsistent("persisted configuration is not admissible"))?;

    if count > config.capacity() {
        return Err(SnapshotError::Inconsistent("buffered count exceeds capacity"));
    }
    if (count as u64) > total_events {
        return Err(SnapshotError::Inconsistent("buffered count exceeds total events"));
    }
    if content.len() - offset != config.capacity() * DispenseEvent::ENCODED_LEN {
        return Err(SnapshotError::Truncated);
    }

    let mut ring = EventRing::with_capacity(config.capacity())
        .map_err(|_| SnapshotError::Inconsistent("event store allocation failed"))?;
    for _ in 0..count {
        let slot: &[u8; DispenseEvent::ENCODED_LEN] = take(content, &mut offset, DispenseEvent::ENCODED_LEN)?
            .try_into()
            .map_err(|_| SnapshotError::Truncated)?;
        let event = DispenseEvent::read_from(slot);
        if !event.machine_id.is_assigned() || event.product_id.0 == 0 {
            return Err(SnapshotError::Inconsistent("buffered event is malformed"));
        }
        ring.push(event);
    }

    Ok(ModuleState {
        config,
        total_events,
        ring,
        scheduler: SyncScheduler::restore(last_aggregation, last_sync),
    })
}
