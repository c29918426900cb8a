// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Dispense events.
//!
//! An event records one unit of product leaving the device. It carries no
//! personal data: only the time, the machine and the product slot.

use byteorder::{ByteOrder, LittleEndian};

use crate::types::id::{MachineId, ProductId};
use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct DispenseEvent {
    pub timestamp: Timestamp,
    pub machine_id: MachineId,
    pub product_id: ProductId,
}

impl DispenseEvent {
    /// Bytes per event in the persisted blob: timestamp, machine, product.
    pub const ENCODED_LEN: usize = 4 + 4 + 1;

    pub const fn new(timestamp: Timestamp, machine_id: MachineId, product_id: ProductId) -> Self {
        Self {
            timestamp,
            machine_id,
            product_id,
        }
    }

    pub fn write_to(&self, buf: &mut [u8; Self::ENCODED_LEN]) {
        LittleEndian::write_u32(&mut buf[0..4], self.timestamp);
        LittleEndian::write_u32(&mut buf[4..8], self.machine_id.0);
        buf[8] = self.product_id.0;
    }

    pub fn read_from(buf: &[u8; Self::ENCODED_LEN]) -> Self {
        Self {
            timestamp: LittleEndian::read_u32(&buf[0..4]),
            machine_id: MachineId(LittleEndian::read_u32(&buf[4..8])),
            product_id: ProductId(buf[8]),
        }
    }
}
