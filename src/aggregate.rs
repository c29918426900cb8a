// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Per-product tallies over a time window.
//!
//! An aggregate only sees what is still buffered at scan time. Events evicted
//! by the ring before the scan are gone, so the result is a best-effort
//! snapshot rather than a complete ledger.

use crate::storage::ring::EventRing;
use crate::types::id::{MachineId, ProductId};
use crate::types::Timestamp;

/// One counter per possible product id. Index 0 is never used.
pub const PRODUCT_SLOTS: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate {
    pub machine_id: MachineId,
    pub period_start: Timestamp,
    pub period_end: Timestamp,
    pub total_events: u32,
    pub product_counts: [u32; PRODUCT_SLOTS],
}

impl Aggregate {
    pub fn empty(machine_id: MachineId, period_start: Timestamp, period_end: Timestamp) -> Self {
        Self {
            machine_id,
            period_start,
            period_end,
            total_events: 0,
            product_counts: [0; PRODUCT_SLOTS],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_events == 0
    }

    pub fn count(&self, product: ProductId) -> u32 {
        self.product_counts.get(product.index()).copied().unwrap_or(0)
    }

    /// Products with a non-zero count, in ascending id order.
    pub fn products(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.product_counts
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(_, &count)| count > 0)
            .map(|(id, &count)| (ProductId(id as u8), count))
    }
}

/// Tallies buffered events with `period_start <= timestamp <= period_end`.
///
/// Walks the ring once, oldest to newest.
pub fn aggregate(
    ring: &EventRing,
    machine_id: MachineId,
    period_start: Timestamp,
    period_end: Timestamp,
) -> Aggregate {
    let mut result = Aggregate::empty(machine_id, period_start, period_end);

    for event in ring.iter() {
        if event.timestamp < period_start || event.timestamp > period_end {
            continue;
        }
        result.total_events += 1;
        // Out-of-range ids are counted in the total but not per product.
        if let Some(slot) = result.product_counts.get_mut(event.product_id.index()) {
            *slot += 1;
        }
    }

    result
}
