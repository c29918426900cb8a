// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Collector payload.
//!
//! ```text
//! {"machine_id":<u32>,"period_start":<u32>,"period_end":<u32>,"total_events":<u32>,
//!  "products":{"<product_id>":<count>, ...}}
//! ```
//!
//! Field order follows the struct declaration. `products` lists only ids
//! with a non-zero count, ascending.

use std::collections::BTreeMap;

use consumption_kernel::aggregate::Aggregate;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumptionPayload {
    pub machine_id: u32,
    pub period_start: u32,
    pub period_end: u32,
    pub total_events: u32,
    pub products: BTreeMap<u8, u32>,
}

impl From<&Aggregate> for ConsumptionPayload {
    fn from(agg: &Aggregate) -> Self {
        Self {
            machine_id: agg.machine_id.0,
            period_start: agg.period_start,
            period_end: agg.period_end,
            total_events: agg.total_events,
            products: agg.products().map(|(id, count)| (id.0, count)).collect(),
        }
    }
}

pub fn encode_payload(agg: &Aggregate) -> Result<Vec<u8>, TransportError> {
    Ok(serde_json::to_vec(&ConsumptionPayload::from(agg))?)
}
