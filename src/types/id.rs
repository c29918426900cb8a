// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Identity types.

use serde::{Deserialize, Serialize};

/// Device identity. Zero is never a valid machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct MachineId(pub u32);

impl MachineId {
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// Product slot identifier, `1..=255`. Zero is reserved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ProductId(pub u8);

impl ProductId {
    pub const fn new(raw: u8) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(ProductId(raw))
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}
