// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod id;

/// Seconds since the Unix epoch, as reported by the host clock.
pub type Timestamp = u32;
