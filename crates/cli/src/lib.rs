// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
pub mod commands;

use std::path::Path;

use anyhow::Context;
use consumption_kernel::snapshot::decode_state;
use consumption_kernel::state::ModuleState;

/// Reads and decodes a persisted state blob.
pub fn load_blob(path: &Path) -> anyhow::Result<ModuleState> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_state(&bytes).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

/// RFC 3339 rendering of a device timestamp; `never` for zero.
pub fn format_timestamp(ts: u32) -> String {
    if ts == 0 {
        return "never".to_string();
    }
    chrono::DateTime::from_timestamp(ts as i64, 0)
        .unwrap_or_default()
        .to_rfc3339()
}
