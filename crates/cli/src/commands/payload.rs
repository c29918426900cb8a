// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::path::Path;

use consumption_node::wire::encode_payload;

use crate::load_blob;

/// Renders the collector payload for `[start, end]` over the buffered
/// events. Defaults to the pending window: last aggregation up to the
/// newest buffered event.
pub fn render(blob_path: &Path, start: Option<u32>, end: Option<u32>) -> anyhow::Result<String> {
    let state = load_blob(blob_path)?;
    let start = start.unwrap_or_else(|| state.stats().last_aggregation);
    let end = end.unwrap_or_else(|| state.ring().newest().map(|e| e.timestamp).unwrap_or(start));
    if start > end {
        anyhow::bail!("window start {} is after end {}", start, end);
    }

    let aggregate = state.aggregate_window(start, end);
    let bytes = encode_payload(&aggregate)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn run(blob_path: &Path, start: Option<u32>, end: Option<u32>) -> anyhow::Result<()> {
    println!("{}", render(blob_path, start, end)?);
    Ok(())
}
