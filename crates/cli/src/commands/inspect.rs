// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use std::path::Path;

use crate::{format_timestamp, load_blob};

pub fn run(blob_path: &Path, show_events: usize) -> anyhow::Result<()> {
    let state = load_blob(blob_path)?;
    let cfg = state.config();
    let stats = state.stats();

    println!("\nConsumption State Report");
    println!("------------------------");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value"]);

    table.add_row(vec!["Machine ID".to_string(), cfg.machine_id.0.to_string()]);
    table.add_row(vec![
        "External sync".to_string(),
        if cfg.enable_external_sync { "enabled" } else { "disabled" }.to_string(),
    ]);
    table.add_row(vec!["Endpoint".to_string(), cfg.endpoint.clone()]);
    table.add_row(vec![
        "Credential".to_string(),
        if cfg.credential.is_empty() { "(none)" } else { "(set)" }.to_string(),
    ]);
    table.add_row(vec![
        "Aggregation interval".to_string(),
        format!("{} s", cfg.aggregation_interval_seconds),
    ]);
    table.add_row(vec!["Max retry attempts".to_string(), cfg.max_retry_attempts.to_string()]);
    table.add_row(vec![
        "Buffer".to_string(),
        format!("{} / {}", stats.buffered_events, cfg.buffer_capacity),
    ]);
    table.add_row(vec!["Total events".to_string(), stats.total_events.to_string()]);
    table.add_row(vec!["Last aggregation".to_string(), format_timestamp(stats.last_aggregation)]);
    table.add_row(vec!["Last sync".to_string(), format_timestamp(stats.last_sync)]);

    println!("{table}");

    if stats.buffered_events == 0 {
        println!("\nNo buffered events.");
        return Ok(());
    }

    // Per-product totals over everything still buffered.
    let everything = state.aggregate_window(0, u32::MAX);
    let mut products = Table::new();
    products
        .load_preset(UTF8_FULL)
        .set_header(vec!["Product", "Buffered dispenses"]);
    for (product, count) in everything.products() {
        products.add_row(vec![product.0.to_string(), count.to_string()]);
    }
    println!("\n{products}");

    if show_events > 0 {
        let skip = state.ring().len().saturating_sub(show_events);
        let mut events = Table::new();
        events
            .load_preset(UTF8_FULL)
            .set_header(vec!["Time", "Machine", "Product"]);
        for event in state.ring().iter().skip(skip) {
            events.add_row(vec![
                format_timestamp(event.timestamp),
                event.machine_id.0.to_string(),
                event.product_id.0.to_string(),
            ]);
        }
        println!("\nMost recent {} events:", state.ring().len() - skip);
        println!("{events}");
    }

    Ok(())
}
