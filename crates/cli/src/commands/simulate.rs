// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Vending-machine integration loop.
//!
//! Drives a tracker the way a vending controller would: boot, a series of
//! purchases each reporting one dispense, a manual sync, a fault report and
//! an orderly shutdown.

use std::path::Path;

use anyhow::Context;
use consumption_kernel::state::Stats;
use consumption_node::config::NodeConfig;
use consumption_node::platform::HostPlatform;
use consumption_node::tracker::{SyncOutcome, Tracker};

/// Product rotation for simulated purchases.
const PURCHASES: [u8; 6] = [1, 3, 2, 5, 1, 4];

/// Fault code raised after the purchases.
const DEMO_FAULT: u16 = 42;

pub fn simulate(config: &NodeConfig, dispenses: u32) -> anyhow::Result<Stats> {
    let platform = HostPlatform::from_config(config).context("building platform")?;
    let tracker = Tracker::new(platform);
    let machine_id = config.kernel.machine_id.0;

    tracker
        .init(Some(config.kernel.clone()))
        .map_err(|e| anyhow::anyhow!("tracker init failed ({}): {}", e.code(), e))?;
    println!("Consumption module initialized for machine {}", machine_id);
    tracker.on_boot();

    for i in 0..dispenses {
        let product = PURCHASES[i as usize % PURCHASES.len()];
        match tracker.report_dispense(machine_id, product) {
            Ok(()) => println!("Purchase {}: product {} dispensed", i + 1, product),
            // Tracking failures never block the sale.
            Err(e) => println!("Purchase {}: tracking failed: {}", i + 1, e.code()),
        }
        if tracker.sync_due() {
            if let Err(e) = tracker.poll() {
                println!("Periodic sync failed: {}", e.code());
            }
        }
    }

    let stats = tracker.stats()?;
    println!("\nTotal events recorded: {}", stats.total_events);
    println!("Events in buffer: {}", stats.buffered_events);
    println!("Last sync timestamp: {}", crate::format_timestamp(stats.last_sync));

    match tracker.force_sync() {
        Ok(SyncOutcome::Delivered { total_events, .. }) => {
            println!("Data synchronized ({} events)", total_events)
        }
        Ok(other) => println!("Nothing synchronized: {:?}", other),
        Err(e) => println!("Sync failed: {}", e.code()),
    }

    tracker.report_fault(DEMO_FAULT);
    tracker.on_shutdown();
    tracker.deinit().context("deinit")?;

    Ok(stats)
}

pub fn run(config_path: &Path, dispenses: u32) -> anyhow::Result<()> {
    let config = NodeConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    simulate(&config, dispenses)?;
    println!("Simulation complete. State written to {}", config.state_path.display());
    println!("{}", consumption_node::telemetry::render_metrics());
    Ok(())
}
