// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use consumption_cli::commands::{inspect, payload, simulate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "consumption")]
#[command(version = consumption_kernel::VERSION)]
#[command(about = "Operator tool for the dispense consumption tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration, counters and buffered events of a state blob.
    Inspect {
        blob_path: PathBuf,

        /// Also list up to this many of the most recent events
        #[arg(long, short, default_value_t = 0)]
        events: usize,
    },
    /// Print the collector payload a sync would send for a window
    Payload {
        blob_path: PathBuf,

        /// Window start (defaults to the last aggregation watermark)
        #[arg(long)]
        start: Option<u32>,

        /// Window end, inclusive (defaults to the newest buffered event)
        #[arg(long)]
        end: Option<u32>,
    },
    /// Run a vending-machine session against a configured tracker
    Simulate {
        /// Node configuration file (JSON)
        #[arg(long, short)]
        config: PathBuf,

        #[arg(long, short, default_value_t = 6)]
        dispenses: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { blob_path, events } => inspect::run(&blob_path, events),
        Commands::Payload { blob_path, start, end } => payload::run(&blob_path, start, end),
        Commands::Simulate { config, dispenses } => {
            consumption_node::telemetry::init_telemetry();
            simulate::run(&config, dispenses)
        }
    }
}
