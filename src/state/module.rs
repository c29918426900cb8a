// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Module state.
//!
//! Everything the tracker knows: active configuration, the monotonic event
//! counter, the event ring and the sync scheduler. Callers serialize access
//! (the node keeps it behind one mutex); nothing in here blocks.

use crate::aggregate::{aggregate, Aggregate};
use crate::config::Config;
use crate::error::{KernelError, KernelResult};
use crate::event::DispenseEvent;
use crate::storage::ring::EventRing;
use crate::sync::{SyncDecision, SyncMode, SyncPhase, SyncScheduler, SyncTicket};
use crate::types::id::{MachineId, ProductId};
use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_events: u64,
    pub buffered_events: u32,
    pub last_sync: Timestamp,
    pub last_aggregation: Timestamp,
    pub sync_in_flight: bool,
}

pub struct ModuleState {
    pub(crate) config: Config,
    pub(crate) total_events: u64,
    pub(crate) ring: EventRing,
    pub(crate) scheduler: SyncScheduler,
}

impl ModuleState {
    /// Validates `config` and allocates the ring. The first aggregation
    /// window opens at `now`.
    pub fn new(config: Config, now: Timestamp) -> KernelResult<Self> {
        config.validate()?;
        let ring = EventRing::with_capacity(config.capacity())?;
        Ok(Self {
            config,
            total_events: 0,
            ring,
            scheduler: SyncScheduler::new(now),
        })
    }

    // --- Read APIs ---

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn total_events(&self) -> u64 {
        self.total_events
    }

    pub fn ring(&self) -> &EventRing {
        &self.ring
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_events: self.total_events,
            buffered_events: self.ring.len() as u32,
            last_sync: self.scheduler.last_sync(),
            last_aggregation: self.scheduler.last_aggregation(),
            sync_in_flight: self.scheduler.phase() == SyncPhase::InFlight,
        }
    }

    /// Ad-hoc tally of the buffered events in `[start, end]`.
    pub fn aggregate_window(&self, start: Timestamp, end: Timestamp) -> Aggregate {
        aggregate(&self.ring, self.config.machine_id, start, end)
    }

    // --- Write Logic ---

    /// Accepts one dispense.
    ///
    /// A foreign machine id or product `0` is rejected with
    /// `InvalidParameter` and leaves the state untouched.
    pub fn record_dispense(&mut self, machine_id: u32, product_id: u8, now: Timestamp) -> KernelResult<()> {
        if MachineId(machine_id) != self.config.machine_id {
            return Err(KernelError::InvalidParameter);
        }
        let product = ProductId::new(product_id).ok_or(KernelError::InvalidParameter)?;

        self.ring.push(DispenseEvent::new(now, self.config.machine_id, product));
        self.total_events += 1;
        Ok(())
    }

    /// Whether a periodic sync attempt would proceed at `now`.
    pub fn sync_due(&self, now: Timestamp) -> bool {
        self.scheduler.is_due(&self.config, now)
    }

    pub fn begin_sync(&mut self, now: Timestamp, mode: SyncMode) -> KernelResult<SyncDecision> {
        self.scheduler.begin(&self.config, &self.ring, now, mode)
    }

    pub fn finish_sync(&mut self, ticket: SyncTicket, delivered: bool) {
        self.scheduler.finish(ticket, delivered);
    }

    /// Rebuilds the state around `config`, which may name a different buffer
    /// capacity. `total_events` and both watermarks carry over, as do the
    /// newest buffered events that fit the new store.
    ///
    /// Only for bringing persisted state up under a new configuration; a
    /// running module changes configuration through [`ModuleState::update_config`].
    pub fn reconfigure(self, config: Config) -> KernelResult<Self> {
        config.validate()?;
        let mut ring = EventRing::with_capacity(config.capacity())?;
        let skip = self.ring.len().saturating_sub(ring.capacity());
        for event in self.ring.iter().skip(skip) {
            ring.push(*event);
        }

        Ok(Self {
            config,
            total_events: self.total_events,
            ring,
            scheduler: SyncScheduler::restore(self.scheduler.last_aggregation(), self.scheduler.last_sync()),
        })
    }

    /// Replaces the configuration. Nothing is applied unless every check passes.
    pub fn update_config(&mut self, next: Config) -> KernelResult<()> {
        self.config.check_runtime_update(&next)?;
        self.config = next;
        Ok(())
    }
}
