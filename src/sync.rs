// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Sync scheduler.
//!
//! Two phases: `Idle` and `InFlight`. The scheduler decides when an
//! aggregation + delivery attempt is due, hands out at most one
//! [`SyncTicket`] at a time, and advances the watermarks only when the
//! holder of that ticket reports a confirmed delivery.
//!
//! The scheduler never performs the delivery itself. The host takes the
//! ticket, releases its state lock, calls the transport, then re-acquires
//! the lock to [`SyncScheduler::finish`].

use crate::aggregate::{aggregate, Aggregate};
use crate::config::Config;
use crate::error::{KernelError, KernelResult};
use crate::storage::ring::EventRing;
use crate::types::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    InFlight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncMode {
    /// Housekeeping check. Only proceeds once the aggregation interval has elapsed.
    Periodic,
    /// Manual request. Skips the interval check, obeys everything else.
    Forced,
}

#[derive(Debug)]
pub enum SyncDecision {
    /// External sync is switched off in the configuration.
    Disabled,
    /// The aggregation interval has not elapsed yet.
    NotDue,
    /// The window holds no events. Nothing to deliver, watermarks untouched.
    Empty,
    /// Deliver this ticket's aggregate, then call `finish`.
    Ready(SyncTicket),
}

/// Proof of the single in-flight attempt.
#[derive(Debug)]
pub struct SyncTicket {
    aggregate: Aggregate,
    started_at: Timestamp,
}

impl SyncTicket {
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncScheduler {
    phase: SyncPhase,
    last_aggregation: Timestamp,
    last_sync: Timestamp,
}

impl SyncScheduler {
    /// Fresh scheduler; the first window starts at `now`.
    pub fn new(now: Timestamp) -> Self {
        Self::restore(now, 0)
    }

    /// Rebuilds a scheduler from persisted watermarks. Always `Idle`.
    pub fn restore(last_aggregation: Timestamp, last_sync: Timestamp) -> Self {
        Self {
            phase: SyncPhase::Idle,
            last_aggregation,
            last_sync,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn last_aggregation(&self) -> Timestamp {
        self.last_aggregation
    }

    pub fn last_sync(&self) -> Timestamp {
        self.last_sync
    }

    /// True once `aggregation_interval_seconds` have passed since the last
    /// delivered window. A clock reading behind the watermark counts as zero
    /// elapsed time.
    pub fn interval_elapsed(&self, config: &Config, now: Timestamp) -> bool {
        now.saturating_sub(self.last_aggregation) >= config.aggregation_interval_seconds
    }

    /// Whether a periodic attempt would proceed right now.
    pub fn is_due(&self, config: &Config, now: Timestamp) -> bool {
        config.enable_external_sync
            && self.phase == SyncPhase::Idle
            && self.interval_elapsed(config, now)
    }

    /// Tries the `Idle -> InFlight` transition.
    ///
    /// A second attempt while one is in flight is rejected with `ApiError`,
    /// never queued.
    pub fn begin(
        &mut self,
        config: &Config,
        ring: &EventRing,
        now: Timestamp,
        mode: SyncMode,
    ) -> KernelResult<SyncDecision> {
        if !config.enable_external_sync {
            return Ok(SyncDecision::Disabled);
        }
        if self.phase == SyncPhase::InFlight {
            return Err(KernelError::ApiError);
        }
        if mode == SyncMode::Periodic && !self.interval_elapsed(config, now) {
            return Ok(SyncDecision::NotDue);
        }

        self.phase = SyncPhase::InFlight;

        let period_start = self.last_aggregation;
        let period_end = now;
        let aggregate = aggregate(ring, config.machine_id, period_start, period_end);

        if aggregate.is_empty() {
            self.phase = SyncPhase::Idle;
            return Ok(SyncDecision::Empty);
        }

        Ok(SyncDecision::Ready(SyncTicket {
            aggregate,
            started_at: now,
        }))
    }

    /// Closes the in-flight attempt.
    ///
    /// On delivery both watermarks move to the attempt's `now`. On failure
    /// they stay put, so the same window is retried next time.
    pub fn finish(&mut self, ticket: SyncTicket, delivered: bool) {
        self.phase = SyncPhase::Idle;
        if delivered {
            self.last_sync = ticket.started_at;
            self.last_aggregation = ticket.aggregate.period_end;
        }
    }
}
