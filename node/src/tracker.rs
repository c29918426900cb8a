// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! The tracker handle.
//!
//! `Tracker` owns the module state behind a single mutex. Every public entry
//! point takes that lock for the shortest possible span; transport sends and
//! storage writes happen with it released, so a hung collector never stalls
//! `report_dispense`.
//!
//! Blob writes are ordered by a second lock (`flush_lock`). A writer encodes
//! the state while holding both, then stores the bytes holding only the
//! flush lock, so an older snapshot can never overwrite a newer one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use consumption_kernel::config::Config;
use consumption_kernel::snapshot::{decode_state, encode_to_vec};
use consumption_kernel::state::{ModuleState, Stats};
use consumption_kernel::sync::{SyncDecision, SyncMode, SyncTicket};
use consumption_kernel::types::Timestamp;
use tracing::{debug, error, info, warn};

use crate::errors::{TrackerError, TransportError};
use crate::platform::{Delivery, Platform};
use crate::wire::encode_payload;

/// Result of a sync request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// External sync is switched off.
    Disabled,
    /// Periodic check ran before the interval elapsed.
    NotDue,
    /// Nothing buffered in the window. No send was made.
    Empty,
    Delivered {
        period_start: Timestamp,
        period_end: Timestamp,
        total_events: u32,
    },
}

pub struct Tracker<P: Platform> {
    platform: P,
    state: Mutex<Option<ModuleState>>,
    flush_lock: Mutex<()>,
    sync_due: AtomicBool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl<P: Platform> Tracker<P> {
    /// Creates an uninitialized tracker. Call [`Tracker::init`] before use.
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            state: Mutex::new(None),
            flush_lock: Mutex::new(()),
            sync_due: AtomicBool::new(false),
        }
    }

    pub fn is_initialized(&self) -> bool {
        lock(&self.state).is_some()
    }

    /// Brings the module up.
    ///
    /// With `None`, persisted state is restored if present, else defaults
    /// apply. With `Some(config)`, persisted state is brought up under
    /// `config`. If the buffer capacity differs, the newest events that fit
    /// are kept along with the lifetime count and both watermarks. A blob
    /// that fails to decode is discarded.
    ///
    /// Calling `init` on an initialized tracker is a no-op.
    pub fn init(&self, config: Option<Config>) -> Result<(), TrackerError> {
        let mut guard = lock(&self.state);
        if guard.is_some() {
            debug!("Tracker already initialized");
            return Ok(());
        }

        if let Some(cfg) = &config {
            cfg.validate()?;
        }

        let now = self.platform.now();
        let persisted = self.load_persisted();

        let state = match (config, persisted) {
            (None, Some(state)) => state,
            (None, None) => ModuleState::new(Config::default(), now)?,
            (Some(cfg), Some(mut state)) if state.config().buffer_capacity == cfg.buffer_capacity => {
                state.update_config(cfg)?;
                state
            }
            (Some(cfg), Some(state)) => {
                info!(
                    from = state.config().buffer_capacity,
                    to = cfg.buffer_capacity,
                    "Resizing persisted event store"
                );
                state.reconfigure(cfg)?
            }
            (Some(cfg), None) => ModuleState::new(cfg, now)?,
        };

        let stats = state.stats();
        info!(
            machine_id = state.config().machine_id.0,
            capacity = state.config().buffer_capacity,
            total_events = stats.total_events,
            buffered = stats.buffered_events,
            "Consumption module initialized"
        );
        metrics::gauge!("consumption_buffered_events", stats.buffered_events as f64);

        *guard = Some(state);
        Ok(())
    }

    fn load_persisted(&self) -> Option<ModuleState> {
        match self.platform.load() {
            Ok(Some(blob)) => match decode_state(&blob) {
                Ok(state) => Some(state),
                Err(e) => {
                    warn!("Discarding persisted state: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Persisted state unreadable: {}", e);
                None
            }
        }
    }

    /// Records one dispense.
    ///
    /// Never sends anything. When the aggregation interval has elapsed it
    /// only raises [`Tracker::sync_due`] for the host's housekeeping loop.
    pub fn report_dispense(&self, machine_id: u32, product_id: u8) -> Result<(), TrackerError> {
        let mut guard = lock(&self.state);
        let state = guard.as_mut().ok_or(TrackerError::NotInitialized)?;
        let now = self.platform.now();

        if let Err(e) = state.record_dispense(machine_id, product_id, now) {
            metrics::increment_counter!("consumption_events_rejected_total");
            debug!(machine_id, product_id, "Dispense rejected: {}", e);
            return Err(e.into());
        }

        metrics::increment_counter!("consumption_events_total");
        metrics::gauge!("consumption_buffered_events", state.ring().len() as f64);

        if state.sync_due(now) {
            self.sync_due.store(true, Ordering::Release);
        }
        Ok(())
    }

    /// Set once a dispense observed an elapsed interval; cleared by the next
    /// sync attempt.
    pub fn sync_due(&self) -> bool {
        self.sync_due.load(Ordering::Acquire)
    }

    /// Housekeeping entry. Attempts a sync only if the interval has elapsed.
    pub fn poll(&self) -> Result<SyncOutcome, TrackerError> {
        self.run_sync(SyncMode::Periodic)
    }

    /// Attempts a sync now, regardless of the interval. Blocks until the
    /// attempt resolves.
    pub fn force_sync(&self) -> Result<SyncOutcome, TrackerError> {
        self.run_sync(SyncMode::Forced)
    }

    fn run_sync(&self, mode: SyncMode) -> Result<SyncOutcome, TrackerError> {
        let (ticket, endpoint, credential, attempts) = {
            let mut guard = lock(&self.state);
            let state = guard.as_mut().ok_or(TrackerError::NotInitialized)?;
            let now = self.platform.now();
            self.sync_due.store(false, Ordering::Release);

            match state.begin_sync(now, mode) {
                Ok(SyncDecision::Disabled) => return Ok(SyncOutcome::Disabled),
                Ok(SyncDecision::NotDue) => return Ok(SyncOutcome::NotDue),
                Ok(SyncDecision::Empty) => {
                    debug!("No events in window, nothing to sync");
                    return Ok(SyncOutcome::Empty);
                }
                Ok(SyncDecision::Ready(ticket)) => {
                    let cfg = state.config();
                    (ticket, cfg.endpoint.clone(), cfg.credential.clone(), cfg.send_attempts())
                }
                Err(e) => {
                    debug!("Sync already in flight");
                    return Err(e.into());
                }
            }
        };

        // State lock released from here until `finish_sync`.
        let result = encode_payload(ticket.aggregate())
            .and_then(|payload| self.deliver(&ticket, &endpoint, &credential, &payload, attempts));

        let outcome = SyncOutcome::Delivered {
            period_start: ticket.aggregate().period_start,
            period_end: ticket.aggregate().period_end,
            total_events: ticket.aggregate().total_events,
        };
        self.finish(ticket, result.is_ok());

        match result {
            Ok(()) => {
                metrics::increment_counter!("consumption_sync_success_total");
                info!("Consumption data synced successfully");
                if let Err(e) = self.persist() {
                    error!("State flush after sync failed: {}", e);
                }
                Ok(outcome)
            }
            Err(e) => {
                metrics::increment_counter!("consumption_sync_failure_total");
                error!("Failed to sync consumption data: {}", e);
                Err(e.into())
            }
        }
    }

    fn deliver(
        &self,
        ticket: &SyncTicket,
        endpoint: &str,
        credential: &str,
        payload: &[u8],
        attempts: u32,
    ) -> Result<(), TransportError> {
        let delivery = Delivery {
            endpoint,
            credential,
            machine_id: ticket.aggregate().machine_id,
            payload,
        };

        let mut last_err = TransportError::Unavailable;
        for attempt in 1..=attempts {
            match self.platform.send(&delivery) {
                Ok(()) => return Ok(()),
                Err(TransportError::Unavailable) => return Err(TransportError::Unavailable),
                Err(e) => {
                    warn!(attempt, attempts, "Delivery attempt failed: {}", e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    fn finish(&self, ticket: SyncTicket, delivered: bool) {
        let mut guard = lock(&self.state);
        match guard.as_mut() {
            Some(state) => state.finish_sync(ticket, delivered),
            // Deinitialized mid-flight; the persisted watermarks predate this
            // window, so it is offered again after the next init.
            None => debug!("Tracker deinitialized during sync"),
        }
    }

    /// Writes the current state to storage.
    pub fn flush(&self) -> Result<(), TrackerError> {
        self.persist()
    }

    fn persist(&self) -> Result<(), TrackerError> {
        let _order = lock(&self.flush_lock);
        let blob = {
            let guard = lock(&self.state);
            let state = guard.as_ref().ok_or(TrackerError::NotInitialized)?;
            encode_to_vec(state)?
        };
        self.store(&blob)
    }

    fn store(&self, blob: &[u8]) -> Result<(), TrackerError> {
        match self.platform.store(blob) {
            Ok(()) => {
                metrics::increment_counter!("consumption_flush_total");
                debug!("State flushed ({} bytes)", blob.len());
                Ok(())
            }
            Err(e) => {
                error!("State flush failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Replaces the configuration and flushes. Capacity changes are refused
    /// with `InvalidParameter`; a refused update changes nothing.
    pub fn update_config(&self, config: Config) -> Result<(), TrackerError> {
        {
            let mut guard = lock(&self.state);
            let state = guard.as_mut().ok_or(TrackerError::NotInitialized)?;
            state.update_config(config)?;
            info!(machine_id = state.config().machine_id.0, "Configuration updated");
        }
        if let Err(e) = self.persist() {
            warn!("Configuration applied but not persisted: {}", e);
        }
        Ok(())
    }

    pub fn config(&self) -> Result<Config, TrackerError> {
        let guard = lock(&self.state);
        let state = guard.as_ref().ok_or(TrackerError::NotInitialized)?;
        Ok(state.config().clone())
    }

    pub fn stats(&self) -> Result<Stats, TrackerError> {
        let guard = lock(&self.state);
        let state = guard.as_ref().ok_or(TrackerError::NotInitialized)?;
        Ok(state.stats())
    }

    /// Final sync, final flush, then releases the event store.
    ///
    /// The final sync bypasses the interval. Its failure is logged and does
    /// not stop shutdown. No event is accepted after the final snapshot is
    /// taken. Deinit on an uninitialized tracker is a no-op.
    pub fn deinit(&self) -> Result<(), TrackerError> {
        if !self.is_initialized() {
            return Ok(());
        }

        match self.run_sync(SyncMode::Forced) {
            Ok(outcome) => debug!(?outcome, "Final sync"),
            Err(TrackerError::NotInitialized) => return Ok(()),
            Err(e) => warn!("Final sync failed: {}", e),
        }

        let _order = lock(&self.flush_lock);
        let state = match lock(&self.state).take() {
            Some(state) => state,
            None => return Ok(()),
        };
        let blob = encode_to_vec(&state)?;
        drop(state);

        self.sync_due.store(false, Ordering::Release);
        metrics::gauge!("consumption_buffered_events", 0.0);
        let stored = self.store(&blob);
        info!("Consumption module deinitialized");
        stored
    }

    pub fn on_boot(&self) {
        info!("Consumption module boot event");
    }

    pub fn on_shutdown(&self) {
        info!("Consumption module shutdown event");
    }

    /// Logs a vendor fault code. Module state is not touched.
    pub fn report_fault(&self, vendor_code: u16) {
        metrics::increment_counter!("consumption_faults_total");
        error!(vendor_code, "Vending machine fault reported");
    }
}
