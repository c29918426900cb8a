// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Host capabilities.
//!
//! The tracker never touches clocks, disks or sockets directly. Everything it
//! needs from the device arrives through a [`Platform`] supplied at
//! construction, so tests can substitute an in-memory one.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use consumption_kernel::types::id::MachineId;
use consumption_kernel::types::Timestamp;

use crate::config::NodeConfig;
use crate::errors::{StorageError, TransportError};
use crate::storage::FileStorage;
use crate::transport;

/// One outbound aggregate.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub endpoint: &'a str,
    pub credential: &'a str,
    pub machine_id: MachineId,
    pub payload: &'a [u8],
}

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch. Must not go backwards.
    fn now(&self) -> Timestamp;
}

pub trait BlobStorage: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError>;
    /// Replaces the stored blob. Either the old or the new blob survives a
    /// power loss, never a mix.
    fn write(&self, blob: &[u8]) -> Result<(), StorageError>;
}

pub trait Transport: Send + Sync {
    /// Best-effort delivery. A missing network must fail fast rather than
    /// block indefinitely.
    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError>;
}

pub trait Platform: Send + Sync {
    fn now(&self) -> Timestamp;
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;
    fn store(&self, blob: &[u8]) -> Result<(), StorageError>;
    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError>;
}

impl<T: Platform + ?Sized> Platform for Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load()
    }

    fn store(&self, blob: &[u8]) -> Result<(), StorageError> {
        (**self).store(blob)
    }

    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError> {
        (**self).send(delivery)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        // Saturates in 2106.
        u32::try_from(secs).unwrap_or(u32::MAX)
    }
}

/// Platform assembled from independent parts.
pub struct HostPlatform<C: Clock, S: BlobStorage> {
    clock: C,
    storage: S,
    transport: Option<Box<dyn Transport>>,
}

impl<C: Clock, S: BlobStorage> HostPlatform<C, S> {
    pub fn new(clock: C, storage: S) -> Self {
        Self {
            clock,
            storage,
            transport: None,
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl<C: Clock, S: BlobStorage> Platform for HostPlatform<C, S> {
    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        self.storage.read()
    }

    fn store(&self, blob: &[u8]) -> Result<(), StorageError> {
        self.storage.write(blob)
    }

    fn send(&self, delivery: &Delivery<'_>) -> Result<(), TransportError> {
        match &self.transport {
            Some(transport) => transport.send(delivery),
            None => Err(TransportError::Unavailable),
        }
    }
}

impl HostPlatform<SystemClock, FileStorage> {
    /// Wall clock, file-backed storage and whichever transport `config` names.
    pub fn from_config(config: &NodeConfig) -> Result<Self, TransportError> {
        let storage = FileStorage::new(&config.state_path, config.max_blob_bytes);
        let mut platform = HostPlatform::new(SystemClock, storage);
        if let Some(transport) = transport::from_config(&config.transport)? {
            platform = platform.with_transport(transport);
        }
        Ok(platform)
    }
}
