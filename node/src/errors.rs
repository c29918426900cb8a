// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use consumption_kernel::error::KernelError;
use consumption_kernel::snapshot::SnapshotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("blob of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no transport available")]
    Unavailable,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("delivery timed out")]
    Timeout,
    #[error("collector rejected the payload with status {0}")]
    Rejected(u16),
    #[error("TLS setup failed: {0}")]
    Tls(String),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("MQTT client error: {0}")]
    Mqtt(String),
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("tracker is not initialized")]
    NotInitialized,
    #[error("Kernel error: {0}")]
    Kernel(KernelError),
    #[error("Snapshot error: {0}")]
    Snapshot(SnapshotError),
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TrackerError {
    /// Maps the failure onto the boundary error codes.
    pub fn code(&self) -> KernelError {
        match self {
            TrackerError::NotInitialized => KernelError::InvalidConfig,
            TrackerError::Kernel(e) => *e,
            TrackerError::Snapshot(e) => KernelError::from(*e),
            TrackerError::Transport(TransportError::Unavailable) => KernelError::NetworkUnavailable,
            TrackerError::Transport(_) => KernelError::ApiError,
            TrackerError::Storage(_) => KernelError::StorageFull,
        }
    }
}

impl From<KernelError> for TrackerError {
    fn from(e: KernelError) -> Self {
        TrackerError::Kernel(e)
    }
}

impl From<SnapshotError> for TrackerError {
    fn from(e: SnapshotError) -> Self {
        TrackerError::Snapshot(e)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration rejected: {0}")]
    Invalid(KernelError),
}
