// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Blob storage backends.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::StorageError;
use crate::platform::BlobStorage;

/// Single-file blob store.
///
/// Writes go to a sibling `.tmp` file which is synced and then renamed over
/// the target, so a reader sees either the previous blob or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    max_bytes: usize,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }
}

impl BlobStorage for FileStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, blob: &[u8]) -> Result<(), StorageError> {
        if blob.len() > self.max_bytes {
            return Err(StorageError::TooLarge {
                size: blob.len(),
                limit: self.max_bytes,
            });
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&tmp_path)?;
            file.write_all(blob)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        // Make the rename itself durable.
        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        tracing::debug!("Persisted {} byte state blob to {:?}", blob.len(), self.path);
        Ok(())
    }
}

/// Volatile blob store for hosts without non-volatile memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStorage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let guard = self.blob.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn write(&self, blob: &[u8]) -> Result<(), StorageError> {
        let mut guard = self.blob.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(blob.to_vec());
        Ok(())
    }
}
