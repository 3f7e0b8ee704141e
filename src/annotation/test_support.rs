//! In-memory collaborators for unit tests.

use std::collections::HashMap;

use super::error::StorageError;
use super::marker::{Marker, MarkerId};
use super::persistence::KeyValueStore;
use super::widget::MarkerRenderer;

/// Renderer that hands out sequential handles and records releases.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: u64,
    pub attached: Vec<(u64, MarkerId)>,
    pub released: Vec<u64>,
}

impl RecordingRenderer {
    /// Handles attached and not yet released.
    pub fn live(&self) -> Vec<u64> {
        self.attached
            .iter()
            .map(|(handle, _)| *handle)
            .filter(|handle| !self.released.contains(handle))
            .collect()
    }
}

impl MarkerRenderer for RecordingRenderer {
    type Handle = u64;

    fn attach(&mut self, marker: &Marker) -> u64 {
        let handle = self.next;
        self.next += 1;
        self.attached.push((handle, marker.id));
        handle
    }

    fn release(&mut self, handle: u64) {
        assert!(
            !self.released.contains(&handle),
            "handle {} released twice",
            handle
        );
        self.released.push(handle);
    }
}

/// Key-value store backed by a map, with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub slots: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Default::default()
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::QuotaExceeded(key.to_string()));
        }
        self.writes += 1;
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        self.slots.remove(key);
        Ok(())
    }
}
