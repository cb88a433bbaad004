//! Save-slot storage adapters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{SlotStore, SlotStoreError};

/// Slot names become file names, so keep them to a safe alphabet.
fn validate_slot(slot: &str) -> Result<(), SlotStoreError> {
    let valid = !slot.is_empty()
        && slot.len() <= 64
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(SlotStoreError::InvalidSlot(slot.to_string()))
    }
}

/// Process-local slots; contents are lost on exit.
#[derive(Default)]
pub struct InMemorySlotStore {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn slot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn save(&self, slot: &str, bytes: Vec<u8>) -> Result<(), SlotStoreError> {
        validate_slot(slot)?;
        self.slots.write().await.insert(slot.to_string(), bytes);
        Ok(())
    }

    async fn load(&self, slot: &str) -> Result<Option<Vec<u8>>, SlotStoreError> {
        validate_slot(slot)?;
        Ok(self.slots.read().await.get(slot).cloned())
    }

    async fn delete(&self, slot: &str) -> Result<(), SlotStoreError> {
        validate_slot(slot)?;
        self.slots.write().await.remove(slot);
        Ok(())
    }
}

/// One `<slot>.json` file per slot inside a directory.
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, slot: &str) -> Result<PathBuf, SlotStoreError> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

#[async_trait]
impl SlotStore for FileSlotStore {
    async fn save(&self, slot: &str, bytes: Vec<u8>) -> Result<(), SlotStoreError> {
        let path = self.path_for(slot)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SlotStoreError::storage("save", e))?;

        // Write then rename so a crash never leaves a half-written save.
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| SlotStoreError::storage("save", e))?;
        tokio::fs::rename(&staging, &path)
            .await
            .map_err(|e| SlotStoreError::storage("save", e))?;

        tracing::debug!(slot, path = %path.display(), "Saved slot");
        Ok(())
    }

    async fn load(&self, slot: &str) -> Result<Option<Vec<u8>>, SlotStoreError> {
        let path = self.path_for(slot)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SlotStoreError::storage("load", e)),
        }
    }

    async fn delete(&self, slot: &str) -> Result<(), SlotStoreError> {
        let path = self.path_for(slot)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SlotStoreError::storage("delete", e)),
        }
    }
}
