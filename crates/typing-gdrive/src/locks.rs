//! Per-note write locks.
//!
//! Section writes rewrite the whole note file, so two concurrent writers on
//! the same note would lose one update. Writers within this process take the
//! note's lock for the full download-modify-upload cycle. Writers in other
//! processes remain last-writer-wins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct NoteLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl NoteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for a note. Locks nobody holds are pruned.
    fn entry(&self, note_id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        map.retain(|id, lock| id == note_id || Arc::strong_count(lock) > 1);
        map.entry(note_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Wait until no other writer holds the note, then hold it until the
    /// guard is dropped.
    pub async fn acquire(&self, note_id: &str) -> OwnedMutexGuard<()> {
        self.entry(note_id).lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
