//! Ingestion buffers for mutating requests.
//!
//! Request handlers only push intents here. The batch scheduler takes the
//! whole buffer with a swap, so anything queued during a drain lands in the
//! next cycle. Locks are held for a single push or swap and never across an
//! apply step.

use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexSet;

use super::{ItemStore, StoreError};
use crate::core::{ItemId, ModifyTask};

pub struct MutationQueue {
    store: Arc<ItemStore>,
    adds: Mutex<IndexSet<ItemId>>,
    modifies: Mutex<Vec<ModifyTask>>,
}

impl MutationQueue {
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self {
            store,
            adds: Mutex::new(IndexSet::new()),
            modifies: Mutex::new(Vec::new()),
        }
    }

    /// Queue `id` for insertion on the next add cycle.
    ///
    /// Rejected when the id is already stored. Repeats before a flush collapse
    /// into one pending entry and still succeed.
    pub fn enqueue_add(&self, id: ItemId) -> Result<(), StoreError> {
        if self.store.exists(id) {
            return Err(StoreError::AlreadyExists(id));
        }
        self.adds
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        Ok(())
    }

    pub fn enqueue_modify(&self, task: ModifyTask) {
        self.modifies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(task);
    }

    /// Take every pending add in first-queued order, leaving an empty set.
    pub fn drain_adds(&self) -> Vec<ItemId> {
        let pending = std::mem::take(&mut *self.adds.lock().unwrap_or_else(PoisonError::into_inner));
        pending.into_iter().collect()
    }

    /// Take every pending modify task in FIFO order, leaving an empty list.
    pub fn drain_modifies(&self) -> Vec<ModifyTask> {
        std::mem::take(&mut *self.modifies.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn pending_adds(&self) -> usize {
        self.adds.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn pending_modifies(&self) -> usize {
        self.modifies.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
