//! In-memory item repository and the ordered selection list.
//!
//! Items live in a sharded `DashMap` for point lookups, so existence checks on
//! the request path never wait behind a scan or a batch insert. A `BTreeSet`
//! of ids backs the ascending walk of the available view; it is read in
//! bounded chunks and written once per add cycle. The selection is an
//! `Arc<Vec<ItemId>>` that is swapped wholesale; readers clone the `Arc` and
//! never see a half-applied order.

pub mod queue;


use std::collections::{BTreeSet, HashSet};
use std::ops::{Bound, ControlFlow, RangeInclusive};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use thiserror::Error;

use crate::core::{Item, ItemId};

pub use queue::MutationQueue;

/// Ids copied out per read-lock acquisition when walking the store in order.
pub const SCAN_CHUNK: usize = 4096;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("item {0} already exists")]
    AlreadyExists(ItemId),
    #[error("item {0} does not exist")]
    UnknownItem(ItemId),
    #[error("item {0} appears more than once in the selection")]
    DuplicateSelection(ItemId),
}

#[derive(Default)]
pub struct ItemStore {
    items: DashMap<ItemId, Item>,
    ordered: RwLock<BTreeSet<ItemId>>,
    selection: RwLock<Arc<Vec<ItemId>>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with every id in `ids` and an empty selection.
    pub fn seeded(ids: RangeInclusive<ItemId>) -> Self {
        let items: DashMap<ItemId, Item> = ids.clone().map(|id| (id, Item::new(id))).collect();
        Self {
            items,
            ordered: RwLock::new(ids.collect()),
            selection: RwLock::default(),
        }
    }

    pub fn exists(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        self.items
            .get(&id)
            .map(|entry| *entry.value())
            .ok_or(StoreError::UnknownItem(id))
    }

    /// Insert `item` unless its id is already present. Returns `true` when the
    /// item was newly inserted.
    pub fn insert(&self, item: Item) -> bool {
        !self.insert_missing(&[item.id]).is_empty()
    }

    /// Insert every id not yet stored, under a single write of the ordered
    /// index. Returns the ids actually inserted, in input order.
    pub fn insert_missing(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut ordered = self.ordered.write().unwrap_or_else(PoisonError::into_inner);
        let mut inserted = Vec::new();
        for &id in ids {
            if ordered.insert(id) {
                self.items.insert(id, Item::new(id));
                inserted.push(id);
            }
        }
        inserted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Visit stored ids in ascending order until `visit` breaks.
    ///
    /// The ordered index is locked for one chunk at a time, so a long walk
    /// never holds off a concurrent add cycle for more than one chunk. Ids
    /// inserted mid-walk above the current position may be visited.
    pub fn scan_ids(&self, mut visit: impl FnMut(ItemId) -> ControlFlow<()>) {
        let mut lower = Bound::Unbounded;
        loop {
            let chunk: Vec<ItemId> = {
                let ordered = self.ordered.read().unwrap_or_else(PoisonError::into_inner);
                ordered
                    .range((lower, Bound::Unbounded))
                    .take(SCAN_CHUNK)
                    .copied()
                    .collect()
            };
            let Some(&last) = chunk.last() else {
                return;
            };
            for id in chunk {
                if visit(id).is_break() {
                    return;
                }
            }
            lower = Bound::Excluded(last);
        }
    }

    /// Snapshot of the current selection order.
    pub fn selection_order(&self) -> Arc<Vec<ItemId>> {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn selected_len(&self) -> usize {
        self.selection_order().len()
    }

    /// Replace the selection as a single visible step.
    ///
    /// Only the batch scheduler calls this; the caller guarantees every id is
    /// present in the store and appears once.
    pub fn replace_selection_order(&self, order: Vec<ItemId>) {
        debug_assert!(self.check_selection(&order).is_ok());
        let next = Arc::new(order);
        *self.selection.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Verify that `order` only names stored ids and holds no duplicates.
    pub fn check_selection(&self, order: &[ItemId]) -> Result<(), StoreError> {
        let mut seen = HashSet::with_capacity(order.len());
        for &id in order {
            if !self.exists(id) {
                return Err(StoreError::UnknownItem(id));
            }
            if !seen.insert(id) {
                return Err(StoreError::DuplicateSelection(id));
            }
        }
        Ok(())
    }
}
