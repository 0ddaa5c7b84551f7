//! Common test utilities for selection flow tests.

use std::sync::Arc;

use selectrix_lib::bus::{ChangeEvent, EventBus, Subscription};
use selectrix_lib::core::{ItemId, QueryService};
use selectrix_lib::runtime::BatchScheduler;
use selectrix_lib::store::{ItemStore, MutationQueue};

/// The core components wired together by hand, without the HTTP layer.
pub struct Harness {
    pub store: Arc<ItemStore>,
    pub queue: Arc<MutationQueue>,
    pub bus: Arc<EventBus>,
    pub scheduler: Arc<BatchScheduler>,
    pub query: QueryService,
}

impl Harness {
    pub fn seeded(size: ItemId) -> Self {
        let store = Arc::new(ItemStore::seeded(1..=size));
        let queue = Arc::new(MutationQueue::new(store.clone()));
        let bus = Arc::new(EventBus::new());
        let scheduler = Arc::new(BatchScheduler::new(store.clone(), queue.clone(), bus.clone()));
        let query = QueryService::new(store.clone());
        Self {
            store,
            queue,
            bus,
            scheduler,
            query,
        }
    }

    pub fn selection(&self) -> Vec<ItemId> {
        self.store.selection_order().as_ref().clone()
    }
}

/// Everything currently buffered for `subscription`.
pub fn drain(subscription: &mut Subscription) -> Vec<ChangeEvent> {
    std::iter::from_fn(|| subscription.try_recv())
        .map(|event| event.change)
        .collect()
}
